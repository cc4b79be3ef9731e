use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::timezone::to_display_zone;

/// Pond aggregate as persisted. Sensors and their readings live inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pond {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

impl Pond {
    pub fn sensor(&self, kind: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.kind == kind)
    }

    pub fn sensor_mut(&mut self, kind: &str) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|s| s.kind == kind)
    }

    /// Drops any sensor sharing the incoming type, then appends it, so a pond
    /// never holds two sensors of the same type.
    pub fn replace_sensor(&mut self, sensor: Sensor) {
        self.sensors.retain(|existing| existing.kind != sensor.kind);
        self.sensors.push(sensor);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Sensor {
    /// Reading with the latest timestamp. On ties the last one in the list wins.
    pub fn most_recent_reading(&self) -> Option<&Reading> {
        self.readings.iter().max_by_key(|r| r.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /admin/ponds/add` and `PUT /admin/ponds/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PondRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub location: String,
}

/// Body of `POST /admin/ponds/{id}/sensors`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

/// Pond as returned to clients: `createdAt` in the display zone, sensors as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PondResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<FixedOffset>,
    pub sensors: Vec<Sensor>,
}

impl From<Pond> for PondResponse {
    fn from(pond: Pond) -> Self {
        Self {
            id: pond.id.unwrap_or_default(),
            name: pond.name,
            location: pond.location,
            created_at: to_display_zone(pond.created_at),
            sensors: pond.sensors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingResponse {
    pub value: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&Reading> for ReadingResponse {
    fn from(reading: &Reading) -> Self {
        Self {
            value: reading.value.clone(),
            timestamp: to_display_zone(reading.timestamp),
        }
    }
}
