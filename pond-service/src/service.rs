use crate::errors::{Error, Result};
use crate::metrics::{
    NOT_FOUND_TOTAL, PONDS_CREATED_TOTAL, PONDS_DELETED_TOTAL, READINGS_APPENDED_TOTAL,
    SENSORS_ATTACHED_TOTAL,
};
use crate::model::{
    Pond, PondRequest, PondResponse, Reading, ReadingResponse, Sensor, SensorRequest,
};
use crate::store::PondStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pond, sensor and reading operations over an injected store.
///
/// Every mutating call is a single load, mutate, save of one pond aggregate.
/// Timestamps are written in UTC and converted to the display zone only when
/// a response is built.
#[derive(Clone)]
pub struct PondService {
    store: Arc<dyn PondStore>,
}

impl PondService {
    pub fn new(store: Arc<dyn PondStore>) -> Self {
        Self { store }
    }

    pub async fn list_ponds(&self) -> Result<Vec<PondResponse>> {
        let ponds = self.store.list().await?;
        debug!("Listing {} ponds", ponds.len());
        Ok(ponds.into_iter().map(PondResponse::from).collect())
    }

    pub async fn create_pond(&self, request: PondRequest) -> Result<PondResponse> {
        let pond = Pond {
            id: request.id,
            name: request.name,
            location: request.location,
            created_at: Utc::now(),
            sensors: Vec::new(),
        };

        let saved = self.store.put(pond).await?;
        PONDS_CREATED_TOTAL.inc();
        info!("Created pond {:?}", saved.id);
        Ok(saved.into())
    }

    /// Missing ids yield `None` rather than `PondNotFound`.
    pub async fn get_pond(&self, id: &str) -> Result<Option<PondResponse>> {
        let pond = self.store.get(id).await?;
        if pond.is_none() {
            debug!("Pond {} not present", id);
        }
        Ok(pond.map(PondResponse::from))
    }

    pub async fn update_pond(&self, id: &str, request: PondRequest) -> Result<PondResponse> {
        let mut pond = self.load(id).await?;
        pond.name = request.name;
        pond.location = request.location;

        let saved = self.store.put(pond).await?;
        info!("Updated pond {}", id);
        Ok(saved.into())
    }

    pub async fn delete_pond(&self, id: &str) -> Result<()> {
        if !self.store.exists(id).await? {
            return Err(not_found(Error::PondNotFound(id.to_string())));
        }

        self.store.delete(id).await?;
        PONDS_DELETED_TOTAL.inc();
        info!("Deleted pond {}", id);
        Ok(())
    }

    /// Sensors exactly as stored, timestamps in UTC.
    pub async fn list_sensors(&self, pond_id: &str) -> Result<Vec<Sensor>> {
        Ok(self.load(pond_id).await?.sensors)
    }

    pub async fn attach_sensor(&self, pond_id: &str, request: SensorRequest) -> Result<PondResponse> {
        let mut pond = self.load(pond_id).await?;
        let sensor = Sensor {
            kind: request.kind,
            timestamp: Utc::now(),
            readings: request.readings,
        };
        let kind = sensor.kind.clone();
        pond.replace_sensor(sensor);

        let saved = self.store.put(pond).await?;
        SENSORS_ATTACHED_TOTAL.inc();
        info!("Attached sensor {:?} to pond {}", kind, pond_id);
        Ok(saved.into())
    }

    pub async fn append_reading(
        &self,
        pond_id: &str,
        sensor_type: &str,
        value: String,
    ) -> Result<PondResponse> {
        let mut pond = self.load(pond_id).await?;
        let sensor = pond
            .sensor_mut(sensor_type)
            .ok_or_else(|| not_found(Error::SensorNotFound(sensor_type.to_string())))?;
        sensor.readings.push(Reading {
            value,
            timestamp: Utc::now(),
        });

        let saved = self.store.put(pond).await?;
        READINGS_APPENDED_TOTAL.inc();
        debug!("Appended reading to {:?} on pond {}", sensor_type, pond_id);
        Ok(saved.into())
    }

    /// `Ok(None)` when the sensor exists but has no readings yet.
    pub async fn most_recent_reading(
        &self,
        pond_id: &str,
        sensor_type: &str,
    ) -> Result<Option<ReadingResponse>> {
        let pond = self.load(pond_id).await?;
        let sensor = pond
            .sensor(sensor_type)
            .ok_or_else(|| not_found(Error::SensorNotFound(sensor_type.to_string())))?;

        Ok(sensor.most_recent_reading().map(ReadingResponse::from))
    }

    async fn load(&self, id: &str) -> Result<Pond> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| not_found(Error::PondNotFound(id.to_string())))
    }
}

fn not_found(err: Error) -> Error {
    NOT_FOUND_TOTAL.inc();
    warn!("{}", err);
    err
}
