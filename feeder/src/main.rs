mod reading;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use reading::generate_reading;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

/// Registers sensors on a pond and posts simulated readings to the pond service.
#[derive(Debug, Parser)]
#[command(name = "feeder", version)]
struct Args {
    /// Service root, without the `/admin` prefix
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Existing pond to feed. A new pond is created when omitted.
    #[arg(long, env = "POND_ID")]
    pond_id: Option<String>,

    #[arg(long, env = "POND_NAME", default_value = "Simulated pond")]
    pond_name: String,

    #[arg(long, env = "POND_LOCATION", default_value = "Nellore")]
    location: String,

    #[arg(
        long,
        env = "SENSORS",
        value_delimiter = ',',
        default_value = "temperature,ph,dissolved_oxygen"
    )]
    sensors: Vec<String>,

    /// Pause between rounds of readings
    #[arg(long, env = "INTERVAL_MS", default_value_t = 5000)]
    interval_ms: u64,

    /// Rounds to send, 0 runs until interrupted
    #[arg(long, env = "COUNT", default_value_t = 0)]
    count: u64,
}

#[derive(Debug, Deserialize)]
struct PondCreated {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AttachedSensor {
    #[serde(rename = "type")]
    kind: String,
}

/// `base` with `segments` appended, each percent-encoded as a single path segment.
fn endpoint(base: &Url, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sensor types requested on the command line that the pond does not have yet.
fn missing_sensors<'a>(wanted: &'a [String], attached: &[AttachedSensor]) -> Vec<&'a str> {
    let attached: HashSet<&str> = attached.iter().map(|s| s.kind.as_str()).collect();
    wanted
        .iter()
        .map(String::as_str)
        .filter(|kind| !attached.contains(kind))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting pond feeder");
    info!(
        "Service: {}, Sensors: {:?}, Interval: {}ms",
        args.base_url, args.sensors, args.interval_ms
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;
    let base = Url::parse(&args.base_url)
        .with_context(|| format!("invalid base URL {}", args.base_url))?;

    let pond_id = match &args.pond_id {
        Some(id) => id.clone(),
        None => create_pond(&client, &base, &args.pond_name, &args.location).await?,
    };
    info!("Feeding pond {}", pond_id);

    // Attaching replaces a sensor and its readings, so only add the missing ones.
    let sensors_url = endpoint(&base, &["admin", "ponds", &pond_id, "sensors"])?;
    let attached: Vec<AttachedSensor> = client
        .get(sensors_url.clone())
        .send()
        .await
        .context("failed to list sensors")?
        .error_for_status()
        .context("pond service rejected sensor listing")?
        .json()
        .await
        .context("unexpected sensor list response")?;

    for kind in missing_sensors(&args.sensors, &attached) {
        let response = client
            .post(sensors_url.clone())
            .json(&json!({ "type": kind }))
            .send()
            .await
            .with_context(|| format!("failed to attach sensor {}", kind))?;
        if !response.status().is_success() {
            bail!("attaching sensor {} returned {}", kind, response.status());
        }
        info!("Attached sensor {}", kind);
    }

    let mut rng = rand::thread_rng();
    let interval = Duration::from_millis(args.interval_ms);
    let mut round = 0u64;

    loop {
        round += 1;

        for kind in &args.sensors {
            let value = generate_reading(&mut rng, kind);
            let url = endpoint(&base, &["admin", "ponds", &pond_id, "sensors", kind, "readings"])?;

            match client.post(url).body(value.clone()).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!("Reading {}={} rejected: {}", kind, value, response.status());
                }
                Err(e) => {
                    error!("Failed to post reading {}={}: {}", kind, value, e);
                }
            }
        }

        // Log progress periodically
        if round % 10 == 0 {
            info!("Sent {} rounds", round);
        }

        if args.count != 0 && round >= args.count {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Feeder stopped after {} rounds", round);
    Ok(())
}

async fn create_pond(client: &Client, base: &Url, name: &str, location: &str) -> anyhow::Result<String> {
    let response = client
        .post(endpoint(base, &["admin", "ponds", "add"])?)
        .json(&json!({ "name": name, "location": location }))
        .send()
        .await
        .context("failed to create pond")?
        .error_for_status()
        .context("pond service rejected pond creation")?;

    let created: PondCreated = response.json().await.context("unexpected pond response")?;
    info!("Created pond {} ({})", created.id, name);
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["feeder"]);
        assert_eq!(args.sensors, vec!["temperature", "ph", "dissolved_oxygen"]);
        assert_eq!(args.count, 0);
    }

    #[test]
    fn test_sensor_list_split_on_commas() {
        let args = Args::parse_from(["feeder", "--sensors", "ph,salinity", "--pond-id", "p-1"]);
        assert_eq!(args.sensors, vec!["ph", "salinity"]);
        assert_eq!(args.pond_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("http://localhost:8080").unwrap();
        let url = endpoint(&base, &["admin", "ponds", "p 1", "sensors", "a/b?c#d", "readings"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/admin/ponds/p%201/sensors/a%2Fb%3Fc%23d/readings"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://gateway/ponds-api/").unwrap();
        let url = endpoint(&base, &["admin", "ponds"]).unwrap();
        assert_eq!(url.as_str(), "http://gateway/ponds-api/admin/ponds");
    }

    #[test]
    fn test_only_missing_sensors_attached() {
        let wanted = vec!["temperature".to_string(), "ph".to_string(), "salinity".to_string()];
        let attached = vec![
            AttachedSensor { kind: "ph".to_string() },
            AttachedSensor { kind: "turbidity".to_string() },
        ];

        assert_eq!(missing_sensors(&wanted, &attached), vec!["temperature", "salinity"]);
        assert!(missing_sensors(&wanted[1..2], &attached).is_empty());
    }
}
