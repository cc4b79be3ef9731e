use crate::errors::{Error, Result};
use crate::metrics::{STORE_FAILURES_TOTAL, STORE_LATENCY_SECONDS};
use crate::model::Pond;
use crate::store::{assign_id, PondStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{error, info};

pub async fn make_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;

    info!("Database connection established");
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed");

    Ok(pool)
}

/// Postgres-backed store: one row per pond, the aggregate kept as a JSON document.
///
/// Rows are keyed by the id's UTF-8 bytes and the document travels as serialized
/// text, so ids and strings containing U+0000 survive the round trip.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn observe<T>(op: &str, start: Instant, result: std::result::Result<T, sqlx::Error>) -> Result<T> {
    STORE_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
    result.map_err(|e| {
        STORE_FAILURES_TOTAL.inc();
        error!("Store {} failed: {}", op, e);
        Error::Database(e)
    })
}

fn decode(document: &str) -> Result<Pond> {
    Ok(serde_json::from_str(document)?)
}

#[async_trait]
impl PondStore for PgStore {
    async fn list(&self) -> Result<Vec<Pond>> {
        let start = Instant::now();
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT document::text FROM ponds ORDER BY created_at, key",
        )
        .fetch_all(&self.pool)
        .await;

        observe("list", start, rows)?
            .iter()
            .map(|document| decode(document))
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Pond>> {
        let start = Instant::now();
        let row = sqlx::query_scalar::<_, String>("SELECT document::text FROM ponds WHERE key = $1")
            .bind(id.as_bytes())
            .fetch_optional(&self.pool)
            .await;

        observe("get", start, row)?
            .map(|document| decode(&document))
            .transpose()
    }

    async fn put(&self, mut pond: Pond) -> Result<Pond> {
        let id = assign_id(&mut pond);
        let document = serde_json::to_string(&pond)?;
        let query = r#"
            INSERT INTO ponds (key, created_at, document)
            VALUES ($1, $2, $3::json)
            ON CONFLICT (key) DO UPDATE
            SET created_at = EXCLUDED.created_at, document = EXCLUDED.document
            "#;

        let start = Instant::now();
        let result = sqlx::query(query)
            .bind(id.as_bytes())
            .bind(pond.created_at)
            .bind(document.as_str())
            .execute(&self.pool)
            .await;

        observe("put", start, result)?;
        Ok(pond)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let start = Instant::now();
        let result = sqlx::query("DELETE FROM ponds WHERE key = $1")
            .bind(id.as_bytes())
            .execute(&self.pool)
            .await;

        observe("delete", start, result)?;
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let start = Instant::now();
        let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ponds WHERE key = $1)")
            .bind(id.as_bytes())
            .fetch_one(&self.pool)
            .await;

        observe("exists", start, found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_document_escapes_nul() {
        let pond = Pond {
            id: Some("id\u{0}".to_string()),
            name: "x\u{0}".to_string(),
            location: String::new(),
            created_at: Utc::now(),
            sensors: Vec::new(),
        };

        let document = serde_json::to_string(&pond).unwrap();
        assert!(!document.contains('\0'));
        assert!(document.contains("\\u0000"));
        assert_eq!(decode(&document).unwrap(), pond);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("{not json"), Err(Error::Json(_))));
    }
}
