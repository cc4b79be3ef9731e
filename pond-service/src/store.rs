use crate::errors::Result;
use crate::model::Pond;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Document store holding one `Pond` aggregate per id.
#[async_trait]
pub trait PondStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Pond>>;

    async fn get(&self, id: &str) -> Result<Option<Pond>>;

    /// Upserts the whole aggregate. A pond without an id gets a fresh UUID.
    async fn put(&self, pond: Pond) -> Result<Pond>;

    /// Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn exists(&self, id: &str) -> Result<bool>;
}

pub(crate) fn assign_id(pond: &mut Pond) -> String {
    pond.id
        .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
        .clone()
}

/// In-process store, used by tests and by `STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ponds: RwLock<BTreeMap<String, Pond>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PondStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Pond>> {
        let ponds = self.ponds.read().await;
        let mut all: Vec<Pond> = ponds.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get(&self, id: &str) -> Result<Option<Pond>> {
        Ok(self.ponds.read().await.get(id).cloned())
    }

    async fn put(&self, mut pond: Pond) -> Result<Pond> {
        let id = assign_id(&mut pond);
        self.ponds.write().await.insert(id, pond.clone());
        Ok(pond)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.ponds.write().await.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.ponds.read().await.contains_key(id))
    }
}
