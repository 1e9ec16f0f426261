use dashmap::DashMap;
use serde_json::value::RawValue;
use uuid::Uuid;

/// Ephemeral storage for arbitrary JSON bodies, keyed by generated id.
pub trait BodyStore: Send + Sync {
    /// Stores `body` and returns its freshly generated id.
    fn put(&self, body: Box<RawValue>) -> String;

    fn get(&self, id: &str) -> Option<Box<RawValue>>;
}

/// Process-memory store. Contents are lost on restart and never expire.
#[derive(Debug, Default)]
pub struct InMemoryBodyStore {
    entries: DashMap<String, Box<RawValue>>,
}

impl InMemoryBodyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BodyStore for InMemoryBodyStore {
    fn put(&self, body: Box<RawValue>) -> String {
        let id = Uuid::new_v4().to_string();
        self.entries.insert(id.clone(), body);
        id
    }

    fn get(&self, id: &str) -> Option<Box<RawValue>> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }
}
