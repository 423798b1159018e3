use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{NewRecord, RecordId, RemoteError, RemoteRecord, RemoteStore};

/// Remote store that lives only for the current session.
///
/// Backs `markpad --offline` and the crate's tests. Assigns numeric ids
/// starting at 101 (as JSONPlaceholder does) and yields once per request so
/// callers observe a real suspension point.
#[derive(Debug)]
pub struct MemoryRemote {
    records: RefCell<BTreeMap<String, RemoteRecord>>,
    next_id: Cell<u64>,
    offline: Cell<bool>,
    requests: Cell<usize>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self {
            records: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(101),
            offline: Cell::new(false),
            requests: Cell::new(0),
        }
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record under `id`.
    pub fn with_record(self, id: impl Into<RecordId>, body: &str) -> Self {
        let id = id.into();
        self.records.borrow_mut().insert(
            id.to_string(),
            RemoteRecord {
                id,
                title: String::new(),
                body: body.to_string(),
                user_id: 1,
            },
        );
        self
    }

    /// Make every following request fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn record(&self, id: &str) -> Option<RemoteRecord> {
        self.records.borrow().get(id).cloned()
    }

    /// Number of requests received, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    async fn begin_request(&self) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        self.requests.set(self.requests.get() + 1);
        if self.offline.get() {
            return Err(RemoteError::Unavailable("offline".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemote {
    async fn create(&self, record: &NewRecord) -> Result<RemoteRecord, RemoteError> {
        self.begin_request().await?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let stored = RemoteRecord {
            id: RecordId::Number(id),
            title: record.title.clone(),
            body: record.body.clone(),
            user_id: record.user_id,
        };
        self.records
            .borrow_mut()
            .insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn read_by_id(&self, id: &str) -> Result<RemoteRecord, RemoteError> {
        self.begin_request().await?;
        self.record(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }
}
