//! Persisted questionnaire session
//!
//! Holds the in-progress answers and step pointer for a single client.
//! Storage failures never reach the caller: they are logged and read as "no session".

pub mod slot;

pub use slot::{FileSlot, MemorySlot, StorageSlot};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Sessions expire this long after `start_time`, regardless of activity
pub const SESSION_TTL_HOURS: i64 = 24;

/// The single stored session envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub form_data: Map<String, Value>,
    #[serde(default)]
    pub current_step: usize,
    pub start_time: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl SessionRecord {
    pub fn new(user_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: format!("session_{}", uuid::Uuid::new_v4().simple()),
            form_data: Map::new(),
            current_step: 0,
            start_time: now,
            last_updated: now,
            is_completed: false,
            user_name,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.start_time > ttl
    }
}

/// Partial update applied by `save`.
///
/// Top-level fields overwrite; `form_data` entries are merged key by key.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub form_data: Option<Map<String, Value>>,
    pub current_step: Option<usize>,
    pub is_completed: Option<bool>,
    pub user_name: Option<String>,
}

impl SessionPatch {
    pub fn form_data(form_data: Map<String, Value>) -> Self {
        Self {
            form_data: Some(form_data),
            ..Default::default()
        }
    }

    pub fn field(id: &str, value: Value) -> Self {
        let mut form_data = Map::new();
        form_data.insert(id.to_string(), value);
        Self::form_data(form_data)
    }

    pub fn step(current_step: usize) -> Self {
        Self {
            current_step: Some(current_step),
            ..Default::default()
        }
    }

    pub fn completed() -> Self {
        Self {
            is_completed: Some(true),
            ..Default::default()
        }
    }

    fn apply(self, record: &mut SessionRecord) {
        if let Some(form_data) = self.form_data {
            for (key, value) in form_data {
                record.form_data.insert(key, value);
            }
        }
        if let Some(step) = self.current_step {
            record.current_step = step;
        }
        if let Some(completed) = self.is_completed {
            record.is_completed = completed;
        }
        if let Some(name) = self.user_name {
            record.user_name = Some(name);
        }
    }
}

/// Session persistence contract, injected wherever the session is needed
pub trait SessionRepository: Send + Sync {
    /// Stored session, or `None` if absent, unreadable or expired
    fn load(&self) -> Option<SessionRecord>;

    /// Merge `patch` into the stored session (creating one if needed) and persist it
    fn save(&self, patch: SessionPatch) -> SessionRecord;

    /// Start a fresh session, replacing any existing one
    fn create(&self, user_name: Option<String>) -> SessionRecord;

    fn clear(&self);

    /// False once the stored session is older than the expiry window
    fn is_valid(&self) -> bool;
}

/// Slot-backed session repository
pub struct SessionStore {
    slot: Box<dyn StorageSlot>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(slot: Box<dyn StorageSlot>) -> Self {
        Self {
            slot,
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySlot::new()))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn read_record(&self) -> Option<SessionRecord> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read session data: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Discarding corrupt session data: {}", e);
                self.clear();
                None
            }
        }
    }

    fn write_record(&self, record: &SessionRecord) {
        let result = serde_json::to_string(record)
            .map_err(crate::error::AnalysisError::from)
            .and_then(|json| self.slot.write(&json));

        if let Err(e) = result {
            warn!(session_id = %record.session_id, "Failed to save session data: {}", e);
        }
    }
}

impl SessionRepository for SessionStore {
    fn load(&self) -> Option<SessionRecord> {
        let record = self.read_record()?;

        if record.is_expired_at(Utc::now(), self.ttl) {
            debug!(session_id = %record.session_id, "Session expired");
            self.clear();
            return None;
        }

        Some(record)
    }

    fn save(&self, patch: SessionPatch) -> SessionRecord {
        let mut record = self.load().unwrap_or_else(|| SessionRecord::new(None));
        patch.apply(&mut record);
        record.last_updated = Utc::now();
        self.write_record(&record);
        record
    }

    fn create(&self, user_name: Option<String>) -> SessionRecord {
        let record = SessionRecord::new(user_name);
        self.write_record(&record);
        record
    }

    fn clear(&self) {
        if let Err(e) = self.slot.remove() {
            warn!("Failed to clear session data: {}", e);
        }
    }

    fn is_valid(&self) -> bool {
        self.read_record()
            .map(|record| !record.is_expired_at(Utc::now(), self.ttl))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use serde_json::json;

    /// Slot whose every operation fails, like a full or disabled local storage
    struct BrokenSlot;

    impl StorageSlot for BrokenSlot {
        fn read(&self) -> crate::Result<Option<String>> {
            Err(AnalysisError::StorageError("quota exceeded".into()))
        }
        fn write(&self, _contents: &str) -> crate::Result<()> {
            Err(AnalysisError::StorageError("quota exceeded".into()))
        }
        fn remove(&self) -> crate::Result<()> {
            Err(AnalysisError::StorageError("quota exceeded".into()))
        }
    }

    fn store_with(record: &SessionRecord) -> SessionStore {
        let slot = MemorySlot::new();
        slot.write(&serde_json::to_string(record).unwrap()).unwrap();
        SessionStore::new(Box::new(slot))
    }

    #[test]
    fn test_save_creates_then_merges_form_data() {
        let store = SessionStore::in_memory();
        assert!(store.load().is_none());

        let first = store.save(SessionPatch::field("monthly_income", json!(50000)));
        let second = store.save(SessionPatch::field("housing_expenses", json!(12000)));

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(second.form_data.len(), 2);
        assert_eq!(second.form_data["monthly_income"], json!(50000));

        let third = store.save(SessionPatch::field("monthly_income", json!(60000)));
        assert_eq!(third.form_data["monthly_income"], json!(60000));
        assert_eq!(third.form_data["housing_expenses"], json!(12000));
        assert!(third.last_updated >= first.last_updated);
    }

    #[test]
    fn test_top_level_fields_overwrite() {
        let store = SessionStore::in_memory();
        store.save(SessionPatch::step(3));
        let record = store.save(SessionPatch::step(1));
        assert_eq!(record.current_step, 1);

        let record = store.save(SessionPatch::completed());
        assert!(record.is_completed);
        assert_eq!(store.load().unwrap().current_step, 1);
    }

    #[test]
    fn test_create_replaces_existing_session() {
        let store = SessionStore::in_memory();
        let old = store.save(SessionPatch::field("side_income", json!("Yes")));
        let fresh = store.create(Some("Asha".to_string()));

        assert_ne!(old.session_id, fresh.session_id);
        let loaded = store.load().unwrap();
        assert_eq!(loaded.session_id, fresh.session_id);
        assert!(loaded.form_data.is_empty());
        assert_eq!(loaded.user_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_expired_session_is_absent() {
        let mut record = SessionRecord::new(None);
        record.start_time = Utc::now() - Duration::hours(25);
        record.last_updated = Utc::now();
        let store = store_with(&record);

        assert!(!store.is_valid());
        assert!(store.load().is_none());
        // load drops the expired record
        assert!(store.slot.read().unwrap().is_none());
    }

    #[test]
    fn test_recent_activity_does_not_extend_expiry() {
        let mut record = SessionRecord::new(None);
        record.start_time = Utc::now() - Duration::hours(25);
        let store = store_with(&record);

        // save on an expired session starts a new one
        let saved = store.save(SessionPatch::step(2));
        assert_ne!(saved.session_id, record.session_id);
        assert!(store.is_valid());
    }

    #[test]
    fn test_fresh_session_is_valid() {
        let mut record = SessionRecord::new(None);
        record.start_time = Utc::now() - Duration::hours(23);
        let store = store_with(&record);
        assert!(store.is_valid());
        assert!(store.load().is_some());
    }

    #[test]
    fn test_corrupt_data_degrades_to_no_session() {
        let slot = MemorySlot::new();
        slot.write("{not json").unwrap();
        let store = SessionStore::new(Box::new(slot));

        assert!(store.load().is_none());
        assert!(!store.is_valid());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = SessionStore::new(Box::new(BrokenSlot));

        assert!(store.load().is_none());
        let record = store.save(SessionPatch::field("monthly_income", json!(1)));
        assert_eq!(record.form_data.len(), 1);
        store.clear();
        assert!(!store.is_valid());
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::in_memory();
        store.create(None);
        assert!(store.is_valid());
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_record_wire_format() {
        let record = SessionRecord::new(None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("sessionId").is_some());
        assert!(json.get("formData").is_some());
        assert!(json.get("isCompleted").is_some());
    }
}
