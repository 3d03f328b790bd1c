/// Every entity id is a UUID allocated by the shared `entity_ids` registry.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
