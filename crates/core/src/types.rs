/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Page content: an open record of user-supplied text and media references
/// (names, dates, venue, quotes...). Opaque to the resolution pipeline.
pub type PageContent = serde_json::Value;
