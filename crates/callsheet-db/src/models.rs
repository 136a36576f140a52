/// Database row types — these map directly to SQLite rows.
/// Distinct from the callsheet-types API models to keep the DB layer
/// independent; timestamps stay the RFC 3339 text SQLite assigned them.

pub struct ContactRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub archived: bool,
    pub created_at: String,
}

pub struct SubscriberRow {
    pub id: i64,
    pub email: String,
    pub subscribed_at: String,
}

pub struct AdminRow {
    pub email: String,
    pub password: String,
    pub created_at: String,
}
