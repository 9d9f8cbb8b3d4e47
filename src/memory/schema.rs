//! Database schema for the learned memory.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the memory database.
///
/// `INSERT OR REPLACE` on `invoice_id` deletes the old row and inserts a new
/// one with a fresh `id` and `recorded_at`, so `ORDER BY recorded_at, id`
/// yields insertion/replace order.
pub const SCHEMA: &str = r"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS human_reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_id TEXT NOT NULL UNIQUE,
    vendor TEXT NOT NULL,
    corrections TEXT NOT NULL,
    final_decision TEXT NOT NULL,
    recorded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_human_reviews_vendor ON human_reviews(vendor);
CREATE INDEX IF NOT EXISTS idx_human_reviews_recorded_at ON human_reviews(recorded_at);
";
