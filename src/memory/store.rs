//! `SQLite`-backed memory store with async operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::{params, Connection};
use tokio::sync::Mutex;

use super::error::MemoryError;
use super::schema::{SCHEMA, SCHEMA_VERSION};
use crate::invoice::{Correction, FinalDecision, HumanReview, UnknownDecision};

/// Returns the default path for the memory database.
///
/// This is `~/.local/share/invoice-agent/memory.db` on Unix systems.
#[must_use]
pub fn default_memory_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invoice-agent")
        .join("memory.db")
}

/// Raw `(invoice_id, vendor, corrections, final_decision)` columns.
type ReviewRow = (String, String, String, String);

const SELECT_REVIEWS: &str =
    "SELECT invoice_id, vendor, corrections, final_decision FROM human_reviews";

/// Durable store of human reviews, keyed by invoice ID.
///
/// Opened once per process and handed to the orchestrator. Clones share the
/// same connection.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Open the memory store at the specified path.
    ///
    /// Creates parent directories if they don't exist and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    MemoryError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let path_clone = path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, MemoryError> {
            let conn =
                Connection::open(&path_clone).map_err(|source| MemoryError::DatabaseOpen {
                    path: path_clone,
                    source,
                })?;
            init_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)??;

        tracing::debug!(path = %path.display(), "Opened memory store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, MemoryError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, MemoryError> {
            let conn = Connection::open_in_memory()?;
            init_schema(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save a review, replacing any earlier review of the same invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the corrections cannot be serialized or the upsert fails.
    pub async fn save(&self, review: &HumanReview) -> Result<(), MemoryError> {
        let invoice_id = review.invoice_id.clone();
        let vendor = review.vendor.clone();
        let corrections = serde_json::to_string(&review.corrections)?;
        let decision = review.final_decision.as_str();

        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), MemoryError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT OR REPLACE INTO human_reviews (invoice_id, vendor, corrections, final_decision)
                 VALUES (?1, ?2, ?3, ?4)",
                params![invoice_id, vendor, corrections, decision],
            )?;
            Ok(())
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)??;

        tracing::info!(
            invoice_id = %review.invoice_id,
            vendor = %review.vendor,
            corrections = review.corrections.len(),
            "Saved human review"
        );
        Ok(())
    }

    /// Load every review in the order it was persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub async fn load_all(&self) -> Result<Vec<HumanReview>, MemoryError> {
        self.query_reviews(None).await
    }

    /// Load reviews whose vendor matches exactly (case-sensitive), in
    /// persistence order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub async fn load_for_vendor(&self, vendor: &str) -> Result<Vec<HumanReview>, MemoryError> {
        self.query_reviews(Some(vendor.to_string())).await
    }

    /// Count stored reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> Result<u64, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, MemoryError> {
            let conn = conn.blocking_lock();
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM human_reviews", [], |row| row.get(0))?;
            Ok(count.unsigned_abs())
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)?
    }

    /// Delete every stored review. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn clear(&self) -> Result<usize, MemoryError> {
        let conn = self.conn.clone();
        let removed = tokio::task::spawn_blocking(move || -> Result<usize, MemoryError> {
            let conn = conn.blocking_lock();
            Ok(conn.execute("DELETE FROM human_reviews", [])?)
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)??;

        tracing::info!(removed, "Cleared learned memory");
        Ok(removed)
    }

    async fn query_reviews(&self, vendor: Option<String>) -> Result<Vec<HumanReview>, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<HumanReview>, MemoryError> {
            let conn = conn.blocking_lock();
            let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<ReviewRow> {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            };

            let rows = if let Some(vendor) = vendor {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_REVIEWS} WHERE vendor = ?1 ORDER BY recorded_at, id"
                ))?;
                let rows = stmt
                    .query_map(params![vendor], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            } else {
                let mut stmt = conn.prepare(&format!("{SELECT_REVIEWS} ORDER BY recorded_at, id"))?;
                let rows = stmt
                    .query_map([], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            rows.into_iter()
                .map(|(invoice_id, vendor, corrections, decision)| {
                    decode_review(invoice_id, vendor, &corrections, &decision)
                })
                .collect()
        })
        .await
        .map_err(|_| MemoryError::TaskCancelled)?
    }
}

fn init_schema(conn: &Connection) -> Result<(), MemoryError> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Decode a stored row, validating the corrections blob and decision.
fn decode_review(
    invoice_id: String,
    vendor: String,
    corrections: &str,
    decision: &str,
) -> Result<HumanReview, MemoryError> {
    let corrections: Vec<Correction> =
        serde_json::from_str(corrections).map_err(|e| MemoryError::Corrupt {
            invoice_id: invoice_id.clone(),
            reason: e.to_string(),
        })?;
    let final_decision: FinalDecision =
        decision.parse().map_err(|e: UnknownDecision| MemoryError::Corrupt {
            invoice_id: invoice_id.clone(),
            reason: e.to_string(),
        })?;

    Ok(HumanReview {
        invoice_id,
        vendor,
        corrections,
        final_decision,
    })
}
