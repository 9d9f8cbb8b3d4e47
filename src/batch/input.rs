//! Loading a batch of invoices and reference documents.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::error::BatchError;
use crate::invoice::{Invoice, ReferenceData};

pub const INVOICES_FILE: &str = "invoices.json";
pub const PURCHASE_ORDERS_FILE: &str = "purchase_orders.json";
pub const DELIVERY_NOTES_FILE: &str = "delivery_notes.json";

/// Locations of the three batch input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub invoices: PathBuf,
    pub purchase_orders: PathBuf,
    pub delivery_notes: PathBuf,
}

impl InputPaths {
    /// The standard file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            invoices: dir.join(INVOICES_FILE),
            purchase_orders: dir.join(PURCHASE_ORDERS_FILE),
            delivery_notes: dir.join(DELIVERY_NOTES_FILE),
        }
    }
}

/// Invoices plus the reference documents shared by all of them.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub invoices: Vec<Invoice>,
    pub reference: ReferenceData,
}

impl BatchInput {
    /// Load the standard input files from a data directory.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if any file is missing or malformed.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, BatchError> {
        Self::load_paths(&InputPaths::in_dir(dir.as_ref())).await
    }

    /// Load input files from explicit paths.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if any file is missing or malformed.
    pub async fn load_paths(paths: &InputPaths) -> Result<Self, BatchError> {
        let invoices: Vec<Invoice> = read_json(&paths.invoices).await?;
        let reference = ReferenceData {
            purchase_orders: read_json(&paths.purchase_orders).await?,
            delivery_notes: read_json(&paths.delivery_notes).await?,
        };
        tracing::info!(
            invoices = invoices.len(),
            purchase_orders = reference.purchase_orders.len(),
            delivery_notes = reference.delivery_notes.len(),
            "Loaded batch input"
        );
        Ok(Self {
            invoices,
            reference,
        })
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BatchError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| BatchError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}
