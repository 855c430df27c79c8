//! crates/library_catalog_core/src/ports.rs
//!
//! Defines the storage contract for the catalog.
//! The trait is the boundary of the hexagonal architecture: the core only knows
//! it can load and save whole collections, not where or how they are kept.

use async_trait::async_trait;

use crate::catalog::CatalogError;
use crate::domain::{Book, LoanEvent};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and service operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

impl From<CatalogError> for PortError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(format!("book {}", id)),
            CatalogError::PreconditionFailed(reason) => Self::PreconditionFailed(reason),
        }
    }
}

//=========================================================================================
// Storage Port
//=========================================================================================

/// Whole-collection persistence for the catalog and its activity log.
///
/// Loading a collection that was never saved yields an empty one.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn load_books(&self) -> PortResult<Vec<Book>>;

    async fn save_books(&self, books: &[Book]) -> PortResult<()>;

    async fn load_events(&self) -> PortResult<Vec<LoanEvent>>;

    async fn save_events(&self, events: &[LoanEvent]) -> PortResult<()>;
}
