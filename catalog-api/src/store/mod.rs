//! Document store abstraction and the in-memory backend.

mod matcher;
mod memory;

use anyhow::Result;
use async_trait::async_trait;
use filter_query::Predicate;
use serde_json::Value;

pub use matcher::{compare_for_sort, matches};
pub use memory::{MemoryConnector, MemoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Pagination, ordering and projection for a `find` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: Option<usize>,
    pub skip: usize,
    pub sort: Vec<SortKey>,
    /// Top-level fields removed from every returned document.
    pub exclude: Vec<String>,
}

/// Document store backend - implement for each storage engine.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap liveness check used by the pool before reusing a handle.
    async fn ping(&self) -> Result<()>;

    async fn find(
        &self,
        collection: &str,
        filter: &Predicate,
        options: &FindOptions,
    ) -> Result<Vec<Value>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests;
