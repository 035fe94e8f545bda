//! Database query boundary
//!
//! The engine never talks to the store directly; it is handed a
//! [`QueryExecutor`] that runs a named operation and returns an async
//! [`ResultCursor`] over the rows. Any failure from either is a
//! [`FetchFailure`], which the loader logs and converts before it can reach
//! a client.

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;

/// Internal failure raised at the query boundary. Never user-facing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The store rejected the query itself.
    #[error("query rejected: {0}")]
    Query(String),

    /// A result cursor failed while being drained.
    #[error("cursor iteration failed: {0}")]
    Iteration(String),
}

/// Async cursor over query results.
#[async_trait]
pub trait ResultCursor<T: Send>: Send {
    /// Next item, or `None` once exhausted.
    async fn next(&mut self) -> Result<Option<T>, FetchFailure>;

    /// Whether another item remains.
    async fn has_next(&mut self) -> Result<bool, FetchFailure>;

    /// Drain the remaining items.
    async fn all(&mut self) -> Result<Vec<T>, FetchFailure> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Apply `f` to each remaining item.
    async fn each(&mut self, f: &mut (dyn FnMut(T) + Send)) -> Result<(), FetchFailure> {
        while let Some(item) = self.next().await? {
            f(item);
        }
        Ok(())
    }
}

/// Runs a named operation against the store.
#[async_trait]
pub trait QueryExecutor<T: Send>: Send + Sync {
    async fn run(
        &self,
        operation: &str,
        keys: &[String],
    ) -> Result<Box<dyn ResultCursor<T>>, FetchFailure>;
}

/// In-memory cursor over already-fetched rows. Used by tests and by
/// candidate suppliers that hold their results up front.
pub struct VecCursor<T> {
    items: VecDeque<T>,
}

impl<T> VecCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

#[async_trait]
impl<T: Send> ResultCursor<T> for VecCursor<T> {
    async fn next(&mut self) -> Result<Option<T>, FetchFailure> {
        Ok(self.items.pop_front())
    }

    async fn has_next(&mut self) -> Result<bool, FetchFailure> {
        Ok(!self.items.is_empty())
    }
}
