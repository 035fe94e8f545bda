//! # domainwatch-graphql-helpers
//!
//! GraphQL utilities library for DomainWatch dashboard services.
//!
//! ## Features
//!
//! - **Cursor Connections** - one generic Relay-style connection engine,
//!   configured per entity type instead of copied per entity type
//! - **Batch Loading** - request-scoped DataLoader for N+1 prevention
//! - **Date Filtering** - inclusive timestamp windows for scan-result
//!   connections
//! - **Localized Errors** - complete English and French message catalog
//! - **Request Context** - per-request scope extraction for GraphQL handlers
//!
//! ## Usage
//!
//! ```rust
//! use domainwatch_graphql_helpers::CursorCodec;
//!
//! let cursor = CursorCodec::encode("domain", "a.example.com");
//! let (type_tag, key) = CursorCodec::decode(&cursor).unwrap();
//! assert_eq!((type_tag.as_str(), key.as_str()), ("domain", "a.example.com"));
//! ```

pub mod args;
pub mod connection;
pub mod context;
pub mod cursor;
pub mod dataloaders;
pub mod entities;
pub mod executor;
pub mod filter;
pub mod i18n;

pub use args::{PagePolicy, PageSelection, PaginationInput, RawPageArgs, DEFAULT_MAX_PAGE_SIZE};
pub use connection::{
    Connection, ConnectionConfig, ConnectionResolver, Edge, PageInfo, TotalCountMode,
};
pub use context::{extract_locale, graphql_handler, scope, RequestScope};
pub use cursor::CursorCodec;
pub use dataloaders::{BatchFetcher, DataLoader, ExecutorFetcher, Keyed};
pub use executor::{FetchFailure, QueryExecutor, ResultCursor, VecCursor};
pub use filter::{DateRangeFilter, ScanCandidate};
pub use i18n::{Catalog, EntityLabel, Locale, Localizer, MessageKey};

use thiserror::Error;

/// Errors surfaced to GraphQL clients.
///
/// `Display` carries only the localized, user-facing message. Internal
/// detail (operation names, store errors, stack context) is logged at the
/// boundary where the failure was caught and never crosses into this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Bad, missing, or conflicting pagination arguments.
    #[error("{0}")]
    Validation(String),

    /// Candidate or hydration query rejected by the store.
    #[error("{0}")]
    Database(String),

    /// Failure while iterating a result cursor.
    #[error("{0}")]
    Cursor(String),

    /// Malformed or cross-type opaque cursor.
    #[error("{0}")]
    Decode(String),
}

/// Result type for connection operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
