//! Relay-style cursor connections
//!
//! One generic engine turns an ordered, already authorization-filtered
//! candidate key list into a page of edges with opaque cursors, `pageInfo`
//! and `totalCount`. Per-entity behavior lives entirely in
//! [`ConnectionConfig`]; the algorithm is shared by every connection the
//! schema serves.

use async_graphql::{Object, OutputType, SimpleObject};
use tracing::warn;

use crate::args::{PagePolicy, RawPageArgs};
use crate::context::RequestScope;
use crate::cursor::CursorCodec;
use crate::dataloaders::{BatchFetcher, DataLoader};
use crate::filter::{DateRangeFilter, ScanCandidate};
use crate::i18n::{EntityLabel, MessageKey};
use crate::{ConnectionError, Result};

/// Page information
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// Cursor of the first edge, or `""` when the page is empty.
    pub start_cursor: String,
    /// Cursor of the last edge, or `""` when the page is empty.
    pub end_cursor: String,
}

/// Edge in a connection
#[derive(Debug, Clone)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

#[Object]
impl<T: OutputType> Edge<T> {
    async fn cursor(&self) -> &str {
        &self.cursor
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Debug, Clone)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    /// Size of the filtered candidate set, per the connection's
    /// [`TotalCountMode`]; never just the returned page.
    pub total_count: u64,
}

#[Object]
impl<T: OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    async fn total_count(&self) -> u64 {
        self.total_count
    }
}

impl<T> Connection<T> {
    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo {
                has_next_page: false,
                has_previous_page: false,
                start_cursor: String::new(),
                end_cursor: String::new(),
            },
            total_count: 0,
        }
    }
}

/// Which candidate count `totalCount` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalCountMode {
    /// The filtered candidate set, before `before`/`after` trimming.
    #[default]
    FilteredSet,
    /// The candidate set remaining after `before`/`after` trimming.
    TrimmedSet,
}

/// Per-connection configuration for the generic engine.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    /// Connection name as it appears in the schema, used in messages.
    pub connection: &'static str,
    /// Loader identifier used in log lines.
    pub loader: &'static str,
    /// Cursor type tag.
    pub type_tag: &'static str,
    /// Entity label for the generic fetch-failure message.
    pub entity: EntityLabel,
    pub policy: PagePolicy,
    pub total_count: TotalCountMode,
}

/// The generic connection engine.
///
/// Borrowed per field resolution; the loader it hydrates through is
/// request-scoped, so the resolver is too.
pub struct ConnectionResolver<'a, V, F>
where
    V: Send + Sync + Clone + 'static,
    F: BatchFetcher<String, V> + 'static,
{
    config: &'a ConnectionConfig,
    loader: &'a DataLoader<String, V, F>,
    scope: &'a RequestScope,
}

impl<'a, V, F> ConnectionResolver<'a, V, F>
where
    V: Send + Sync + Clone + 'static,
    F: BatchFetcher<String, V> + 'static,
{
    pub fn new(
        config: &'a ConnectionConfig,
        loader: &'a DataLoader<String, V, F>,
        scope: &'a RequestScope,
    ) -> Self {
        Self {
            config,
            loader,
            scope,
        }
    }

    /// Resolve a page over `candidates`, an ordered, already
    /// authorization-filtered key list in canonical ascending order.
    ///
    /// For a fixed candidate set and fixed arguments the result is
    /// deterministic, and edges always ascend in candidate order whether
    /// `first` or `last` drove the slice.
    pub async fn resolve(
        &self,
        candidates: Vec<String>,
        args: &RawPageArgs,
    ) -> Result<Connection<V>> {
        let selection = args.validate(
            &self.config.policy,
            self.config.connection,
            self.config.loader,
            self.scope,
        )?;

        let filtered_total = candidates.len();

        let mut remaining = candidates;
        // Candidates removed by the `after` trim; drives `hasPreviousPage`
        // when `first` slices the head.
        let mut dropped_before_page = 0usize;
        // Candidates removed by the `before` trim; drives `hasNextPage`
        // when `last` slices the tail.
        let mut dropped_after_page = 0usize;

        if let Some(after) = &selection.after {
            let anchor = self.decode_anchor(after)?;
            // An anchor that is no longer in the candidate set leaves the
            // set untrimmed.
            if let Some(position) = remaining.iter().position(|key| *key == anchor) {
                dropped_before_page = position + 1;
                remaining.drain(..=position);
            }
        }
        if let Some(before) = &selection.before {
            let anchor = self.decode_anchor(before)?;
            if let Some(position) = remaining.iter().position(|key| *key == anchor) {
                dropped_after_page = remaining.len() - position;
                remaining.truncate(position);
            }
        }

        let trimmed_total = remaining.len();

        let (page, has_next, has_previous) = match (selection.first, selection.last) {
            (Some(first), _) => {
                let has_next = trimmed_total > first as usize;
                remaining.truncate((first as usize).min(trimmed_total));
                (remaining, has_next, dropped_before_page > 0)
            }
            (None, Some(last)) => {
                let has_previous = trimmed_total > last as usize;
                let take = (last as usize).min(trimmed_total);
                // Tail slice; order stays ascending.
                let page = remaining.split_off(trimmed_total - take);
                (page, dropped_after_page > 0, has_previous)
            }
            (None, None) => (remaining, dropped_after_page > 0, dropped_before_page > 0),
        };

        let nodes = self.loader.load_many(&page).await?;
        let edges: Vec<Edge<V>> = page
            .iter()
            .zip(nodes)
            .map(|(key, node)| Edge {
                cursor: CursorCodec::encode(self.config.type_tag, key),
                node,
            })
            .collect();

        let total_count = match self.config.total_count {
            TotalCountMode::FilteredSet => filtered_total,
            TotalCountMode::TrimmedSet => trimmed_total,
        };

        let page_info = PageInfo {
            has_next_page: has_next,
            has_previous_page: has_previous,
            start_cursor: edges.first().map(|e| e.cursor.clone()).unwrap_or_default(),
            end_cursor: edges.last().map(|e| e.cursor.clone()).unwrap_or_default(),
        };

        Ok(Connection {
            edges,
            page_info,
            total_count: total_count as u64,
        })
    }

    /// Resolve a time-series page: validate and apply the date window, then
    /// paginate the surviving keys.
    pub async fn resolve_dated(
        &self,
        candidates: Vec<ScanCandidate>,
        filter: &DateRangeFilter,
        args: &RawPageArgs,
    ) -> Result<Connection<V>> {
        filter.validate(self.config.loader, self.scope)?;
        let keys = filter
            .apply(candidates)
            .into_iter()
            .map(|candidate| candidate.key)
            .collect();
        self.resolve(keys, args).await
    }

    /// Decode a `before`/`after` cursor, insisting on this connection's tag.
    fn decode_anchor(&self, cursor: &str) -> Result<String> {
        CursorCodec::decode_expecting(cursor, self.config.type_tag).map_err(|_| {
            warn!(
                request_id = %self.scope.request_id,
                loader = self.config.loader,
                rule = "invalid-cursor",
                "cursor rejected"
            );
            ConnectionError::Decode(self.scope.message(&MessageKey::InvalidCursor {
                connection: self.config.connection,
            }))
        })
    }
}
