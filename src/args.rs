//! Connection argument validation
//!
//! The five argument rules run in a fixed order, each with its own localized
//! error and a structured warning log. All of them are pure; nothing touches
//! the database before an argument can be rejected.

use async_graphql::InputObject;
use serde_json::Value;
use tracing::warn;

use crate::context::RequestScope;
use crate::i18n::MessageKey;
use crate::{ConnectionError, Result};

/// Default per-connection record limit.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Typed Relay pagination arguments for GraphQL resolvers.
///
/// Follows the Relay Cursor Connections Specification:
/// https://relay.dev/graphql/connections.htm
#[derive(InputObject, Debug, Clone, Default)]
pub struct PaginationInput {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start from (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to start from (backward pagination)
    pub before: Option<String>,
}

/// Pagination arguments as they arrive off the wire, before type checking.
///
/// `first`/`last` stay loosely typed so the validator can name the offending
/// runtime type when a caller sends something other than an integer.
#[derive(Debug, Clone, Default)]
pub struct RawPageArgs {
    pub first: Option<Value>,
    pub last: Option<Value>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl RawPageArgs {
    pub fn first(mut self, first: i64) -> Self {
        self.first = Some(Value::from(first));
        self
    }

    pub fn last(mut self, last: i64) -> Self {
        self.last = Some(Value::from(last));
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }
}

impl From<PaginationInput> for RawPageArgs {
    fn from(input: PaginationInput) -> Self {
        Self {
            first: input.first.map(Value::from),
            last: input.last.map(Value::from),
            after: input.after,
            before: input.before,
        }
    }
}

/// Per-connection pagination bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    /// Whether the connection insists on an explicit `first`/`last`.
    pub require_limit: bool,
    /// Upper bound on either argument.
    pub max_page_size: u32,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            require_limit: true,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Validated page selection. At most one of `first`/`last` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    pub first: Option<u32>,
    pub last: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl RawPageArgs {
    /// Apply the argument rules in order:
    ///
    /// 1. a bound is required but neither `first` nor `last` is present
    /// 2. both `first` and `last` are present
    /// 3. the supplied value is not an integer number
    /// 4. the value is negative
    /// 5. the value exceeds the connection's record limit
    pub fn validate(
        &self,
        policy: &PagePolicy,
        connection: &str,
        loader: &str,
        scope: &RequestScope,
    ) -> Result<PageSelection> {
        if policy.require_limit && self.first.is_none() && self.last.is_none() {
            warn!(
                request_id = %scope.request_id,
                loader,
                rule = "missing-bound",
                "pagination arguments rejected"
            );
            return Err(ConnectionError::Validation(
                scope.message(&MessageKey::PaginationMissingBound { connection }),
            ));
        }

        if self.first.is_some() && self.last.is_some() {
            warn!(
                request_id = %scope.request_id,
                loader,
                rule = "both-bounds",
                "pagination arguments rejected"
            );
            return Err(ConnectionError::Validation(
                scope.message(&MessageKey::PaginationBothBounds { connection }),
            ));
        }

        let mut selection = PageSelection {
            after: self.after.clone(),
            before: self.before.clone(),
            ..PageSelection::default()
        };

        if let Some(value) = &self.first {
            selection.first = Some(check_bound(value, "first", policy, connection, loader, scope)?);
        }
        if let Some(value) = &self.last {
            selection.last = Some(check_bound(value, "last", policy, connection, loader, scope)?);
        }

        Ok(selection)
    }
}

fn check_bound(
    value: &Value,
    argument: &str,
    policy: &PagePolicy,
    connection: &str,
    loader: &str,
    scope: &RequestScope,
) -> Result<u32> {
    let Some(requested) = integer_value(value) else {
        warn!(
            request_id = %scope.request_id,
            loader,
            argument,
            rule = "wrong-type",
            "pagination arguments rejected"
        );
        return Err(ConnectionError::Validation(scope.message(
            &MessageKey::PaginationWrongType {
                argument,
                found: json_type_name(value),
            },
        )));
    };

    if requested < 0 {
        warn!(
            request_id = %scope.request_id,
            loader,
            argument,
            rule = "negative",
            "pagination arguments rejected"
        );
        return Err(ConnectionError::Validation(scope.message(
            &MessageKey::PaginationNegative {
                argument,
                connection,
            },
        )));
    }

    if requested > i64::from(policy.max_page_size) {
        warn!(
            request_id = %scope.request_id,
            loader,
            argument,
            rule = "over-limit",
            "pagination arguments rejected"
        );
        return Err(ConnectionError::Validation(scope.message(
            &MessageKey::PaginationOverLimit {
                argument,
                connection,
                requested,
                limit: policy.max_page_size,
            },
        )));
    }

    Ok(requested as u32)
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        // Integers beyond i64 are still over any page limit.
        Value::Number(n) if n.is_u64() => Some(i64::MAX),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
