//! Per-request GraphQL context
//!
//! Provides helpers for:
//! - Building a fresh request scope (request id + locale) for every request
//! - A standard Axum handler that injects the scope into the GraphQL request
//! - Retrieving the scope inside resolvers

use std::fmt;
use std::sync::Arc;

use async_graphql::{Context, Request, Response, Schema};
use axum::{extract::Extension, http::HeaderMap, Json};
use uuid::Uuid;

use crate::i18n::{Catalog, Locale, Localizer, MessageKey};

/// Identity and localization for one GraphQL request.
///
/// A scope is constructed fresh per request and passed explicitly down the
/// call chain. Loaders built from it hold request-scoped caches, so the scope
/// (and everything holding it) must be dropped with the request; storing one
/// in a global would let one caller's permitted data leak into another's
/// response.
#[derive(Clone)]
pub struct RequestScope {
    pub request_id: Uuid,
    pub locale: Locale,
    localizer: Arc<dyn Localizer>,
}

impl RequestScope {
    /// New scope with the built-in message catalog.
    pub fn new(locale: Locale) -> Self {
        Self::with_localizer(locale, Arc::new(Catalog))
    }

    /// New scope with an external localization provider.
    pub fn with_localizer(locale: Locale, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            locale,
            localizer,
        }
    }

    /// Render a user-facing message in this request's locale.
    pub fn message(&self, key: &MessageKey<'_>) -> String {
        self.localizer.translate(self.locale, key)
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("request_id", &self.request_id)
            .field("locale", &self.locale)
            .finish()
    }
}

/// Extract the request locale from the Accept-Language header.
pub fn extract_locale(headers: &HeaderMap) -> Locale {
    headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .map(Locale::from_tag)
        .unwrap_or_default()
}

/// Standard GraphQL handler that builds a fresh [`RequestScope`] per request
/// and injects it into the request data.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::post};
/// use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
/// use domainwatch_graphql_helpers::context::graphql_handler;
///
/// struct Query;
///
/// #[Object]
/// impl Query {
///     async fn ping(&self) -> &str {
///         "pong"
///     }
/// }
///
/// let app: Router = Router::new().route(
///     "/graphql",
///     post(graphql_handler::<Query, EmptyMutation, EmptySubscription>),
/// );
/// ```
pub async fn graphql_handler<Query, Mutation, Subscription>(
    Extension(schema): Extension<Schema<Query, Mutation, Subscription>>,
    headers: HeaderMap,
    req: Json<Request>,
) -> Json<Response>
where
    Query: async_graphql::ObjectType + 'static,
    Mutation: async_graphql::ObjectType + 'static,
    Subscription: async_graphql::SubscriptionType + 'static,
{
    let scope = RequestScope::new(extract_locale(&headers));
    let request = req.0.data(scope);
    Json(schema.execute(request).await)
}

/// Get the request scope from GraphQL context.
pub fn scope<'a>(ctx: &'a Context<'_>) -> Option<&'a RequestScope> {
    ctx.data_opt::<RequestScope>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::EntityLabel;

    #[test]
    fn test_extract_locale() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_locale(&headers), Locale::English);

        headers.insert("accept-language", "fr-CA,fr;q=0.9".parse().unwrap());
        assert_eq!(extract_locale(&headers), Locale::French);
    }

    #[test]
    fn test_scope_renders_localized_messages() {
        let scope = RequestScope::new(Locale::French);
        let text = scope.message(&MessageKey::UnableToFind {
            entity: EntityLabel::Domains,
        });
        assert_eq!(text, "Impossible de trouver `domaine(s)`. Veuillez réessayer.");
    }

    #[test]
    fn test_each_scope_gets_its_own_request_id() {
        let a = RequestScope::new(Locale::English);
        let b = RequestScope::new(Locale::English);
        assert_ne!(a.request_id, b.request_id);
    }
}
