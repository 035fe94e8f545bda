//! Per-connection configuration for the dashboard's entity types
//!
//! One [`ConnectionConfig`] per connection. The pagination algorithm itself
//! lives in [`crate::connection`]; only this table varies between entity
//! types. Scan-result connections are time-series (timestamp-then-key sort,
//! date-filterable); catalog connections sort by key.

use crate::args::PagePolicy;
use crate::connection::{ConnectionConfig, TotalCountMode};
use crate::i18n::EntityLabel;

const DEFAULT_POLICY: PagePolicy = PagePolicy {
    require_limit: true,
    max_page_size: 100,
};

/// DKIM scan results under a domain.
pub const DKIM_RESULTS: ConnectionConfig = ConnectionConfig {
    connection: "dkimResults",
    loader: "load_dkim_results_by_domain",
    type_tag: "dkimResult",
    entity: EntityLabel::DkimResults,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// DMARC scan results under a domain.
pub const DMARC_RESULTS: ConnectionConfig = ConnectionConfig {
    connection: "dmarcResults",
    loader: "load_dmarc_results_by_domain",
    type_tag: "dmarcResult",
    entity: EntityLabel::DmarcResults,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// SPF scan results under a domain.
pub const SPF_RESULTS: ConnectionConfig = ConnectionConfig {
    connection: "spfResults",
    loader: "load_spf_results_by_domain",
    type_tag: "spfResult",
    entity: EntityLabel::SpfResults,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// HTTPS scan results under a domain.
pub const HTTPS_RESULTS: ConnectionConfig = ConnectionConfig {
    connection: "httpsResults",
    loader: "load_https_results_by_domain",
    type_tag: "httpsResult",
    entity: EntityLabel::HttpsResults,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// SSL scan results under a domain.
pub const SSL_RESULTS: ConnectionConfig = ConnectionConfig {
    connection: "sslResults",
    loader: "load_ssl_results_by_domain",
    type_tag: "sslResult",
    entity: EntityLabel::SslResults,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// Organizations visible to the caller.
pub const ORGANIZATIONS: ConnectionConfig = ConnectionConfig {
    connection: "organizations",
    loader: "load_organizations_by_key",
    type_tag: "organization",
    entity: EntityLabel::Organizations,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// Domains under an organization.
pub const DOMAINS: ConnectionConfig = ConnectionConfig {
    connection: "domains",
    loader: "load_domains_by_organization",
    type_tag: "domain",
    entity: EntityLabel::Domains,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// User-organization affiliations.
pub const AFFILIATIONS: ConnectionConfig = ConnectionConfig {
    connection: "affiliations",
    loader: "load_affiliations_by_user",
    type_tag: "affiliation",
    entity: EntityLabel::Affiliations,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// Guidance tags attached to scan results.
pub const GUIDANCE_TAGS: ConnectionConfig = ConnectionConfig {
    connection: "guidanceTags",
    loader: "load_guidance_tags_by_id",
    type_tag: "guidanceTag",
    entity: EntityLabel::GuidanceTags,
    policy: DEFAULT_POLICY,
    total_count: TotalCountMode::FilteredSet,
};

/// Every connection the schema serves.
pub const ALL: [&ConnectionConfig; 9] = [
    &DKIM_RESULTS,
    &DMARC_RESULTS,
    &SPF_RESULTS,
    &HTTPS_RESULTS,
    &SSL_RESULTS,
    &ORGANIZATIONS,
    &DOMAINS,
    &AFFILIATIONS,
    &GUIDANCE_TAGS,
];
