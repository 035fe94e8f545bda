//! Localized user-facing messages
//!
//! The engine picks a [`MessageKey`]; a [`Localizer`] renders it in the
//! request's locale. [`Catalog`] is the built-in provider with complete
//! English and French translations for every key.

/// Supported locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    English,
    French,
}

impl Locale {
    /// Parse a language tag, e.g. the leading entry of an `Accept-Language`
    /// header. Anything that is not French falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(',')
            .next()
            .and_then(|entry| entry.split(';').next())
            .unwrap_or("")
            .trim();
        let language = primary.split('-').next().unwrap_or("");
        if language.eq_ignore_ascii_case("fr") {
            Locale::French
        } else {
            Locale::English
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::French => "fr",
        }
    }
}

/// Entity labels interpolated into the generic "unable to find" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    DkimResults,
    DmarcResults,
    SpfResults,
    HttpsResults,
    SslResults,
    Organizations,
    Domains,
    Affiliations,
    GuidanceTags,
}

impl EntityLabel {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::English => match self {
                EntityLabel::DkimResults => "DKIM result(s)",
                EntityLabel::DmarcResults => "DMARC result(s)",
                EntityLabel::SpfResults => "SPF result(s)",
                EntityLabel::HttpsResults => "HTTPS result(s)",
                EntityLabel::SslResults => "SSL result(s)",
                EntityLabel::Organizations => "organization(s)",
                EntityLabel::Domains => "domain(s)",
                EntityLabel::Affiliations => "affiliation(s)",
                EntityLabel::GuidanceTags => "guidance tag(s)",
            },
            Locale::French => match self {
                EntityLabel::DkimResults => "résultat(s) DKIM",
                EntityLabel::DmarcResults => "résultat(s) DMARC",
                EntityLabel::SpfResults => "résultat(s) SPF",
                EntityLabel::HttpsResults => "résultat(s) HTTPS",
                EntityLabel::SslResults => "résultat(s) SSL",
                EntityLabel::Organizations => "organisation(s)",
                EntityLabel::Domains => "domaine(s)",
                EntityLabel::Affiliations => "affiliation(s)",
                EntityLabel::GuidanceTags => "étiquette(s) d'orientation",
            },
        }
    }
}

/// A user-facing message together with its interpolation parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKey<'a> {
    /// Neither `first` nor `last` was supplied on a connection that requires one.
    PaginationMissingBound { connection: &'a str },
    /// Both `first` and `last` were supplied.
    PaginationBothBounds { connection: &'a str },
    /// `first`/`last` was not an integer number.
    PaginationWrongType { argument: &'a str, found: &'a str },
    /// `first`/`last` was negative.
    PaginationNegative { argument: &'a str, connection: &'a str },
    /// `first`/`last` exceeded the connection's record limit.
    PaginationOverLimit {
        argument: &'a str,
        connection: &'a str,
        requested: i64,
        limit: u32,
    },
    /// A `before`/`after` cursor could not be decoded for this connection.
    InvalidCursor { connection: &'a str },
    /// A date filter bound was not a valid ISO 8601 string.
    InvalidDate { argument: &'a str },
    /// Generic fetch failure shown in place of any internal error.
    UnableToFind { entity: EntityLabel },
}

/// Supplies translated text for every message key.
pub trait Localizer: Send + Sync {
    fn translate(&self, locale: Locale, key: &MessageKey<'_>) -> String;
}

/// Built-in message catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct Catalog;

impl Localizer for Catalog {
    fn translate(&self, locale: Locale, key: &MessageKey<'_>) -> String {
        use MessageKey::*;
        match locale {
            Locale::English => match key {
                PaginationMissingBound { connection } => format!(
                    "You must provide a `first` or `last` value to properly paginate the `{connection}` connection."
                ),
                PaginationBothBounds { connection } => format!(
                    "Passing both `first` and `last` to paginate the `{connection}` connection is not supported."
                ),
                PaginationWrongType { argument, found } => {
                    format!("`{argument}` must be of type `number` not `{found}`.")
                }
                PaginationNegative { argument, connection } => format!(
                    "`{argument}` on the `{connection}` connection cannot be less than zero."
                ),
                PaginationOverLimit {
                    argument,
                    connection,
                    requested,
                    limit,
                } => format!(
                    "Requesting `{requested}` records on the `{connection}` connection exceeds the `{argument}` limit of {limit} records."
                ),
                InvalidCursor { connection } => {
                    format!("Invalid cursor supplied to the `{connection}` connection.")
                }
                InvalidDate { argument } => {
                    format!("`{argument}` must be a valid ISO 8601 date or date-time string.")
                }
                UnableToFind { entity } => format!(
                    "Unable to find `{}`. Please try again.",
                    entity.label(Locale::English)
                ),
            },
            Locale::French => match key {
                PaginationMissingBound { connection } => format!(
                    "Vous devez fournir une valeur `first` ou `last` pour paginer correctement la connexion `{connection}`."
                ),
                PaginationBothBounds { connection } => format!(
                    "Passer à la fois `first` et `last` pour paginer la connexion `{connection}` n'est pas pris en charge."
                ),
                PaginationWrongType { argument, found } => {
                    format!("`{argument}` doit être de type `number` et non `{found}`.")
                }
                PaginationNegative { argument, connection } => format!(
                    "`{argument}` sur la connexion `{connection}` ne peut pas être inférieur à zéro."
                ),
                PaginationOverLimit {
                    argument,
                    connection,
                    requested,
                    limit,
                } => format!(
                    "Demander `{requested}` enregistrements sur la connexion `{connection}` dépasse la limite de `{argument}` fixée à {limit} enregistrements."
                ),
                InvalidCursor { connection } => {
                    format!("Curseur invalide fourni à la connexion `{connection}`.")
                }
                InvalidDate { argument } => format!(
                    "`{argument}` doit être une date ou une date-heure valide au format ISO 8601."
                ),
                UnableToFind { entity } => format!(
                    "Impossible de trouver `{}`. Veuillez réessayer.",
                    entity.label(Locale::French)
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> Vec<MessageKey<'static>> {
        vec![
            MessageKey::PaginationMissingBound {
                connection: "dkimResults",
            },
            MessageKey::PaginationBothBounds {
                connection: "dkimResults",
            },
            MessageKey::PaginationWrongType {
                argument: "first",
                found: "string",
            },
            MessageKey::PaginationNegative {
                argument: "last",
                connection: "domains",
            },
            MessageKey::PaginationOverLimit {
                argument: "first",
                connection: "domains",
                requested: 1000,
                limit: 100,
            },
            MessageKey::InvalidCursor {
                connection: "organizations",
            },
            MessageKey::InvalidDate {
                argument: "startDate",
            },
            MessageKey::UnableToFind {
                entity: EntityLabel::DkimResults,
            },
        ]
    }

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("fr"), Locale::French);
        assert_eq!(Locale::from_tag("fr-CA"), Locale::French);
        assert_eq!(Locale::from_tag("FR;q=0.9"), Locale::French);
        assert_eq!(Locale::from_tag("fr-CA,fr;q=0.9,en;q=0.8"), Locale::French);
        assert_eq!(Locale::from_tag("en-US"), Locale::English);
        assert_eq!(Locale::from_tag("de"), Locale::English);
        assert_eq!(Locale::from_tag(""), Locale::English);
    }

    #[test]
    fn test_catalog_is_complete_in_both_locales() {
        for key in sample_keys() {
            let english = Catalog.translate(Locale::English, &key);
            let french = Catalog.translate(Locale::French, &key);
            assert!(!english.is_empty(), "missing English text for {key:?}");
            assert!(!french.is_empty(), "missing French text for {key:?}");
            assert_ne!(english, french, "untranslated French text for {key:?}");
        }
    }

    #[test]
    fn test_over_limit_message_interpolates_values() {
        let key = MessageKey::PaginationOverLimit {
            argument: "first",
            connection: "dkimResults",
            requested: 1000,
            limit: 100,
        };
        for locale in [Locale::English, Locale::French] {
            let text = Catalog.translate(locale, &key);
            assert!(text.contains("1000"));
            assert!(text.contains("100"));
            assert!(text.contains("`first`"));
        }
    }

    #[test]
    fn test_entity_labels_translated() {
        assert_eq!(
            EntityLabel::Organizations.label(Locale::French),
            "organisation(s)"
        );
        assert_eq!(
            EntityLabel::Organizations.label(Locale::English),
            "organization(s)"
        );
    }
}
