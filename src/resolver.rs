//! Locale resolver: one locale code out of many layered signals.
//!
//! Every caller resolves through the same canonical precedence chain, so
//! server-rendered and client-driven paths can never disagree about which
//! signal wins:
//!
//! 1. `lang` query parameter (used verbatim, not validated)
//! 2. locale cookie (must be a supported, enabled code)
//! 3. `Accept-Language` primary tag (must be supported)
//! 4. stored preference from the key/value store (used verbatim)
//! 5. device/browser language primary subtag (must be supported)
//! 6. the default locale
//!
//! Resolution is total: a malformed or unreadable signal is treated as
//! absent and the chain falls through to the next layer.

use crate::language::Locale;
use crate::registry::LocaleRegistry;
use tracing::trace;

/// The query-string parameter carrying an explicit locale choice.
pub const QUERY_PARAM: &str = "lang";

/// Candidate signals for locale resolution.
///
/// Absent fields are skipped; a server context simply never populates the
/// client-only layers (`stored_preference`, `device_language`).
#[derive(Debug, Clone, Default)]
pub struct LocaleSignals {
    /// Explicit `lang` query parameter on the current request/URL.
    pub query_param: Option<String>,
    /// Value of the locale cookie from a prior visit.
    pub cookie: Option<String>,
    /// Raw `Accept-Language` header value.
    pub accept_language: Option<String>,
    /// Explicitly chosen locale persisted in client-side storage.
    pub stored_preference: Option<String>,
    /// Passively detected device/browser language.
    pub device_language: Option<String>,
}

impl LocaleSignals {
    /// Signals available on a pure server execution context: request
    /// data only, no client storage layers.
    pub fn from_request(
        query_param: Option<String>,
        cookie: Option<String>,
        accept_language: Option<String>,
    ) -> Self {
        Self {
            query_param,
            cookie,
            accept_language,
            stored_preference: None,
            device_language: None,
        }
    }

    /// Resolve these signals to a single locale code.
    pub fn resolve(&self) -> String {
        resolve(self)
    }
}

/// Resolve the active locale code from the supplied signals.
///
/// Never fails and never panics. The returned code is not guaranteed to
/// be a supported locale when it came from the query parameter or the
/// stored preference (both are explicit user input, passed through
/// verbatim); the store degrades gracefully for unknown codes.
pub fn resolve(signals: &LocaleSignals) -> String {
    let registry = LocaleRegistry::get();

    // Layer 1: explicit query parameter, verbatim.
    if let Some(param) = non_empty(signals.query_param.as_deref()) {
        trace!(code = param, "locale resolved from query parameter");
        return param.to_string();
    }

    // Layer 2: cookie, only if supported.
    if let Some(cookie) = non_empty(signals.cookie.as_deref()) {
        if registry.is_enabled(cookie) {
            trace!(code = cookie, "locale resolved from cookie");
            return cookie.to_string();
        }
    }

    // Layer 3: Accept-Language primary tag, only if supported.
    if let Some(header) = signals.accept_language.as_deref() {
        if let Some(primary) = parse_accept_language(header) {
            if registry.is_enabled(&primary) {
                trace!(code = %primary, "locale resolved from Accept-Language");
                return primary;
            }
        }
    }

    // Layer 4: persisted preference, verbatim.
    if let Some(stored) = non_empty(signals.stored_preference.as_deref()) {
        trace!(code = stored, "locale resolved from stored preference");
        return stored.to_string();
    }

    // Layer 5: device language primary subtag, only if supported.
    if let Some(device) = signals.device_language.as_deref() {
        let primary = primary_subtag(device);
        if !primary.is_empty() && registry.is_enabled(primary) {
            trace!(code = primary, "locale resolved from device language");
            return primary.to_string();
        }
    }

    // Layer 6: the default.
    trace!(code = Locale::DEFAULT.code(), "locale resolved to default");
    Locale::DEFAULT.code().to_string()
}

/// Extract the primary language tag from an `Accept-Language` header.
///
/// Takes the first comma-separated entry, strips any `;q=` weight, and
/// reduces a region tag to its primary subtag ("en-US" becomes "en").
/// Returns `None` for inputs with no usable tag.
pub fn parse_accept_language(header: &str) -> Option<String> {
    let first = header.split(',').next()?;
    let without_weight = first.split(';').next().unwrap_or("");
    let primary = primary_subtag(without_weight.trim());

    if primary.is_empty() {
        None
    } else {
        Some(primary.to_ascii_lowercase())
    }
}

/// Primary subtag before any region hyphen or underscore.
fn primary_subtag(tag: &str) -> &str {
    tag.trim().split(['-', '_']).next().unwrap_or("").trim()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Device language provider for the current host.
///
/// Seam so that resolution can be exercised without touching real
/// process state.
pub trait SystemLanguage {
    /// The device's reported language tag, when available.
    fn device_language(&self) -> Option<String>;
}

/// Provider backed by the `LANG` environment variable, for trusted
/// process contexts (the audit binary, server-side rendering).
#[derive(Debug, Default, Copy, Clone)]
pub struct EnvLanguage;

impl SystemLanguage for EnvLanguage {
    fn device_language(&self) -> Option<String> {
        // "hi_IN.UTF-8" style values: strip encoding, keep the tag.
        let raw = std::env::var("LANG").ok()?;
        let tag = raw.split('.').next().unwrap_or("").trim();
        if tag.is_empty() || tag == "C" || tag == "POSIX" {
            None
        } else {
            Some(tag.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Precedence Tests ====================

    #[test]
    fn test_query_param_wins_over_everything() {
        let signals = LocaleSignals {
            query_param: Some("te".to_string()),
            cookie: Some("hi".to_string()),
            accept_language: Some("fr".to_string()),
            stored_preference: Some("ta".to_string()),
            device_language: Some("kn".to_string()),
        };
        assert_eq!(resolve(&signals), "te");
    }

    #[test]
    fn test_query_param_is_verbatim() {
        // Accepted looseness: the query parameter is not validated.
        let signals = LocaleSignals {
            query_param: Some("zz".to_string()),
            cookie: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "zz");
    }

    #[test]
    fn test_empty_query_param_falls_through() {
        let signals = LocaleSignals {
            query_param: Some("  ".to_string()),
            cookie: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "hi");
    }

    #[test]
    fn test_cookie_beats_header() {
        let signals = LocaleSignals::from_request(
            None,
            Some("hi".to_string()),
            Some("ta,en;q=0.8".to_string()),
        );
        assert_eq!(resolve(&signals), "hi");
    }

    #[test]
    fn test_unsupported_cookie_falls_through() {
        let signals = LocaleSignals::from_request(
            None,
            Some("zz".to_string()),
            Some("ta".to_string()),
        );
        assert_eq!(resolve(&signals), "ta");
    }

    #[test]
    fn test_header_with_region_and_weight() {
        let signals = LocaleSignals::from_request(
            None,
            None,
            Some("hi-IN,en;q=0.8".to_string()),
        );
        assert_eq!(resolve(&signals), "hi");
    }

    #[test]
    fn test_unsupported_header_falls_through_to_stored() {
        let signals = LocaleSignals {
            accept_language: Some("fi-FI".to_string()),
            stored_preference: Some("ml".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "ml");
    }

    #[test]
    fn test_device_language_primary_subtag() {
        let signals = LocaleSignals {
            device_language: Some("ta-LK".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "ta");
    }

    #[test]
    fn test_unsupported_device_language_falls_to_default() {
        let signals = LocaleSignals {
            device_language: Some("fi".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "en");
    }

    #[test]
    fn test_no_signals_returns_default() {
        assert_eq!(resolve(&LocaleSignals::default()), "en");
    }

    #[test]
    fn test_server_context_skips_client_layers() {
        // from_request cannot carry stored preference or device language.
        let signals = LocaleSignals::from_request(None, None, None);
        assert!(signals.stored_preference.is_none());
        assert!(signals.device_language.is_none());
        assert_eq!(resolve(&signals), "en");
    }

    // ==================== Accept-Language Parsing ====================

    #[test]
    fn test_parse_accept_language_simple() {
        assert_eq!(parse_accept_language("hi"), Some("hi".to_string()));
    }

    #[test]
    fn test_parse_accept_language_with_region() {
        assert_eq!(parse_accept_language("en-US"), Some("en".to_string()));
    }

    #[test]
    fn test_parse_accept_language_full_header() {
        assert_eq!(
            parse_accept_language("hi-IN,en;q=0.8,fr;q=0.5"),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_parse_accept_language_weight_on_first_entry() {
        assert_eq!(
            parse_accept_language("te;q=0.9,en;q=0.8"),
            Some("te".to_string())
        );
    }

    #[test]
    fn test_parse_accept_language_uppercase_is_lowered() {
        assert_eq!(parse_accept_language("TA"), Some("ta".to_string()));
    }

    #[test]
    fn test_parse_accept_language_malformed() {
        assert_eq!(parse_accept_language(""), None);
        assert_eq!(parse_accept_language("   "), None);
        assert_eq!(parse_accept_language(";q=0.8"), None);
        assert_eq!(parse_accept_language(",,,"), None);
    }

    // ==================== Device Language Provider ====================

    #[test]
    #[serial_test::serial]
    fn test_env_language_strips_encoding() {
        std::env::set_var("LANG", "hi_IN.UTF-8");
        assert_eq!(EnvLanguage.device_language(), Some("hi_IN".to_string()));
        std::env::remove_var("LANG");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_language_ignores_posix_locales() {
        std::env::set_var("LANG", "C");
        assert_eq!(EnvLanguage.device_language(), None);
        std::env::remove_var("LANG");
        assert_eq!(EnvLanguage.device_language(), None);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_language_feeds_resolver() {
        std::env::set_var("LANG", "ta_IN.UTF-8");
        let signals = LocaleSignals {
            device_language: EnvLanguage.device_language(),
            ..Default::default()
        };
        assert_eq!(resolve(&signals), "ta");
        std::env::remove_var("LANG");
    }

    #[test]
    fn test_parse_accept_language_wildcard_not_supported() {
        // "*" parses to a tag but is not a registry member, so the
        // resolver skips it.
        let signals =
            LocaleSignals::from_request(None, None, Some("*".to_string()));
        assert_eq!(resolve(&signals), "en");
    }
}
