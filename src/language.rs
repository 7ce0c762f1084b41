//! Locale type: validated handle for a supported locale.
//!
//! A `Locale` can only be constructed for codes the registry knows about,
//! so holding one is proof the locale is supported and enabled.

use crate::registry::{LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};

/// A validated locale.
///
/// Cheap to copy (it holds only a `&'static str` borrowed from the
/// registry) and guaranteed to refer to an enabled registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    /// The default locale. Always valid, never requires I/O to resolve.
    pub const DEFAULT: Locale = Locale { code: "en" };

    /// Create a `Locale` from a language code string.
    ///
    /// Fails if the code is unknown or the locale is disabled.
    pub fn from_code(code: &str) -> Result<Locale> {
        let registry = LocaleRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// Get the default locale as declared by the registry.
    pub fn default_locale() -> Locale {
        let config = LocaleRegistry::get().default_locale();
        Locale { code: config.code }
    }

    /// The ISO 639-1 language code (e.g., "en", "hi").
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The full registry entry for this locale.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot
    /// happen for a properly constructed `Locale`.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    /// English name of the language (e.g., "Telugu").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language (e.g., "తెలుగు").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Whether this is the default locale.
    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constant() {
        let default = Locale::DEFAULT;
        assert_eq!(default.code(), "en");
        assert!(default.is_default());
    }

    #[test]
    fn test_default_locale_matches_constant() {
        assert_eq!(Locale::default_locale(), Locale::DEFAULT);
    }

    #[test]
    fn test_from_code_hindi() {
        let hindi = Locale::from_code("hi").expect("Should succeed");
        assert_eq!(hindi.code(), "hi");
        assert_eq!(hindi.name(), "Hindi");
        assert_eq!(hindi.native_name(), "हिन्दी");
        assert!(!hindi.is_default());
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Locale::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Locale::from_code("").is_err());
    }

    #[test]
    fn test_locale_equality() {
        let a = Locale::from_code("en").unwrap();
        let b = Locale::DEFAULT;
        assert_eq!(a, b);
        assert_ne!(a, Locale::from_code("ta").unwrap());
    }

    #[test]
    fn test_locale_display() {
        let sanskrit = Locale::from_code("sa").unwrap();
        assert_eq!(sanskrit.to_string(), "sa");
    }

    #[test]
    fn test_locale_copy() {
        let lang1 = Locale::DEFAULT;
        let lang2 = lang1; // Copy
        assert_eq!(lang1, lang2);
    }
}
