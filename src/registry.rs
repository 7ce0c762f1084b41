//! Locale registry: single source of truth for all supported locales.
//!
//! Every locale the site can render is declared here, together with its
//! metadata. The registry is a `OnceLock` singleton: initialized on first
//! access, immutable afterwards.

use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 language code (e.g., "en", "hi", "te")
    pub code: &'static str,

    /// English name of the language (e.g., "Hindi", "Telugu")
    pub name: &'static str,

    /// Native name of the language (e.g., "हिन्दी", "తెలుగు")
    pub native_name: &'static str,

    /// Whether this is the default locale (exactly one entry is true)
    pub is_default: bool,

    /// Whether this locale is enabled for use
    pub enabled: bool,
}

/// Global locale registry singleton.
///
/// Provides lookup and listing over the supported locale set. Initialized
/// once on first access and immutable thereafter, so references handed out
/// are `'static`.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: supported_locales(),
        })
    }

    /// Get a locale configuration by its code.
    ///
    /// Returns `None` if the code is not in the supported set.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Get all enabled locales, in declaration order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales
            .iter()
            .filter(|locale| locale.enabled)
            .collect()
    }

    /// Get all locales (including disabled ones).
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// Get the default locale configuration.
    ///
    /// The default locale is always resolvable without I/O and is the
    /// merge base for every other locale's bundle.
    ///
    /// # Panics
    /// Panics if zero or multiple default locales are declared; either
    /// case is a configuration error in `supported_locales`.
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default locale declared in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales declared in registry"),
        }
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

/// The supported locale set.
///
/// English is the default: all content is authored in English first and
/// every other locale's bundle is an override on top of it.
fn supported_locales() -> Vec<LocaleConfig> {
    macro_rules! locale {
        ($code:expr, $name:expr, $native:expr) => {
            LocaleConfig {
                code: $code,
                name: $name,
                native_name: $native,
                is_default: false,
                enabled: true,
            }
        };
    }

    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
        },
        locale!("hi", "Hindi", "हिन्दी"),
        locale!("bn", "Bengali", "বাংলা"),
        locale!("ta", "Tamil", "தமிழ்"),
        locale!("te", "Telugu", "తెలుగు"),
        locale!("kn", "Kannada", "ಕನ್ನಡ"),
        locale!("ml", "Malayalam", "മലയാളം"),
        locale!("mr", "Marathi", "मराठी"),
        locale!("gu", "Gujarati", "ગુજરાતી"),
        locale!("pa", "Punjabi", "ਪੰਜਾਬੀ"),
        locale!("or", "Odia", "ଓଡ଼ିଆ"),
        locale!("as", "Assamese", "অসমীয়া"),
        locale!("ur", "Urdu", "اردو"),
        locale!("sa", "Sanskrit", "संस्कृतम्"),
        locale!("ne", "Nepali", "नेपाली"),
        locale!("es", "Spanish", "Español"),
        locale!("fr", "French", "Français"),
        locale!("de", "German", "Deutsch"),
        locale!("ru", "Russian", "Русский"),
        locale!("pt", "Portuguese", "Português"),
        locale!("id", "Indonesian", "Bahasa Indonesia"),
    ]
}
