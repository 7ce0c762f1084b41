//! Internationalization core for a multilingual content site.
//!
//! Three cooperating pieces:
//!
//! - [`resolver`]: turns layered signals (query parameter, cookie,
//!   `Accept-Language`, stored preference, device language) into exactly
//!   one locale code through a single canonical precedence chain.
//! - [`store`]: builds and caches deep-merged translation bundles; the
//!   default locale is eager, every other locale loads lazily on first
//!   use and is an override of the default.
//! - [`sync`]: keeps the URL, the persisted preference, and the locale
//!   cookie consistent with the active locale, with best-effort,
//!   isolated facet writes.
//!
//! Supporting modules: the locale [`registry`] and validated
//! [`language::Locale`] type, the [`merge`] algorithm, bundle
//! [`validator`] checks for the audit binary, and lookup [`metrics`].

pub mod config;
pub mod language;
pub mod merge;
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod sync;
pub mod validator;

pub use language::Locale;
pub use merge::deep_merge;
pub use metrics::{LookupMetrics, MetricsReport};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use resolver::{resolve, LocaleSignals};
pub use store::{BundleSource, FsBundleSource, LocaleStore, StaticBundleSource};
pub use sync::{LocaleCookie, LocaleSync, SyncFacets, SyncState};
pub use validator::{BundleValidator, ValidationReport};
