//! Locale store: materializes and serves translation bundles.
//!
//! The default locale's bundle is built eagerly at startup and is always
//! available without further I/O. Every other locale is constructed on
//! first request as the default bundle deep-merged with that locale's own
//! documents, then cached for the lifetime of the process. Content is
//! static, so cache entries are never invalidated.
//!
//! Lookups are total. A missing key renders the literal key path in the
//! UI — loud enough to notice, never fatal.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::language::Locale;
use crate::merge::{deep_merge, merge_documents};
use crate::metrics::LookupMetrics;

/// Errors raised while constructing a bundle.
///
/// These never cross the store's public boundary: `ensure_loaded`
/// swallows them and serves the default bundle instead.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("no content for locale '{0}'")]
    NotFound(String),

    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider of a locale's constituent documents.
///
/// `load` returns the per-topic documents in deterministic declaration
/// order; the merge that follows is left-biased by that order. The
/// future-based signature covers both backing styles the store needs: a
/// genuinely asynchronous filesystem reader and a synchronously-completing
/// in-memory source.
pub trait BundleSource: Send + Sync {
    fn load(&self, code: &str) -> BoxFuture<'_, Result<Vec<Value>, BundleError>>;
}

/// Filesystem-backed source: one directory per locale, one JSON document
/// per content topic, merged in filename order.
#[derive(Debug, Clone)]
pub struct FsBundleSource {
    content_dir: PathBuf,
}

impl FsBundleSource {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }
}

impl BundleSource for FsBundleSource {
    fn load(&self, code: &str) -> BoxFuture<'_, Result<Vec<Value>, BundleError>> {
        let locale_dir = self.content_dir.join(code);
        Box::pin(async move {
            let mut entries = match tokio::fs::read_dir(&locale_dir).await {
                Ok(entries) => entries,
                Err(_) => return Err(BundleError::NotFound(locale_dir.display().to_string())),
            };

            // Filename order is the declaration order for the merge.
            let mut paths = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(|source| {
                BundleError::Io {
                    path: locale_dir.display().to_string(),
                    source,
                }
            })? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    paths.push(path);
                }
            }
            paths.sort();

            if paths.is_empty() {
                return Err(BundleError::NotFound(locale_dir.display().to_string()));
            }

            let mut documents = Vec::with_capacity(paths.len());
            for path in paths {
                let text =
                    tokio::fs::read_to_string(&path)
                        .await
                        .map_err(|source| BundleError::Io {
                            path: path.display().to_string(),
                            source,
                        })?;
                let document =
                    serde_json::from_str(&text).map_err(|source| BundleError::Parse {
                        path: path.display().to_string(),
                        source,
                    })?;
                documents.push(document);
            }
            Ok(documents)
        })
    }
}

/// In-memory source for trusted process contexts and tests; completes
/// without suspending.
#[derive(Debug, Clone, Default)]
pub struct StaticBundleSource {
    documents: HashMap<String, Vec<Value>>,
}

impl StaticBundleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the documents for a locale, replacing any existing set.
    pub fn insert(mut self, code: impl Into<String>, documents: Vec<Value>) -> Self {
        self.documents.insert(code.into(), documents);
        self
    }
}

impl BundleSource for StaticBundleSource {
    fn load(&self, code: &str) -> BoxFuture<'_, Result<Vec<Value>, BundleError>> {
        let result = self
            .documents
            .get(code)
            .cloned()
            .ok_or_else(|| BundleError::NotFound(code.to_string()));
        Box::pin(async move { result })
    }
}

/// Process-wide cache of locale code to merged translation bundle.
///
/// Bundles are published atomically (a single map insert of a finished
/// `Arc<Value>`), so concurrent readers never observe a half-built
/// bundle. Duplicate concurrent loads of the same locale are tolerated;
/// the last insert wins and the results are identical anyway.
pub struct LocaleStore {
    source: Box<dyn BundleSource>,
    default_code: &'static str,
    default_bundle: Arc<Value>,
    cache: RwLock<HashMap<String, Arc<Value>>>,
}

impl fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleStore")
            .field("default_code", &self.default_code)
            .field("default_bundle", &self.default_bundle)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl LocaleStore {
    /// Build the store, eagerly constructing the default locale's bundle.
    ///
    /// This is the one place bundle construction is allowed to fail: a
    /// site without its default content is not startable.
    pub async fn initialize(source: impl BundleSource + 'static) -> Result<Self> {
        let default_code = Locale::default_locale().code();
        let documents = source
            .load(default_code)
            .await
            .with_context(|| format!("failed to load default locale '{}'", default_code))?;
        let default_bundle = Arc::new(merge_documents(documents));
        debug!(locale = default_code, "default bundle constructed");

        Ok(Self {
            source: Box::new(source),
            default_code,
            default_bundle: default_bundle.clone(),
            cache: RwLock::new(HashMap::from([(
                default_code.to_string(),
                default_bundle,
            )])),
        })
    }

    /// The default locale's code.
    pub fn default_code(&self) -> &'static str {
        self.default_code
    }

    /// The default locale's bundle.
    pub fn default_bundle(&self) -> Arc<Value> {
        self.default_bundle.clone()
    }

    /// Whether a bundle for `code` is already cached.
    pub fn is_loaded(&self, code: &str) -> bool {
        self.cache
            .read()
            .map(|cache| cache.contains_key(code))
            .unwrap_or(false)
    }

    /// Ensure the bundle for `code` is available, constructing it on
    /// first request.
    ///
    /// Total: on any construction failure the default bundle is returned
    /// and nothing is cached, so the next call retries implicitly.
    pub async fn ensure_loaded(&self, code: &str) -> Arc<Value> {
        if let Some(bundle) = self.cached(code) {
            LookupMetrics::global().record_bundle_hit();
            return bundle;
        }
        LookupMetrics::global().record_bundle_miss();
        LookupMetrics::global().record_bundle_load();

        match self.source.load(code).await {
            Ok(documents) => {
                // Non-default bundles are overrides of the default, so any
                // key the translation lacks falls back to the default
                // locale's value at construction time.
                let merged = documents
                    .into_iter()
                    .fold((*self.default_bundle).clone(), deep_merge);
                let bundle = Arc::new(merged);
                if let Ok(mut cache) = self.cache.write() {
                    cache.insert(code.to_string(), bundle.clone());
                }
                debug!(locale = code, "bundle constructed and cached");
                bundle
            }
            Err(error) => {
                LookupMetrics::global().record_bundle_load_failure();
                warn!(locale = code, %error, "bundle construction failed, serving default");
                self.default_bundle.clone()
            }
        }
    }

    /// Synchronous key-path lookup against already-cached data.
    ///
    /// Never loads. Returns the literal `key_path` when the bundle for
    /// `code` was never loaded, any path segment is missing, or the leaf
    /// is not a string.
    pub fn get(&self, code: &str, key_path: &str) -> String {
        let resolved = self
            .cached(code)
            .and_then(|bundle| lookup_path(&bundle, key_path).cloned());

        match resolved {
            Some(Value::String(text)) => {
                LookupMetrics::global().record_key_hit();
                text
            }
            _ => {
                LookupMetrics::global().record_key_miss();
                key_path.to_string()
            }
        }
    }

    /// Structured lookup for list/object content (chapter lists, verse
    /// collections). Cache-only, like `get`.
    pub fn get_value(&self, code: &str, key_path: &str) -> Option<Value> {
        self.cached(code)
            .and_then(|bundle| lookup_path(&bundle, key_path).cloned())
    }

    /// Page metadata lookup with `{{name}}` interpolation.
    ///
    /// Resolves `meta.<topic>` from the locale's bundle, falling back to
    /// the default bundle when the locale has nothing there, then
    /// interpolates every string leaf. Missing parameters interpolate to
    /// the empty string. Returns an empty object when no locale has the
    /// topic.
    pub fn get_meta(&self, topic: &str, params: &[(&str, &str)], code: &str) -> Value {
        let path = format!("meta.{}", topic);
        let meta = self
            .cached(code)
            .and_then(|bundle| lookup_path(&bundle, &path).cloned())
            .or_else(|| lookup_path(&self.default_bundle, &path).cloned());

        match meta {
            Some(mut value) => {
                interpolate_value(&mut value, params);
                value
            }
            None => Value::Object(Default::default()),
        }
    }

    fn cached(&self, code: &str) -> Option<Arc<Value>> {
        if code == self.default_code {
            return Some(self.default_bundle.clone());
        }
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(code).cloned())
    }
}

/// Walk a dot-delimited path through nested objects and arrays.
///
/// Numeric segments index into arrays ("chapters.0.title").
fn lookup_path<'a>(root: &'a Value, key_path: &str) -> Option<&'a Value> {
    if key_path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in key_path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid")
    })
}

/// Replace `{{name}}` tokens in a template. Missing parameters become
/// the empty string rather than leaking placeholder text into the page.
fn interpolate_str(template: &str, params: &[(&str, &str)]) -> String {
    placeholder_re()
        .replace_all(template, |captures: &regex::Captures<'_>| {
            let name = &captures[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Interpolate every string leaf of a value tree in place.
fn interpolate_value(value: &mut Value, params: &[(&str, &str)]) {
    match value {
        Value::String(text) => *text = interpolate_str(text, params),
        Value::Array(items) => {
            for item in items {
                interpolate_value(item, params);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                interpolate_value(item, params);
            }
        }
        _ => {}
    }
}
