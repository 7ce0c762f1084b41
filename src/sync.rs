//! Persistence synchronizer: owns the active locale and keeps the URL,
//! the persisted preference, and the cookie from disagreeing with it.
//!
//! Lifecycle is `Uninitialized -> Resolving -> Active`. Resolution runs
//! the canonical precedence chain exactly once; afterwards the only
//! transition trigger is an explicit `change_locale` call, which returns
//! the synchronizer to `Active`.
//!
//! Facet writes are best-effort and isolated: a blocked cookie or denied
//! storage logs a warning and the remaining steps still run. There is no
//! rollback across facets — a stale facet self-heals on the next change.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::resolver::{LocaleSignals, SystemLanguage};
use crate::store::LocaleStore;

/// Name shared by the cookie and the persisted key/value entry.
pub const PREFERENCE_KEY: &str = "sanatana_dharma_language";

/// Cookie lifetime: one year.
pub const COOKIE_MAX_AGE_SECS: u64 = 31_536_000;

/// The locale preference cookie, scoped to the whole site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCookie {
    pub value: String,
}

impl LocaleCookie {
    pub fn new(code: impl Into<String>) -> Self {
        Self { value: code.into() }
    }

    /// Render the `Set-Cookie` attribute string.
    pub fn header_value(&self) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            PREFERENCE_KEY, self.value, COOKIE_MAX_AGE_SECS
        )
    }
}

/// Persisted key/value preference: holds the last explicitly chosen
/// locale, never the passively detected one, so "no explicit choice yet"
/// stays distinguishable from "user chose the default".
pub trait PreferenceStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, code: &str) -> Result<()>;
}

/// Cookie facet.
pub trait CookieStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, cookie: &LocaleCookie) -> Result<()>;
}

/// URL query-string facet: the `lang` parameter, updated without a full
/// page reload.
pub trait UrlState: Send + Sync {
    fn read_lang(&self) -> Result<Option<String>>;
    fn write_lang(&self, code: &str) -> Result<()>;
}

/// Hook asking server-rendered portions of the page to re-fetch with the
/// new cookie value.
pub trait PageRefresher: Send + Sync {
    fn refresh(&self) -> Result<()>;
}

/// Synchronizer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Before the client has mounted; consumers see the default locale.
    Uninitialized,
    /// The precedence chain is being evaluated (happens once).
    Resolving,
    /// Steady state; only `change_locale` transitions from here.
    Active,
}

/// The three storage facets plus the server-refresh hook.
pub struct SyncFacets {
    pub preference: Arc<dyn PreferenceStorage>,
    pub cookie: Arc<dyn CookieStorage>,
    pub url: Arc<dyn UrlState>,
    pub refresher: Arc<dyn PageRefresher>,
}

/// Owner of the single mutable "active locale" state.
///
/// The watch channel is the shared read/write handle: any consumer can
/// read the current code synchronously via [`current`](Self::current)
/// and observe changes via [`subscribe`](Self::subscribe); only the
/// synchronizer writes.
pub struct LocaleSync {
    store: Arc<LocaleStore>,
    active: watch::Sender<String>,
    state: Mutex<SyncState>,
    facets: SyncFacets,
}

impl LocaleSync {
    /// Create an uninitialized synchronizer; consumers observe the
    /// default locale until `initialize` runs.
    pub fn new(store: Arc<LocaleStore>, facets: SyncFacets) -> Self {
        let (active, _) = watch::channel(store.default_code().to_string());
        Self {
            store,
            active,
            state: Mutex::new(SyncState::Uninitialized),
            facets,
        }
    }

    /// The currently active locale code.
    pub fn current(&self) -> String {
        self.active.borrow().clone()
    }

    /// Subscribe to active-locale changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.active.subscribe()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Run the precedence chain once, load the resolved locale, and
    /// publish it to all consumers.
    ///
    /// Publication is deferred past the current scheduler tick so that a
    /// consumer which triggered initialization during its own render
    /// pass observes the change only afterwards. Calling a second time
    /// is a no-op returning the already-active code.
    pub async fn initialize(&self, system: &dyn SystemLanguage) -> String {
        {
            let mut state = self.state.lock().expect("state lock poisoned");
            if *state != SyncState::Uninitialized {
                return self.current();
            }
            *state = SyncState::Resolving;
        }

        let signals = LocaleSignals {
            query_param: read_facet("url", self.facets.url.read_lang()),
            cookie: read_facet("cookie", self.facets.cookie.read()),
            accept_language: None,
            stored_preference: read_facet("preference", self.facets.preference.read()),
            device_language: system.device_language(),
        };
        let code = signals.resolve();
        debug!(locale = %code, "initial locale resolved");

        self.store.ensure_loaded(&code).await;

        // Defer publication to the next tick.
        tokio::task::yield_now().await;
        self.active.send_replace(code.clone());

        *self.state.lock().expect("state lock poisoned") = SyncState::Active;
        code
    }

    /// User-initiated locale change.
    ///
    /// Steps run in a fixed initiation order: load the bundle (awaited),
    /// publish the new code, then best-effort writes to the persisted
    /// store, the cookie, the URL, and finally the server-refresh hook.
    /// Concurrent calls are last-write-wins.
    pub async fn change_locale(&self, code: &str) {
        self.store.ensure_loaded(code).await;

        self.active.send_replace(code.to_string());
        *self.state.lock().expect("state lock poisoned") = SyncState::Active;

        best_effort("preference storage", self.facets.preference.write(code));
        best_effort(
            "cookie",
            self.facets.cookie.write(&LocaleCookie::new(code)),
        );
        best_effort("url", self.facets.url.write_lang(code));
        best_effort("page refresh", self.facets.refresher.refresh());
    }
}

/// Read one facet, treating any failure as "signal absent".
fn read_facet(facet: &str, result: Result<Option<String>>) -> Option<String> {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(facet, %error, "facet read failed, treating signal as absent");
            None
        }
    }
}

/// Run one best-effort write; failure is logged and swallowed.
fn best_effort(facet: &str, result: Result<()>) {
    if let Err(error) = result {
        warn!(facet, %error, "best-effort write failed, continuing");
    }
}

// ---------------------------------------------------------------------
// In-memory facet implementations
// ---------------------------------------------------------------------

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreference {
    value: Mutex<Option<String>>,
}

impl MemoryPreference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(code: &str) -> Self {
        Self {
            value: Mutex::new(Some(code.to_string())),
        }
    }
}

impl PreferenceStorage for MemoryPreference {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.lock().expect("lock poisoned").clone())
    }

    fn write(&self, code: &str) -> Result<()> {
        *self.value.lock().expect("lock poisoned") = Some(code.to_string());
        Ok(())
    }
}

/// In-memory cookie jar holding the one locale cookie.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    value: Mutex<Option<String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(code: &str) -> Self {
        Self {
            value: Mutex::new(Some(code.to_string())),
        }
    }
}

impl CookieStorage for MemoryCookieJar {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.lock().expect("lock poisoned").clone())
    }

    fn write(&self, cookie: &LocaleCookie) -> Result<()> {
        *self.value.lock().expect("lock poisoned") = Some(cookie.value.clone());
        Ok(())
    }
}

/// In-memory URL query state.
#[derive(Debug, Default)]
pub struct MemoryUrl {
    lang: Mutex<Option<String>>,
}

impl MemoryUrl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lang(code: &str) -> Self {
        Self {
            lang: Mutex::new(Some(code.to_string())),
        }
    }
}

impl UrlState for MemoryUrl {
    fn read_lang(&self) -> Result<Option<String>> {
        Ok(self.lang.lock().expect("lock poisoned").clone())
    }

    fn write_lang(&self, code: &str) -> Result<()> {
        *self.lang.lock().expect("lock poisoned") = Some(code.to_string());
        Ok(())
    }
}

/// Refresh hook that counts invocations.
#[derive(Debug, Default)]
pub struct CountingRefresher {
    count: std::sync::atomic::AtomicUsize,
}

impl CountingRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl PageRefresher for CountingRefresher {
    fn refresh(&self) -> Result<()> {
        self.count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
