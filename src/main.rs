use anyhow::{bail, Result};
use tracing::{info, warn};

use sanatana_i18n::config::Config;
use sanatana_i18n::merge::merge_documents;
use sanatana_i18n::metrics::LookupMetrics;
use sanatana_i18n::registry::LocaleRegistry;
use sanatana_i18n::store::{BundleSource, FsBundleSource, LocaleStore};
use sanatana_i18n::validator::BundleValidator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sanatana_i18n=info".parse()?),
        )
        .init();

    info!("Starting locale content audit");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Content directory: {}", config.content_dir.display());

    let source = FsBundleSource::new(&config.content_dir);
    let store = LocaleStore::initialize(source.clone()).await?;
    let default_bundle = store.default_bundle();

    let mut error_count = 0usize;
    let mut warning_count = 0usize;

    for locale in LocaleRegistry::get().list_enabled() {
        if locale.is_default {
            continue;
        }

        // Validate the locale's raw merge (before the default backfill)
        // so missing keys are still visible.
        let raw = match source.load(locale.code).await {
            Ok(documents) => merge_documents(documents),
            Err(error) => {
                warn!(
                    locale = locale.code,
                    %error,
                    "no content; locale will serve the default bundle"
                );
                continue;
            }
        };

        let report = BundleValidator::validate(&default_bundle, &raw);
        error_count += report.errors.len();
        warning_count += report.warnings.len();

        if report.is_clean() {
            info!(locale = locale.code, "clean");
        } else {
            for error in &report.errors {
                warn!(locale = locale.code, "error: {}", error);
            }
            for warning in &report.warnings {
                info!(locale = locale.code, "warning: {}", warning);
            }
        }

        // Exercise the runtime path too, so the cache metrics below
        // reflect a full load of every locale.
        store.ensure_loaded(locale.code).await;
    }

    let metrics = LookupMetrics::global().report();
    info!(
        "Audit complete: {} errors, {} warnings, {} bundle loads ({} failed)",
        error_count, warning_count, metrics.bundle_loads, metrics.bundle_load_failures
    );

    if config.strict && error_count > 0 {
        bail!("{} validation errors in strict mode", error_count);
    }
    Ok(())
}
