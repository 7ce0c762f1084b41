use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Content
    pub content_dir: PathBuf,

    // Audit behavior
    pub strict: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Root of the per-locale content tree (one directory per
            // locale, one JSON document per topic)
            content_dir: std::env::var("CONTENT_DIR")
                .unwrap_or_else(|_| "content/locales".to_string())
                .into(),

            // Strict mode: validation errors fail the audit run
            strict: std::env::var("LOCALE_CHECK_STRICT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }
}
