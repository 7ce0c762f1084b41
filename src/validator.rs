//! Bundle quality validation.
//!
//! Compares a locale's bundle against the default bundle's shape so
//! content drift (missing keys, pruned list entries, renamed
//! placeholders) surfaces in the audit binary instead of as literal key
//! paths in the rendered site.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Structural problems that will lose content at render time
    pub errors: Vec<String>,

    /// Non-critical drift worth a content author's attention
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator comparing locale bundles against the default shape.
pub struct BundleValidator;

// Placeholder pattern, cached for reuse across calls
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid"))
}

impl BundleValidator {
    /// Validate a locale's raw documents-merge against the default
    /// bundle.
    ///
    /// Checks that:
    /// - every key path in the default exists in the locale (missing →
    ///   warning: the merge will backfill English);
    /// - values at the same path have the same shape (mismatch → error:
    ///   the override clobbers structured content);
    /// - string leaves carry the same `{{placeholder}}` set (drift →
    ///   warning: interpolation params will vanish or leak).
    pub fn validate(default_bundle: &Value, locale_bundle: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();
        compare("", default_bundle, locale_bundle, &mut report);
        report
    }

    /// Extract the set of `{{placeholder}}` names from a template.
    pub fn extract_placeholders(template: &str) -> BTreeSet<String> {
        placeholder_regex()
            .captures_iter(template)
            .map(|captures| captures[1].to_string())
            .collect()
    }
}

fn compare(path: &str, default: &Value, locale: &Value, report: &mut ValidationReport) {
    match (default, locale) {
        (Value::Object(default_map), Value::Object(locale_map)) => {
            for (key, default_value) in default_map {
                let child_path = join(path, key);
                match locale_map.get(key) {
                    Some(locale_value) => {
                        compare(&child_path, default_value, locale_value, report)
                    }
                    None => report
                        .warnings
                        .push(format!("missing key '{}' (default value backfills)", child_path)),
                }
            }
            for key in locale_map.keys() {
                if !default_map.contains_key(key) {
                    report.warnings.push(format!(
                        "extra key '{}' not present in default locale",
                        join(path, key)
                    ));
                }
            }
        }
        (Value::Array(default_items), Value::Array(locale_items)) => {
            if locale_items.len() != default_items.len() {
                report.warnings.push(format!(
                    "list '{}' has {} entries, default has {} (positional merge keeps default length)",
                    path,
                    locale_items.len(),
                    default_items.len()
                ));
            }
            let shared = default_items.len().min(locale_items.len());
            for i in 0..shared {
                compare(
                    &join(path, &i.to_string()),
                    &default_items[i],
                    &locale_items[i],
                    report,
                );
            }
        }
        (Value::String(default_text), Value::String(locale_text)) => {
            let default_params = BundleValidator::extract_placeholders(default_text);
            let locale_params = BundleValidator::extract_placeholders(locale_text);
            if default_params != locale_params {
                report.warnings.push(format!(
                    "placeholder mismatch at '{}': default has {:?}, locale has {:?}",
                    path, default_params, locale_params
                ));
            }
        }
        // Null in the locale means "no override", which is always safe.
        (_, Value::Null) => {}
        (default, locale) => {
            if kind(default) != kind(locale) {
                report.errors.push(format!(
                    "type mismatch at '{}': default is {}, locale is {}",
                    path,
                    kind(default),
                    kind(locale)
                ));
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
