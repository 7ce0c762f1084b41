//! Deep merge for translation documents.
//!
//! Bundles are built by folding independently-authored JSON documents
//! into one tree, and non-default locales are built as overrides of the
//! default bundle. Both uses share a single merge definition:
//!
//! - arrays merge index-wise and keep the target's length (an override
//!   can neither grow nor shrink a list, so a partially translated list
//!   keeps the default's tail);
//! - objects merge by key union, recursively;
//! - anything else: the source wins, except `null`, which stands for "no
//!   override here" and keeps the target.
//!
//! The merge is left-biased by declaration order and idempotent:
//! applying the same source twice equals applying it once.

use serde_json::Value;

/// Merge `source` into `target`, returning the combined value.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Array(target_items), Value::Array(mut source_items)) => {
            let merged = target_items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    if i < source_items.len() {
                        deep_merge(item, source_items[i].take())
                    } else {
                        item
                    }
                })
                .collect();
            Value::Array(merged)
        }
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.remove(&key) {
                    Some(target_value) => {
                        target_map.insert(key, deep_merge(target_value, source_value));
                    }
                    None => {
                        // Nulls never introduce new keys either.
                        if !source_value.is_null() {
                            target_map.insert(key, source_value);
                        }
                    }
                }
            }
            Value::Object(target_map)
        }
        // Scalar or type mismatch: source wins when it carries a value.
        (target, Value::Null) => target,
        (_, source) => source,
    }
}

/// Fold a sequence of documents into one tree, left-biased by order.
///
/// Later documents override scalar leaves of earlier ones at the same
/// path. An empty iterator yields an empty object.
pub fn merge_documents<I>(documents: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    documents
        .into_iter()
        .fold(Value::Object(Default::default()), deep_merge)
}
