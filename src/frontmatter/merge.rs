use super::types::Metadata;
use serde_yaml::Value;
use tracing::error;

/// Deep-merge two YAML values, overlay winning on conflict.
///
/// Mappings merge key-wise and recurse where both sides hold a mapping.
/// Sequences and scalars are replaced wholly, never merged element-wise.
/// An explicit null (or absent key) in the overlay keeps the base value.
/// Inputs are not mutated; the result is a fresh value.
pub fn merge_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                if value.is_null() {
                    continue;
                }
                let replacement = match merged.get(key) {
                    Some(existing @ Value::Mapping(_)) if value.is_mapping() => {
                        merge_values(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), replacement);
            }
            Value::Mapping(merged)
        }
        (_, Value::Null) => base.clone(),
        _ => overlay.clone(),
    }
}

/// Fold layered defaults under file-level metadata into a typed record.
///
/// `layers` are applied general to specific, the file document last, so
/// the file always wins. The fold order is load-bearing: callers pass
/// ancestor configs exactly as collected and must not reorder them.
///
/// A decode failure of the merged value is not fatal for the document:
/// it falls back to the file-level metadata alone, and failing that, to
/// an empty record (which the collection build will drop for lack of a
/// title).
pub fn fold_metadata<'a, I>(layers: I, file: &Value) -> Metadata
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut merged = Value::Null;
    for layer in layers {
        merged = merge_values(&merged, layer);
    }
    merged = merge_values(&merged, file);

    match Metadata::from_value(merged) {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("failed to decode merged metadata, using file metadata only: {e}");
            Metadata::from_value(file.clone()).unwrap_or_else(|e| {
                error!("file metadata also failed to decode: {e}");
                Metadata::default()
            })
        }
    }
}
