//! Generic helpers over the repeatable section collections. All pure:
//! callers get a fresh `Vec`, never a mutated one.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::EditorError;
use crate::models::cv::{Certificate, Education, Experience, Language, Project, Skill};

/// One entry in a repeatable CV section, keyed by a unique id.
pub trait SectionItem: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

macro_rules! impl_section_item {
    ($($ty:ty),+) => {
        $(impl SectionItem for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

impl_section_item!(Experience, Education, Skill, Language, Certificate, Project);

/// Removes the item whose id matches. A true no-op when no item matches —
/// double-click removal from the UI must not error.
pub fn remove_by_id<T: SectionItem>(items: &[T], id: &str) -> Vec<T> {
    items.iter().filter(|item| item.id() != id).cloned().collect()
}

/// Shallow-merges `patch` into the item whose id matches, leaving every
/// other field and item untouched. No-op when no item matches. The `id`
/// key itself is immutable.
pub fn merge_by_id<T: SectionItem>(
    items: &[T],
    id: &str,
    patch: &Map<String, Value>,
) -> Result<Vec<T>, EditorError> {
    if patch.contains_key("id") {
        return Err(EditorError::Validation("item id is immutable".to_string()));
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if item.id() == id {
            out.push(shallow_merge(item, patch)?);
        } else {
            out.push(item.clone());
        }
    }
    Ok(out)
}

/// Replaces the named field of the item at `index`.
pub fn set_field<T: SectionItem>(
    items: &[T],
    index: usize,
    field: &str,
    value: Value,
) -> Result<Vec<T>, EditorError> {
    if index >= items.len() {
        return Err(EditorError::InvalidPath(format!(
            "item index {index} out of bounds (len {})",
            items.len()
        )));
    }
    if field == "id" {
        return Err(EditorError::Validation("item id is immutable".to_string()));
    }
    let mut patch = Map::new();
    patch.insert(field.to_string(), value);

    let mut out = items.to_vec();
    out[index] = shallow_merge(&items[index], &patch)?;
    Ok(out)
}

/// Deserializes a whole-collection replacement payload, enforcing the
/// id-uniqueness invariant.
pub fn replace_collection<T: SectionItem>(value: Value) -> Result<Vec<T>, EditorError> {
    let items: Vec<T> = serde_json::from_value(value)
        .map_err(|e| EditorError::Validation(format!("invalid collection payload: {e}")))?;

    let mut seen = HashSet::new();
    for item in &items {
        if !seen.insert(item.id().to_string()) {
            return Err(EditorError::Validation(format!(
                "duplicate item id '{}'",
                item.id()
            )));
        }
    }
    Ok(items)
}

fn shallow_merge<T: SectionItem>(item: &T, patch: &Map<String, Value>) -> Result<T, EditorError> {
    let mut obj = match serde_json::to_value(item)? {
        Value::Object(obj) => obj,
        _ => {
            return Err(EditorError::Validation(
                "section item did not serialize to an object".to_string(),
            ))
        }
    };
    for (key, value) in patch {
        if !obj.contains_key(key) {
            return Err(EditorError::InvalidPath(format!(
                "unknown item field '{key}'"
            )));
        }
        obj.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| EditorError::Validation(format!("invalid value for item field: {e}")))
}
