//! The Document Store — holds no state of its own; every operation takes
//! the current snapshot and returns a new one with exactly the addressed
//! field replaced. Value semantics (`Clone`) guarantee the returned
//! snapshot shares no mutable substructure with its predecessor, which is
//! what lets the autosave scheduler diff serialized forms cheaply.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::items;
use crate::document::path::{FieldPath, PersonalField};
use crate::errors::EditorError;
use crate::models::cv::{
    Certificate, CvData, CvDocument, Education, Experience, Language, Project, SectionKind, Skill,
};

/// Replaces the field addressed by `path` with `value`.
///
/// Fails with `InvalidPath` when the path does not exist on the document
/// schema and `Validation` when the value's JSON type does not match the
/// field. Never persists — that is the scheduler's job.
pub fn set(doc: &CvDocument, path: &FieldPath, value: Value) -> Result<CvDocument, EditorError> {
    let mut next = doc.clone();
    match path {
        FieldPath::Title => next.title = expect_string(value, "title")?,
        FieldPath::Summary => next.data.summary = expect_string(value, "data.summary")?,
        FieldPath::Personal(field) => {
            let s = expect_string(value, field.as_str())?;
            let info = &mut next.data.personal_info;
            match field {
                PersonalField::FullName => info.full_name = s,
                PersonalField::Email => info.email = s,
                PersonalField::Phone => info.phone = s,
                PersonalField::Location => info.location = s,
                PersonalField::Linkedin => info.linkedin = s,
                PersonalField::Website => info.website = s,
                PersonalField::PhotoUrl => info.photo_url = s,
            }
        }
        FieldPath::Section(kind) => replace_section(&mut next.data, *kind, value)?,
        FieldPath::SectionItem {
            section,
            index,
            field,
        } => set_item_field(&mut next.data, *section, *index, field, value)?,
        FieldPath::Template => next.settings.template = expect_string(value, "settings.template")?,
        FieldPath::PrimaryColor => {
            next.settings.primary_color = expect_string(value, "settings.primary_color")?
        }
        FieldPath::FontFamily => {
            next.settings.font_family = expect_string(value, "settings.font_family")?
        }
        FieldPath::ShowPhoto => {
            next.settings.show_photo = expect_bool(value, "settings.show_photo")?
        }
        FieldPath::VisibleSection(name) => {
            let visible = expect_bool(value, name)?;
            next.settings.visible_sections.insert(name.clone(), visible);
        }
    }
    Ok(next)
}

/// Convenience wrapper: parse the dotted path string, then `set`.
pub fn set_path(doc: &CvDocument, path: &str, value: Value) -> Result<CvDocument, EditorError> {
    set(doc, &FieldPath::parse(path)?, value)
}

/// Appends the section's default item template with a fresh unique id,
/// preserving existing order (new item is last). Returns the new id so the
/// caller can focus the added row.
pub fn add_item(doc: &CvDocument, section: SectionKind) -> (CvDocument, String) {
    let mut next = doc.clone();
    let id = new_item_id(section);
    let data = &mut next.data;
    match section {
        SectionKind::Experiences => data.experiences.push(Experience {
            id: id.clone(),
            ..Default::default()
        }),
        SectionKind::Education => data.education.push(Education {
            id: id.clone(),
            ..Default::default()
        }),
        SectionKind::Skills => data.skills.push(Skill {
            id: id.clone(),
            ..Default::default()
        }),
        SectionKind::Languages => data.languages.push(Language {
            id: id.clone(),
            ..Default::default()
        }),
        SectionKind::Certificates => data.certificates.push(Certificate {
            id: id.clone(),
            ..Default::default()
        }),
        SectionKind::Projects => data.projects.push(Project {
            id: id.clone(),
            ..Default::default()
        }),
    }
    (next, id)
}

/// Removes the item with the given id. Returns an equal document when no
/// item matches.
pub fn remove_item(doc: &CvDocument, section: SectionKind, id: &str) -> CvDocument {
    let mut next = doc.clone();
    let data = &mut next.data;
    match section {
        SectionKind::Experiences => data.experiences = items::remove_by_id(&data.experiences, id),
        SectionKind::Education => data.education = items::remove_by_id(&data.education, id),
        SectionKind::Skills => data.skills = items::remove_by_id(&data.skills, id),
        SectionKind::Languages => data.languages = items::remove_by_id(&data.languages, id),
        SectionKind::Certificates => {
            data.certificates = items::remove_by_id(&data.certificates, id)
        }
        SectionKind::Projects => data.projects = items::remove_by_id(&data.projects, id),
    }
    next
}

/// Shallow-merges a partial update into the item with the given id.
/// Used by the AI-apply path, where only one field (e.g. `description`)
/// comes back. No-op when no item matches.
pub fn update_item(
    doc: &CvDocument,
    section: SectionKind,
    id: &str,
    patch: &Map<String, Value>,
) -> Result<CvDocument, EditorError> {
    let mut next = doc.clone();
    let data = &mut next.data;
    match section {
        SectionKind::Experiences => {
            data.experiences = items::merge_by_id(&data.experiences, id, patch)?
        }
        SectionKind::Education => data.education = items::merge_by_id(&data.education, id, patch)?,
        SectionKind::Skills => data.skills = items::merge_by_id(&data.skills, id, patch)?,
        SectionKind::Languages => data.languages = items::merge_by_id(&data.languages, id, patch)?,
        SectionKind::Certificates => {
            data.certificates = items::merge_by_id(&data.certificates, id, patch)?
        }
        SectionKind::Projects => data.projects = items::merge_by_id(&data.projects, id, patch)?,
    }
    Ok(next)
}

fn new_item_id(section: SectionKind) -> String {
    format!("{}_{}", section.as_str(), Uuid::new_v4().simple())
}

fn replace_section(data: &mut CvData, kind: SectionKind, value: Value) -> Result<(), EditorError> {
    match kind {
        SectionKind::Experiences => data.experiences = items::replace_collection(value)?,
        SectionKind::Education => data.education = items::replace_collection(value)?,
        SectionKind::Skills => data.skills = items::replace_collection(value)?,
        SectionKind::Languages => data.languages = items::replace_collection(value)?,
        SectionKind::Certificates => data.certificates = items::replace_collection(value)?,
        SectionKind::Projects => data.projects = items::replace_collection(value)?,
    }
    Ok(())
}

fn set_item_field(
    data: &mut CvData,
    kind: SectionKind,
    index: usize,
    field: &str,
    value: Value,
) -> Result<(), EditorError> {
    match kind {
        SectionKind::Experiences => {
            data.experiences = items::set_field(&data.experiences, index, field, value)?
        }
        SectionKind::Education => {
            data.education = items::set_field(&data.education, index, field, value)?
        }
        SectionKind::Skills => data.skills = items::set_field(&data.skills, index, field, value)?,
        SectionKind::Languages => {
            data.languages = items::set_field(&data.languages, index, field, value)?
        }
        SectionKind::Certificates => {
            data.certificates = items::set_field(&data.certificates, index, field, value)?
        }
        SectionKind::Projects => {
            data.projects = items::set_field(&data.projects, index, field, value)?
        }
    }
    Ok(())
}

fn expect_string(value: Value, field: &str) -> Result<String, EditorError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(EditorError::Validation(format!(
            "expected a string for '{field}', got {}",
            json_type(&other)
        ))),
    }
}

fn expect_bool(value: Value, field: &str) -> Result<bool, EditorError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(EditorError::Validation(format!(
            "expected a boolean for '{field}', got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
