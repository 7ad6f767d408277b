//! Field paths — a closed sum type over the legal mutation targets of a
//! `CvDocument`, parsed from the dotted-string form the UI layer speaks
//! (`data.personal_info.email`, `data.experiences[0].company`, ...).
//!
//! Enumerating the targets keeps silent auto-creation of undocumented
//! structure impossible: anything outside the schema is `InvalidPath` at
//! parse time.

use std::fmt;

use crate::errors::EditorError;
use crate::models::cv::SectionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// `title`
    Title,
    /// `data.summary`
    Summary,
    /// `data.personal_info.<field>`
    Personal(PersonalField),
    /// `data.<section>` — whole-collection replacement
    Section(SectionKind),
    /// `data.<section>[<index>].<field>` — one field of one item
    SectionItem {
        section: SectionKind,
        index: usize,
        field: String,
    },
    /// `settings.template`
    Template,
    /// `settings.primary_color`
    PrimaryColor,
    /// `settings.font_family`
    FontFamily,
    /// `settings.show_photo`
    ShowPhoto,
    /// `settings.visible_sections.<name>`
    VisibleSection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Location,
    Linkedin,
    Website,
    PhotoUrl,
}

impl PersonalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalField::FullName => "full_name",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::Location => "location",
            PersonalField::Linkedin => "linkedin",
            PersonalField::Website => "website",
            PersonalField::PhotoUrl => "photo_url",
        }
    }

    fn parse(s: &str) -> Option<PersonalField> {
        const ALL: [PersonalField; 7] = [
            PersonalField::FullName,
            PersonalField::Email,
            PersonalField::Phone,
            PersonalField::Location,
            PersonalField::Linkedin,
            PersonalField::Website,
            PersonalField::PhotoUrl,
        ];
        ALL.iter().find(|f| f.as_str() == s).copied()
    }
}

impl FieldPath {
    /// Parses a dotted path string. Any segment outside the documented
    /// document schema is rejected — no silent auto-creation.
    pub fn parse(path: &str) -> Result<FieldPath, EditorError> {
        let invalid = || EditorError::InvalidPath(path.to_string());
        let segments: Vec<&str> = path.split('.').collect();

        match segments.as_slice() {
            ["title"] => Ok(FieldPath::Title),
            ["data", "summary"] => Ok(FieldPath::Summary),
            ["data", "personal_info", field] => PersonalField::parse(field)
                .map(FieldPath::Personal)
                .ok_or_else(invalid),
            ["data", section] => SectionKind::parse(section)
                .map(FieldPath::Section)
                .ok_or_else(invalid),
            ["data", section, field] => {
                let (name, index) = split_indexed(section).ok_or_else(invalid)?;
                let kind = SectionKind::parse(name).ok_or_else(invalid)?;
                Ok(FieldPath::SectionItem {
                    section: kind,
                    index,
                    field: field.to_string(),
                })
            }
            ["settings", "template"] => Ok(FieldPath::Template),
            ["settings", "primary_color"] => Ok(FieldPath::PrimaryColor),
            ["settings", "font_family"] => Ok(FieldPath::FontFamily),
            ["settings", "show_photo"] => Ok(FieldPath::ShowPhoto),
            ["settings", "visible_sections", name] => {
                Ok(FieldPath::VisibleSection(name.to_string()))
            }
            _ => Err(invalid()),
        }
    }
}

/// Splits `experiences[3]` into `("experiences", 3)`.
fn split_indexed(segment: &str) -> Option<(&str, usize)> {
    let open = segment.find('[')?;
    let index = segment[open..]
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()?;
    Some((&segment[..open], index))
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Title => write!(f, "title"),
            FieldPath::Summary => write!(f, "data.summary"),
            FieldPath::Personal(field) => write!(f, "data.personal_info.{}", field.as_str()),
            FieldPath::Section(kind) => write!(f, "data.{}", kind.as_str()),
            FieldPath::SectionItem {
                section,
                index,
                field,
            } => write!(f, "data.{}[{index}].{field}", section.as_str()),
            FieldPath::Template => write!(f, "settings.template"),
            FieldPath::PrimaryColor => write!(f, "settings.primary_color"),
            FieldPath::FontFamily => write!(f, "settings.font_family"),
            FieldPath::ShowPhoto => write!(f, "settings.show_photo"),
            FieldPath::VisibleSection(name) => write!(f, "settings.visible_sections.{name}"),
        }
    }
}
