use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored CV document as returned by the Remote CV Service.
/// `cv_id`, `user_id` and the timestamps are server-assigned; everything
/// else is user-editable through the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    pub cv_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub data: CvData,
    #[serde(default)]
    pub settings: CvSettings,
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_title() -> String {
    "Untitled CV".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvData {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub languages: Vec<Language>,
    pub certificates: Vec<Certificate>,
    pub projects: Vec<Project>,
    pub section_order: Vec<String>,
}

impl Default for CvData {
    fn default() -> Self {
        CvData {
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experiences: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            certificates: Vec::new(),
            projects: Vec::new(),
            section_order: [
                "summary",
                "experience",
                "education",
                "skills",
                "languages",
                "certificates",
                "projects",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub website: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    /// Retained even when `current` is true; "Present" is a display-time
    /// resolution, not a storage-time one.
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
    /// beginner | intermediate | advanced | expert
    pub level: String,
    /// technical | soft
    pub category: String,
}

impl Default for Skill {
    fn default() -> Self {
        Skill {
            id: String::new(),
            name: String::new(),
            level: "intermediate".to_string(),
            category: "technical".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub id: String,
    pub name: String,
    /// native | fluent | professional | intermediate | basic
    pub proficiency: String,
}

impl Default for Language {
    fn default() -> Self {
        Language {
            id: String::new(),
            name: String::new(),
            proficiency: "professional".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub technologies: Vec<String>,
}

/// Presentation settings. `visible_sections` uses a BTreeMap so serialized
/// snapshots are deterministic — the autosave scheduler compares serialized
/// forms to detect reverted edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvSettings {
    pub template: String,
    pub primary_color: String,
    pub font_family: String,
    pub show_photo: bool,
    pub visible_sections: BTreeMap<String, bool>,
}

impl Default for CvSettings {
    fn default() -> Self {
        let visible_sections = [
            "summary",
            "experience",
            "education",
            "skills",
            "languages",
            "certificates",
            "projects",
        ]
        .iter()
        .map(|s| (s.to_string(), true))
        .collect();

        CvSettings {
            template: TemplateId::Minimal.as_str().to_string(),
            primary_color: "#064E3B".to_string(),
            font_family: "Plus Jakarta Sans".to_string(),
            show_photo: true,
            visible_sections,
        }
    }
}

impl CvSettings {
    /// Absent keys mean visible (default-visible policy, not default-hidden).
    pub fn is_section_visible(&self, name: &str) -> bool {
        self.visible_sections.get(name).copied().unwrap_or(true)
    }

    /// The effective template, with unknown identifiers falling back to the
    /// default at render time rather than being rejected at write time.
    pub fn effective_template(&self) -> TemplateId {
        TemplateId::parse(&self.template)
    }
}

/// The fixed set of visual templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Minimal,
    Corporate,
    Creative,
    Tech,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Minimal => "minimal",
            TemplateId::Corporate => "corporate",
            TemplateId::Creative => "creative",
            TemplateId::Tech => "tech",
        }
    }

    /// Lenient parse: unknown identifiers fall back to `Minimal`.
    pub fn parse(s: &str) -> TemplateId {
        match s {
            "corporate" => TemplateId::Corporate,
            "creative" => TemplateId::Creative,
            "tech" => TemplateId::Tech,
            _ => TemplateId::Minimal,
        }
    }
}

/// The repeatable CV sections, each an ordered collection of items keyed
/// by a unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Experiences,
    Education,
    Skills,
    Languages,
    Certificates,
    Projects,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Experiences,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Languages,
        SectionKind::Certificates,
        SectionKind::Projects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Experiences => "experiences",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Languages => "languages",
            SectionKind::Certificates => "certificates",
            SectionKind::Projects => "projects",
        }
    }

    pub fn parse(s: &str) -> Option<SectionKind> {
        SectionKind::ALL.iter().find(|k| k.as_str() == s).copied()
    }
}

/// Body of `POST /cvs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvCreate {
    pub title: String,
}

/// Body of `PUT /cvs/{id}` — whole-document replacement of the three
/// user-editable fields. Also the unit the autosave scheduler serializes
/// for snapshot comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvUpdate {
    pub title: String,
    pub data: CvData,
    pub settings: CvSettings,
}

impl CvUpdate {
    pub fn of(doc: &CvDocument) -> Self {
        CvUpdate {
            title: doc.title.clone(),
            data: doc.data.clone(),
            settings: doc.settings.clone(),
        }
    }
}

/// Share-link state for one CV. `share_token: None` means no active link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub share_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired: bool,
}

impl CvDocument {
    /// A fresh, empty document. Used by tests and as the local shape of a
    /// just-created CV before the server response is merged in.
    pub fn new(cv_id: impl Into<String>, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        CvDocument {
            cv_id: cv_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            data: CvData::default(),
            settings: CvSettings::default(),
            is_pro: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_falls_back_to_minimal() {
        let mut settings = CvSettings::default();
        settings.template = "vaporwave".to_string();
        assert_eq!(settings.effective_template(), TemplateId::Minimal);
    }

    #[test]
    fn test_absent_visible_section_defaults_to_visible() {
        let mut settings = CvSettings::default();
        settings.visible_sections.clear();
        assert!(settings.is_section_visible("experience"));

        settings.visible_sections.insert("experience".to_string(), false);
        assert!(!settings.is_section_visible("experience"));
    }

    #[test]
    fn test_partial_server_document_fills_defaults() {
        let doc: CvDocument =
            serde_json::from_str(r#"{"cv_id": "cv_abc123", "title": "My CV"}"#).unwrap();
        assert_eq!(doc.title, "My CV");
        assert_eq!(doc.settings.template, "minimal");
        assert!(doc.data.experiences.is_empty());
        assert_eq!(doc.data.section_order.len(), 7);
    }

    #[test]
    fn test_skill_defaults() {
        let skill = Skill::default();
        assert_eq!(skill.level, "intermediate");
        assert_eq!(skill.category, "technical");
    }
}
