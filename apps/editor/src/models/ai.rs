//! Request and response shapes for the Remote AI Service (`/ai/*`).
//! The service is opaque to the document store; only the "apply result to
//! a summary/description field" path feeds back into the document.

use serde::{Deserialize, Serialize};

use crate::models::cv::CvData;

#[derive(Debug, Serialize)]
pub struct ImproveRequest<'a> {
    pub section: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImproveResponse {
    pub improved: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub cv_data: &'a CvData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CvAnalysis {
    pub overall_score: u32,
    pub breakdown: ScoreBreakdown,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<Weakness>,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreBreakdown {
    pub content: u32,
    pub formatting: u32,
    pub keywords: u32,
    pub ats_compatibility: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Weakness {
    pub issue: String,
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
pub struct JobOptimizeRequest<'a> {
    pub cv_data: &'a CvData,
    pub job_description: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobOptimization {
    pub match_percentage: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<SectionSuggestion>,
    /// When present, appliable to `data.summary` exactly like a manual edit.
    #[serde(default)]
    pub optimized_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionSuggestion {
    pub section: String,
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestSkillsRequest<'a> {
    pub job_title: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillSuggestions {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
}
