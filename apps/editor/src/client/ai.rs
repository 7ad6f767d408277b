//! Client for the Remote AI Service (`/ai/*`). The service only reads CV
//! content and returns text/analysis — it never mutates stored documents;
//! applying a result is the editor session's job.

use tracing::debug;

use crate::client::Http;
use crate::errors::EditorError;
use crate::models::ai::{
    AnalyzeRequest, CvAnalysis, ImproveRequest, ImproveResponse, JobOptimization,
    JobOptimizeRequest, SkillSuggestions, SuggestSkillsRequest,
};
use crate::models::cv::CvData;

#[derive(Clone)]
pub struct AiClient {
    http: Http,
}

impl AiClient {
    pub fn new(base_url: &str, session_token: &str) -> Self {
        AiClient {
            http: Http::new(base_url, session_token),
        }
    }

    /// Rewrites one section's text to be more professional and
    /// ATS-friendly. `section` is a label like "summary" or "experience".
    pub async fn improve(
        &self,
        section: &str,
        content: &str,
        context: Option<&str>,
    ) -> Result<ImproveResponse, EditorError> {
        debug!("AI improve requested for section '{section}'");
        let body = ImproveRequest {
            section,
            content,
            context,
        };
        self.http.post_json("/ai/improve", &body).await
    }

    /// Scores the CV and returns strengths, weaknesses and keyword gaps.
    pub async fn analyze(&self, cv_data: &CvData) -> Result<CvAnalysis, EditorError> {
        let body = AnalyzeRequest { cv_data };
        self.http.post_json("/ai/analyze", &body).await
    }

    /// Matches the CV against a job description.
    pub async fn optimize_for_job(
        &self,
        cv_data: &CvData,
        job_description: &str,
    ) -> Result<JobOptimization, EditorError> {
        let body = JobOptimizeRequest {
            cv_data,
            job_description,
        };
        self.http.post_json("/ai/optimize-for-job", &body).await
    }

    pub async fn suggest_skills(&self, job_title: &str) -> Result<SkillSuggestions, EditorError> {
        let body = SuggestSkillsRequest { job_title };
        self.http.post_json("/ai/suggest-skills", &body).await
    }
}
