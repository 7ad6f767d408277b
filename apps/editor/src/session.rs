//! Editor session — one open document, path-addressed edits, debounced
//! autosave, AI results applied in place.
//!
//! All collaborators are passed in explicitly (no ambient auth/config
//! lookup): the session can be exercised in tests with a mock save target
//! and no simulated global environment.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::info;

use crate::autosave::{AutosaveScheduler, SaveStatus, SaveTarget};
use crate::client::ai::AiClient;
use crate::document::store;
use crate::errors::EditorError;
use crate::models::ai::{CvAnalysis, JobOptimization, SkillSuggestions};
use crate::models::cv::{CvDocument, SectionKind};

pub struct EditorSession {
    document: CvDocument,
    scheduler: AutosaveScheduler,
}

impl EditorSession {
    /// Opens a session over a fetched document. The document as given is
    /// the autosave baseline — nothing is dirty yet.
    pub fn open(
        document: CvDocument,
        target: Arc<dyn SaveTarget>,
        debounce: Duration,
    ) -> Result<Self, EditorError> {
        let scheduler = AutosaveScheduler::spawn(target, &document, debounce)?;
        Ok(EditorSession {
            document,
            scheduler,
        })
    }

    pub fn document(&self) -> &CvDocument {
        &self.document
    }

    /// Applies a path-addressed edit and schedules an autosave.
    pub fn edit(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        self.document = store::set_path(&self.document, path, value)?;
        self.scheduler.document_changed(&self.document);
        Ok(())
    }

    /// Appends an empty item to the section; returns its id.
    pub fn add_item(&mut self, section: SectionKind) -> String {
        let (next, id) = store::add_item(&self.document, section);
        self.document = next;
        self.scheduler.document_changed(&self.document);
        id
    }

    pub fn remove_item(&mut self, section: SectionKind, id: &str) {
        self.document = store::remove_item(&self.document, section, id);
        self.scheduler.document_changed(&self.document);
    }

    /// Requests an AI rewrite of the summary and applies it in place.
    /// A failed call leaves the document exactly as it was.
    pub async fn improve_summary(&mut self, ai: &AiClient) -> Result<(), EditorError> {
        let response = ai.improve("summary", &self.document.data.summary, None).await?;
        self.edit("data.summary", Value::String(response.improved))
    }

    /// Requests an AI rewrite of one item's description and applies it to
    /// that item only. Works for the sections that carry a description
    /// (experiences, education, projects).
    pub async fn improve_item_description(
        &mut self,
        ai: &AiClient,
        section: SectionKind,
        item_id: &str,
    ) -> Result<(), EditorError> {
        let content = self.item_description(section, item_id)?;
        let response = ai.improve(improve_label(section)?, &content, None).await?;
        self.apply_improved_description(section, item_id, response.improved)
    }

    /// Scores the current document. Read-only.
    pub async fn analyze(&self, ai: &AiClient) -> Result<CvAnalysis, EditorError> {
        ai.analyze(&self.document.data).await
    }

    /// Matches the document against a job description; when the result
    /// carries an optimized summary it is applied through the same path
    /// as a manual edit.
    pub async fn optimize_for_job(
        &mut self,
        ai: &AiClient,
        job_description: &str,
    ) -> Result<JobOptimization, EditorError> {
        let result = ai.optimize_for_job(&self.document.data, job_description).await?;
        if let Some(summary) = &result.optimized_summary {
            self.edit("data.summary", Value::String(summary.clone()))?;
            info!("Applied optimized summary to CV {}", self.document.cv_id);
        }
        Ok(result)
    }

    pub async fn suggest_skills(
        &self,
        ai: &AiClient,
        job_title: &str,
    ) -> Result<SkillSuggestions, EditorError> {
        ai.suggest_skills(job_title).await
    }

    pub fn save_status(&self) -> SaveStatus {
        self.scheduler.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.scheduler.subscribe()
    }

    pub fn retry_save(&self) {
        self.scheduler.retry();
    }

    /// Attempts any pending save immediately. Best effort.
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Flushes pending changes and tears the session down. Called when
    /// navigating away from the editor.
    pub async fn close(self) {
        self.scheduler.shutdown().await;
    }

    /// Applies an already-obtained improved description to one item,
    /// leaving every other field and item untouched.
    pub fn apply_improved_description(
        &mut self,
        section: SectionKind,
        item_id: &str,
        improved: String,
    ) -> Result<(), EditorError> {
        let mut patch = Map::new();
        patch.insert("description".to_string(), Value::String(improved));
        self.document = store::update_item(&self.document, section, item_id, &patch)?;
        self.scheduler.document_changed(&self.document);
        Ok(())
    }

    fn item_description(
        &self,
        section: SectionKind,
        item_id: &str,
    ) -> Result<String, EditorError> {
        let data = &self.document.data;
        let found = match section {
            SectionKind::Experiences => data
                .experiences
                .iter()
                .find(|e| e.id == item_id)
                .map(|e| e.description.clone()),
            SectionKind::Education => data
                .education
                .iter()
                .find(|e| e.id == item_id)
                .map(|e| e.description.clone()),
            SectionKind::Projects => data
                .projects
                .iter()
                .find(|p| p.id == item_id)
                .map(|p| p.description.clone()),
            other => {
                return Err(EditorError::Validation(format!(
                    "section '{}' has no description field",
                    other.as_str()
                )))
            }
        };
        found.ok_or_else(|| {
            EditorError::NotFound(format!("item '{item_id}' in {}", section.as_str()))
        })
    }
}

fn improve_label(section: SectionKind) -> Result<&'static str, EditorError> {
    match section {
        SectionKind::Experiences => Ok("experience"),
        SectionKind::Education => Ok("education"),
        SectionKind::Projects => Ok("project"),
        other => Err(EditorError::Validation(format!(
            "section '{}' has no description field",
            other.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::DEFAULT_DEBOUNCE;
    use crate::models::cv::CvUpdate;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTarget {
        saved: Mutex<Vec<CvUpdate>>,
    }

    #[async_trait]
    impl SaveTarget for RecordingTarget {
        async fn save(&self, cv_id: &str, update: &CvUpdate) -> Result<CvDocument, EditorError> {
            self.saved.lock().unwrap().push(update.clone());
            Ok(CvDocument::new(cv_id, "user_1", &update.title))
        }
    }

    fn session_with(target: Arc<RecordingTarget>) -> EditorSession {
        let doc = CvDocument::new("cv_test01", "user_1", "Test CV");
        EditorSession::open(doc, target, DEFAULT_DEBOUNCE).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_marks_session_dirty() {
        let target = Arc::new(RecordingTarget::default());
        let mut session = session_with(target.clone());

        session
            .edit("data.personal_info.full_name", json!("Jane Doe"))
            .unwrap();
        assert_eq!(session.document().data.personal_info.full_name, "Jane Doe");

        tokio::task::yield_now().await;
        assert_eq!(session.save_status(), SaveStatus::PendingSave);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_and_remove_item_through_session() {
        let target = Arc::new(RecordingTarget::default());
        let mut session = session_with(target.clone());

        let id = session.add_item(SectionKind::Experiences);
        assert_eq!(session.document().data.experiences.len(), 1);

        session.remove_item(SectionKind::Experiences, &id);
        assert!(session.document().data.experiences.is_empty());

        // Double-click: removing again is harmless.
        session.remove_item(SectionKind::Experiences, &id);
        assert!(session.document().data.experiences.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_improved_description_touches_one_field_only() {
        let target = Arc::new(RecordingTarget::default());
        let mut session = session_with(target.clone());

        let id = session.add_item(SectionKind::Experiences);
        session
            .edit("data.experiences[0].company", json!("Globex"))
            .unwrap();
        session
            .edit("data.experiences[0].position", json!("Engineer"))
            .unwrap();
        let other_id = session.add_item(SectionKind::Experiences);

        session
            .apply_improved_description(
                SectionKind::Experiences,
                &id,
                "Led a team of 5 engineers.".to_string(),
            )
            .unwrap();

        let experiences = &session.document().data.experiences;
        assert_eq!(experiences[0].description, "Led a team of 5 engineers.");
        assert_eq!(experiences[0].company, "Globex");
        assert_eq!(experiences[0].position, "Engineer");
        assert_eq!(experiences[0].id, id);
        assert_eq!(experiences[1].id, other_id);
        assert_eq!(experiences[1].description, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending_edits() {
        let target = Arc::new(RecordingTarget::default());
        let mut session = session_with(target.clone());

        session.edit("title", json!("Final title")).unwrap();
        session.close().await;

        let saved = target.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Final title");
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_description_lookup_errors() {
        let target = Arc::new(RecordingTarget::default());
        let mut session = session_with(target.clone());
        session.add_item(SectionKind::Skills);

        assert!(matches!(
            session.item_description(SectionKind::Skills, "any"),
            Err(EditorError::Validation(_))
        ));
        assert!(matches!(
            session.item_description(SectionKind::Experiences, "missing"),
            Err(EditorError::NotFound(_))
        ));
    }
}
