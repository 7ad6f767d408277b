//! Autosave Scheduler — turns a burst of rapid edits into at most one
//! persistence call per quiet period.
//!
//! A spawned worker task owns the state machine (Idle → PendingSave →
//! Saving → Idle | SaveFailed). Edits arrive over an unbounded channel
//! and restart the debounce timer; the current status leaves over a watch
//! channel for UI feedback. Saves are serialized: the worker issues one
//! request at a time, and edits made while a save is in flight coalesce
//! into the next window after it completes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::EditorError;
use crate::models::cv::{CvDocument, CvUpdate};

/// Quiet period after the last edit before a save is issued. Bounds write
/// amplification during fast typing; not a correctness mechanism.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Last persisted snapshot equals the current one.
    Idle,
    /// Unsaved changes exist; the debounce timer is running.
    PendingSave,
    /// A persistence request is in flight.
    Saving,
    /// The last request errored; the unsaved snapshot is retained and the
    /// next edit (or an explicit retry) rearms the timer.
    SaveFailed,
}

/// Persistence seam. The production implementation is `CvServiceClient`
/// (whole-document PUT); tests swap in a recording mock.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save(&self, cv_id: &str, update: &CvUpdate) -> Result<CvDocument, EditorError>;
}

enum Command {
    Changed(Box<CvUpdate>),
    Retry,
    Flush(oneshot::Sender<()>),
}

/// Handle to the per-document autosave worker.
pub struct AutosaveScheduler {
    tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<SaveStatus>,
    worker: JoinHandle<()>,
}

impl AutosaveScheduler {
    /// Spawns the worker with `baseline` as the last-persisted snapshot
    /// (the document as fetched — nothing to save yet).
    pub fn spawn(
        target: Arc<dyn SaveTarget>,
        baseline: &CvDocument,
        debounce: Duration,
    ) -> Result<Self, EditorError> {
        let last_saved = serde_json::to_string(&CvUpdate::of(baseline))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::Idle);

        let worker = Worker {
            cv_id: baseline.cv_id.clone(),
            target,
            debounce,
            rx,
            status_tx,
            last_saved,
            pending: None,
            armed: false,
        };
        Ok(AutosaveScheduler {
            tx,
            status_rx,
            worker: tokio::spawn(worker.run()),
        })
    }

    /// Called after every mutation with the new snapshot. Cheap; the
    /// serialized-equality check happens on the worker.
    pub fn document_changed(&self, doc: &CvDocument) {
        let _ = self.tx.send(Command::Changed(Box::new(CvUpdate::of(doc))));
    }

    /// Rearms the timer after a failed save without requiring a new edit.
    pub fn retry(&self) {
        let _ = self.tx.send(Command::Retry);
    }

    pub fn status(&self) -> SaveStatus {
        *self.status_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }

    /// Attempts any pending save immediately, skipping the remaining
    /// debounce. Best effort — a failed flush is not retried.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Flush, then stop the worker. Used on navigation away from the editor.
    pub async fn shutdown(self) {
        self.flush().await;
        drop(self.tx);
        let _ = self.worker.await;
    }
}

struct Worker {
    cv_id: String,
    target: Arc<dyn SaveTarget>,
    debounce: Duration,
    rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<SaveStatus>,
    /// Serialized form of the last successfully persisted `CvUpdate`.
    last_saved: String,
    pending: Option<Pending>,
    /// Whether the debounce timer is running. Not armed in SaveFailed:
    /// only a new edit or an explicit retry rearms it.
    armed: bool,
}

struct Pending {
    update: CvUpdate,
    serialized: String,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let cmd = if self.armed {
                tokio::select! {
                    cmd = self.rx.recv() => match cmd {
                        Some(cmd) => cmd,
                        None => break,
                    },
                    _ = tokio::time::sleep(self.debounce) => {
                        self.save_pending().await;
                        continue;
                    }
                }
            } else {
                match self.rx.recv().await {
                    Some(cmd) => cmd,
                    None => break,
                }
            };

            match cmd {
                Command::Changed(update) => self.note_change(*update),
                Command::Retry => {
                    if self.pending.is_some() && !self.armed {
                        self.armed = true;
                        self.set_status(SaveStatus::PendingSave);
                    }
                }
                Command::Flush(ack) => {
                    if self.pending.is_some() {
                        self.save_pending().await;
                    }
                    let _ = ack.send(());
                }
            }
        }

        // Channel closed: best-effort final flush before the task ends.
        if self.pending.is_some() {
            self.save_pending().await;
        }
    }

    fn note_change(&mut self, update: CvUpdate) {
        let serialized = match serde_json::to_string(&update) {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not serialize snapshot for CV {}: {e}", self.cv_id);
                return;
            }
        };
        if serialized == self.last_saved {
            // The edit reverted to the persisted state; nothing to save.
            self.pending = None;
            self.armed = false;
            self.set_status(SaveStatus::Idle);
        } else {
            self.pending = Some(Pending { update, serialized });
            self.armed = true;
            self.set_status(SaveStatus::PendingSave);
        }
    }

    async fn save_pending(&mut self) {
        self.armed = false;
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.set_status(SaveStatus::Saving);
        match self.target.save(&self.cv_id, &pending.update).await {
            Ok(_) => {
                debug!("Autosaved CV {}", self.cv_id);
                // The snapshot that was *sent* is now persisted; anything
                // queued during the request re-arms the timer next loop.
                self.last_saved = pending.serialized;
                self.set_status(SaveStatus::Idle);
            }
            Err(e) => {
                warn!("Autosave failed for CV {}: {e}", self.cv_id);
                self.pending = Some(pending);
                self.set_status(SaveStatus::SaveFailed);
            }
        }
    }

    fn set_status(&self, status: SaveStatus) {
        let _ = self.status_tx.send(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::store;
    use crate::models::cv::SectionKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTarget {
        saved: Mutex<Vec<CvUpdate>>,
        attempts: AtomicUsize,
        fail_next: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RecordingTarget {
        fn failing(times: usize) -> Self {
            RecordingTarget {
                fail_next: AtomicUsize::new(times),
                ..Default::default()
            }
        }

        fn slow(delay: Duration) -> Self {
            RecordingTarget {
                delay: Some(delay),
                ..Default::default()
            }
        }

        fn saved(&self) -> Vec<CvUpdate> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SaveTarget for RecordingTarget {
        async fn save(&self, cv_id: &str, update: &CvUpdate) -> Result<CvDocument, EditorError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let remaining = self.fail_next.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_next.store(remaining - 1, Ordering::SeqCst);
                return Err(EditorError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.saved.lock().unwrap().push(update.clone());
            let mut doc = CvDocument::new(cv_id, "user_1", &update.title);
            doc.data = update.data.clone();
            doc.settings = update.settings.clone();
            Ok(doc)
        }
    }

    fn doc() -> CvDocument {
        CvDocument::new("cv_test01", "user_1", "Test CV")
    }

    // Lets the worker drain its command queue without advancing the clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_rapid_edits_into_one_save() {
        let target = Arc::new(RecordingTarget::default());
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let d1 = store::set_path(&baseline, "data.summary", json!("a")).unwrap();
        scheduler.document_changed(&d1);
        settle().await;
        tokio::time::advance(Duration::from_millis(200)).await;

        let d2 = store::set_path(&d1, "data.summary", json!("ab")).unwrap();
        scheduler.document_changed(&d2);
        settle().await;
        tokio::time::advance(Duration::from_millis(200)).await;

        let d3 = store::set_path(&d2, "data.summary", json!("abc")).unwrap();
        scheduler.document_changed(&d3);
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::PendingSave);

        // 1499ms after the last edit: still inside the quiet period.
        tokio::time::advance(Duration::from_millis(1499)).await;
        settle().await;
        assert_eq!(target.attempts.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        let saved = target.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data.summary, "abc");
        assert_eq!(scheduler.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_edit_stays_idle() {
        let target = Arc::new(RecordingTarget::default());
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let edited = store::set_path(&baseline, "title", json!("Renamed")).unwrap();
        scheduler.document_changed(&edited);
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::PendingSave);

        // Revert before the window closes: back to Idle, nothing saved.
        let reverted = store::set_path(&edited, "title", json!("Test CV")).unwrap();
        scheduler.document_changed(&reverted);
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::Idle);

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(target.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_retains_snapshot_and_next_edit_retriggers() {
        let target = Arc::new(RecordingTarget::failing(1));
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let d1 = store::set_path(&baseline, "data.summary", json!("draft")).unwrap();
        scheduler.document_changed(&d1);
        settle().await;
        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::SaveFailed);
        assert_eq!(target.attempts.load(Ordering::SeqCst), 1);
        assert!(target.saved().is_empty());

        // Not stuck in Saving: the window stays closed until a new edit.
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(target.attempts.load(Ordering::SeqCst), 1);

        let d2 = store::set_path(&d1, "data.summary", json!("draft 2")).unwrap();
        scheduler.document_changed(&d2);
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::PendingSave);

        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        let saved = target.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].data.summary, "draft 2");
        assert_eq!(scheduler.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_retry_rearms_timer_after_failure() {
        let target = Arc::new(RecordingTarget::failing(1));
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let d1 = store::set_path(&baseline, "data.summary", json!("draft")).unwrap();
        scheduler.document_changed(&d1);
        settle().await;
        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::SaveFailed);

        scheduler.retry();
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::PendingSave);

        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        assert_eq!(target.saved().len(), 1);
        assert_eq!(scheduler.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_inflight_save_coalesces_into_next_window() {
        let target = Arc::new(RecordingTarget::slow(Duration::from_secs(1)));
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let d1 = store::set_path(&baseline, "data.summary", json!("first")).unwrap();
        scheduler.document_changed(&d1);
        settle().await;
        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        assert_eq!(scheduler.status(), SaveStatus::Saving);

        // Edit while the first request is in flight.
        let d2 = store::set_path(&d1, "data.summary", json!("second")).unwrap();
        scheduler.document_changed(&d2);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        // First save landed with the first snapshot; second is pending.
        assert_eq!(target.saved().len(), 1);
        assert_eq!(target.saved()[0].data.summary, "first");
        assert_eq!(scheduler.status(), SaveStatus::PendingSave);

        tokio::time::advance(DEFAULT_DEBOUNCE).await;
        settle().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        let saved = target.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].data.summary, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_skips_debounce() {
        let target = Arc::new(RecordingTarget::default());
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let d1 = store::set_path(&baseline, "title", json!("Renamed")).unwrap();
        scheduler.document_changed(&d1);
        scheduler.flush().await;

        let saved = target.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Renamed");
        assert_eq!(scheduler.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_save() {
        let target = Arc::new(RecordingTarget::default());
        let baseline = doc();
        let scheduler =
            AutosaveScheduler::spawn(target.clone(), &baseline, DEFAULT_DEBOUNCE).unwrap();

        let (d1, _) = store::add_item(&baseline, SectionKind::Skills);
        scheduler.document_changed(&d1);
        scheduler.shutdown().await;

        assert_eq!(target.saved().len(), 1);
        assert_eq!(target.saved()[0].data.skills.len(), 1);
    }
}
