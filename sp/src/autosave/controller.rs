//! Autosave controller implementation
//!
//! State machine: `idle -> saving -> saved -> idle` on the happy path, with
//! `offline` and `error` as alternate branches reachable from `saving`.
//! While a save is in flight further edits are permitted; they start a new
//! debounce cycle, so persisted state is eventually consistent with memory,
//! not per-edit consistent.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::AutosaveConfig;

/// Fixed key under which the pending payload is durably stored
pub const PENDING_KEY: &str = "planner_pending_changes";

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Offline,
    Error,
}

impl std::fmt::Display for AutosaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Offline => write!(f, "offline"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Error signaled by the injected save function
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("save failed: {0}")]
    Failed(String),
}

/// The externally supplied asynchronous save function
///
/// Opaque to the controller: could be a network call or a local write. The
/// controller only needs the success/failure signal.
#[async_trait]
pub trait SaveSink: Send + Sync {
    async fn save(&self, payload: &str) -> Result<(), SinkError>;
}

/// Durable storage for the not-yet-confirmed payload
///
/// Survives process restarts for crash recovery. Synchronous by contract;
/// implementations write small payloads to local storage.
pub trait PendingStore: Send + Sync {
    fn load(&self) -> eyre::Result<Option<String>>;
    fn store(&self, payload: &str) -> eyre::Result<()>;
    fn clear(&self) -> eyre::Result<()>;
}

/// Events fed to the controller task
enum AutosaveEvent {
    /// The watched plan state changed; payload is its serialization
    Changed(String),
    /// Connectivity became available (true) or was lost (false)
    Connectivity(bool),
    /// Bypass the debounce timer and save now
    ForceSave { reply: oneshot::Sender<AutosaveStatus> },
    /// Stop the controller task
    Shutdown,
}

/// Handle to send events to the controller
#[derive(Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<AutosaveEvent>,
    status_rx: watch::Receiver<AutosaveStatus>,
}

impl AutosaveHandle {
    /// Observe a plan state change; restarts the debounce window
    pub fn notify_change(&self, payload: String) {
        debug!(len = payload.len(), "AutosaveHandle::notify_change: called");
        let _ = self.tx.send(AutosaveEvent::Changed(payload));
    }

    /// Report a connectivity transition
    pub fn set_online(&self, online: bool) {
        debug!(online, "AutosaveHandle::set_online: called");
        let _ = self.tx.send(AutosaveEvent::Connectivity(online));
    }

    /// Bypass the debounce timer and save immediately
    ///
    /// Resolves with the status after the attempt (saved, offline, or
    /// error). Used by "Save Plan" actions.
    pub async fn force_save(&self) -> AutosaveStatus {
        debug!("AutosaveHandle::force_save: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(AutosaveEvent::ForceSave { reply: reply_tx }).is_err() {
            return AutosaveStatus::Error;
        }
        reply_rx.await.unwrap_or(AutosaveStatus::Error)
    }

    /// Stop the controller task
    pub fn shutdown(&self) {
        debug!("AutosaveHandle::shutdown: called");
        let _ = self.tx.send(AutosaveEvent::Shutdown);
    }

    /// Current status
    pub fn status(&self) -> AutosaveStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status transitions
    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status_rx.clone()
    }
}

/// The controller task owning debounce state and the last-saved marker
pub struct AutosaveController {
    config: AutosaveConfig,
    sink: Arc<dyn SaveSink>,
    pending: Arc<dyn PendingStore>,
    status_tx: watch::Sender<AutosaveStatus>,
    online: bool,
    /// Most recently observed in-memory state; authoritative for retries
    latest: Option<String>,
    /// Serialization of the last successfully saved payload
    last_saved: Option<String>,
}

impl AutosaveController {
    /// Spawn the controller task and return a handle to it
    ///
    /// A pending payload left behind by a crashed or offline session is
    /// recovered from the durable store and queued for immediate
    /// resubmission.
    pub fn spawn(config: AutosaveConfig, sink: Arc<dyn SaveSink>, pending: Arc<dyn PendingStore>) -> AutosaveHandle {
        debug!(debounce_ms = config.debounce_ms, "AutosaveController::spawn: called");
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::Idle);

        let recovered = match pending.load() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to read pending payload, skipping recovery");
                None
            }
        };
        let has_recovered = recovered.is_some();
        if has_recovered {
            debug!("AutosaveController::spawn: recovered pending payload");
        }

        let controller = Self {
            config,
            sink,
            pending,
            status_tx,
            online: true,
            latest: recovered,
            last_saved: None,
        };

        tokio::spawn(controller.run(rx, has_recovered));

        AutosaveHandle { tx, status_rx }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<AutosaveEvent>, resubmit_now: bool) {
        debug!("AutosaveController actor started");
        let mut deadline: Option<Instant> = resubmit_now.then(Instant::now);
        let mut decay: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = sleep_until_opt(deadline), if deadline.is_some() => {
                    debug!("AutosaveController::run: debounce elapsed");
                    deadline = None;
                    self.attempt_save(&mut decay).await;
                }

                _ = sleep_until_opt(decay), if decay.is_some() => {
                    decay = None;
                    if *self.status_tx.borrow() == AutosaveStatus::Saved {
                        debug!("AutosaveController::run: saved display window elapsed");
                        self.set_status(AutosaveStatus::Idle);
                    }
                }

                event = rx.recv() => match event {
                    None | Some(AutosaveEvent::Shutdown) => {
                        debug!("AutosaveController::run: shutdown");
                        break;
                    }

                    Some(AutosaveEvent::Changed(payload)) => {
                        debug!("AutosaveController::run: change observed, restarting debounce");
                        self.latest = Some(payload);
                        deadline = Some(Instant::now() + self.config.debounce());
                    }

                    Some(AutosaveEvent::Connectivity(true)) => {
                        debug!("AutosaveController::run: connectivity restored");
                        self.online = true;
                        if self.latest.is_some() || self.has_pending() {
                            // Resubmit immediately; latest in-memory state
                            // supersedes the queued payload (last-write-wins)
                            deadline = None;
                            self.attempt_save(&mut decay).await;
                        } else if *self.status_tx.borrow() == AutosaveStatus::Offline {
                            self.set_status(AutosaveStatus::Idle);
                        }
                    }

                    Some(AutosaveEvent::Connectivity(false)) => {
                        debug!("AutosaveController::run: connectivity lost");
                        self.online = false;
                        self.set_status(AutosaveStatus::Offline);
                    }

                    Some(AutosaveEvent::ForceSave { reply }) => {
                        debug!("AutosaveController::run: force save");
                        deadline = None;
                        self.attempt_save(&mut decay).await;
                        let _ = reply.send(*self.status_tx.borrow());
                    }
                }
            }
        }

        debug!("AutosaveController actor stopped");
    }

    async fn attempt_save(&mut self, decay: &mut Option<Instant>) {
        let Some(payload) = self.latest.clone().or_else(|| self.pending.load().ok().flatten()) else {
            debug!("attempt_save: nothing to save");
            return;
        };

        // Unchanged payload short-circuits to a no-op
        if self.last_saved.as_deref() == Some(payload.as_str()) {
            debug!("attempt_save: payload unchanged, skipping");
            return;
        }

        if !self.online {
            debug!("attempt_save: offline, queueing durably");
            if let Err(e) = self.pending.store(&payload) {
                warn!(error = %e, "Failed to store pending payload");
            }
            self.set_status(AutosaveStatus::Offline);
            return;
        }

        self.set_status(AutosaveStatus::Saving);
        match self.sink.save(&payload).await {
            Ok(()) => {
                debug!("attempt_save: save succeeded");
                self.last_saved = Some(payload);
                if let Err(e) = self.pending.clear() {
                    warn!(error = %e, "Failed to clear pending payload");
                }
                self.set_status(AutosaveStatus::Saved);
                *decay = Some(Instant::now() + self.config.saved_display());
            }
            Err(e) => {
                // Retained for retry on the next debounce cycle or
                // reconnect; no automatic retry timer
                warn!(error = %e, "Autosave failed");
                if let Err(e2) = self.pending.store(&payload) {
                    warn!(error = %e2, "Failed to retain payload after save failure");
                }
                self.set_status(AutosaveStatus::Error);
            }
        }
    }

    fn has_pending(&self) -> bool {
        matches!(self.pending.load(), Ok(Some(_)))
    }

    fn set_status(&self, status: AutosaveStatus) {
        if *self.status_tx.borrow() != status {
            debug!(%status, "AutosaveController: status transition");
            let _ = self.status_tx.send(status);
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Sink that records every payload it is asked to save
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SaveSink for RecordingSink {
        async fn save(&self, payload: &str) -> Result<(), SinkError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SinkError::Failed("simulated".to_string()));
            }
            self.calls.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    /// In-memory pending store
    struct MemPending {
        slot: Mutex<Option<String>>,
    }

    impl MemPending {
        fn new() -> Arc<Self> {
            Arc::new(Self { slot: Mutex::new(None) })
        }

        fn with_payload(payload: &str) -> Arc<Self> {
            Arc::new(Self {
                slot: Mutex::new(Some(payload.to_string())),
            })
        }

        fn current(&self) -> Option<String> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl PendingStore for MemPending {
        fn load(&self) -> eyre::Result<Option<String>> {
            Ok(self.slot.lock().unwrap().clone())
        }

        fn store(&self, payload: &str) -> eyre::Result<()> {
            *self.slot.lock().unwrap() = Some(payload.to_string());
            Ok(())
        }

        fn clear(&self) -> eyre::Result<()> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    fn fast_config() -> AutosaveConfig {
        AutosaveConfig {
            debounce_ms: 50,
            saved_display_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_debounce_collapses_rapid_edits() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending);

        // Two edits inside one debounce window
        handle.notify_change("state-1".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.notify_change("state-2".to_string());

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Exactly one save, carrying the final state
        assert_eq!(sink.calls(), vec!["state-2".to_string()]);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_separate_edits_save_separately() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending);

        handle.notify_change("state-1".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.notify_change("state-2".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(sink.calls(), vec!["state-1".to_string(), "state-2".to_string()]);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_unchanged_payload_skips_save() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending);

        handle.notify_change("same".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        // Same payload again: short-circuits, no second sink call
        handle.notify_change("same".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(sink.calls().len(), 1);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_offline_queues_then_reconnect_resubmits_once() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending.clone());

        handle.set_online(false);
        handle.notify_change("offline-edit".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        // No sink call; pending payload equals the attempted payload
        assert!(sink.calls().is_empty());
        assert_eq!(pending.current().as_deref(), Some("offline-edit"));
        assert_eq!(handle.status(), AutosaveStatus::Offline);

        handle.set_online(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Exactly one save fires carrying that payload, and the durable
        // record is cleared
        assert_eq!(sink.calls(), vec!["offline-edit".to_string()]);
        assert!(pending.current().is_none());
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_reconnect_uses_newest_state_last_write_wins() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending.clone());

        handle.set_online(false);
        handle.notify_change("older".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(pending.current().as_deref(), Some("older"));

        // A newer edit lands while still offline
        handle.notify_change("newer".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        handle.set_online(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The newest in-memory state supersedes the queued one
        assert_eq!(sink.calls(), vec!["newer".to_string()]);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_save_failure_retains_payload_and_reports_error() {
        let sink = RecordingSink::new();
        sink.fail.store(true, Ordering::SeqCst);
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending.clone());

        handle.notify_change("doomed".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(handle.status(), AutosaveStatus::Error);
        assert_eq!(pending.current().as_deref(), Some("doomed"));

        // Next debounce cycle retries and succeeds
        sink.fail.store(false, Ordering::SeqCst);
        handle.notify_change("doomed v2".to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(sink.calls(), vec!["doomed v2".to_string()]);
        assert!(pending.current().is_none());
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_force_save_bypasses_debounce() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let config = AutosaveConfig {
            debounce_ms: 60_000, // would never fire in this test
            saved_display_ms: 50,
        };
        let handle = AutosaveController::spawn(config, sink.clone(), pending);

        handle.notify_change("now".to_string());
        let status = handle.force_save().await;

        assert_eq!(status, AutosaveStatus::Saved);
        assert_eq!(sink.calls(), vec!["now".to_string()]);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_saved_decays_to_idle() {
        let sink = RecordingSink::new();
        let pending = MemPending::new();
        let handle = AutosaveController::spawn(fast_config(), sink, pending);

        handle.notify_change("x".to_string());
        let status = handle.force_save().await;
        assert_eq!(status, AutosaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(handle.status(), AutosaveStatus::Idle);
        handle.shutdown();
    }

    #[tokio::test]
    async fn test_startup_recovers_pending_payload() {
        let sink = RecordingSink::new();
        let pending = MemPending::with_payload("left-behind");
        let handle = AutosaveController::spawn(fast_config(), sink.clone(), pending.clone());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(sink.calls(), vec!["left-behind".to_string()]);
        assert!(pending.current().is_none());
        handle.shutdown();
    }
}
