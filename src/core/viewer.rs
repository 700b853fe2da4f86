//! Viewer state machine and background document loading
//!
//! `ViewerController` is the single owner of the viewer's state. UI panels
//! read it through accessors and request changes through app actions; the
//! per-frame `tick` drives delayed dispatch, outcome delivery, and the
//! load timeout.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::document::{Document, DocumentError};

/// Delay before a requested load is dispatched, so the spinner is visible
pub const SPINNER_DELAY: Duration = Duration::from_millis(300);
/// Bound on how long a dispatched load may stay unresolved
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(2);

/// Title shown when no document is selected
pub const DEFAULT_TITLE: &str = "Document Library";

/// User-facing message for a failed document load
pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load the document. Please check if the file exists.";
/// User-facing message for a load that hit the timeout
pub const LOAD_TIMEOUT_MESSAGE: &str = "The document took too long to load. Please try again.";

/// Which of the mutually exclusive viewer surfaces is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Welcome,
    Loading,
    Showing,
    Error,
}

/// Timing and fallback policy for loads
#[derive(Debug, Clone)]
pub struct LoadPolicy {
    pub spinner_delay: Duration,
    pub load_timeout: Duration,
    /// Preserve the legacy behavior of forcing the viewer visible when a
    /// load neither succeeds nor fails in time. Off by default; the
    /// timeout is surfaced as an error instead.
    pub force_show_on_timeout: bool,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            spinner_delay: SPINNER_DELAY,
            load_timeout: LOAD_TIMEOUT,
            force_show_on_timeout: false,
        }
    }
}

/// Observable result of a tick, consumed by the app layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    Loaded,
    /// Carries the user-facing message for the error notifier
    LoadFailed(String),
    /// The flagged fallback fired and the viewer was force-shown
    ForcedShow,
}

struct PendingLoad {
    generation: u64,
    path: PathBuf,
    requested_at: Instant,
    dispatched_at: Option<Instant>,
}

struct LoadOutcome {
    generation: u64,
    result: Result<Document, DocumentError>,
}

/// Owner of the viewer state machine
pub struct ViewerController {
    state: ViewerState,
    title: String,
    active: Option<PathBuf>,
    document: Option<Document>,
    error: Option<String>,
    /// Bumped on every `open`/`go_home`; outcomes from older generations
    /// are discarded on receipt.
    generation: u64,
    pending: Option<PendingLoad>,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
    policy: LoadPolicy,
}

impl ViewerController {
    pub fn new(policy: LoadPolicy) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: ViewerState::Welcome,
            title: DEFAULT_TITLE.to_string(),
            active: None,
            document: None,
            error: None,
            generation: 0,
            pending: None,
            tx,
            rx,
            policy,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Path of the entry currently selected in the sidebar, if any
    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Message shown in the viewer area while in the error state
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a load is requested or in flight
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin loading a document: enter the loading state immediately and
    /// schedule the dispatch after the spinner delay.
    pub fn open(&mut self, path: PathBuf, title: &str, now: Instant) {
        self.generation += 1;
        self.state = ViewerState::Loading;
        self.title = title.trim().to_string();
        self.active = Some(path.clone());
        self.document = None;
        self.error = None;
        self.pending = Some(PendingLoad {
            generation: self.generation,
            path,
            requested_at: now,
            dispatched_at: None,
        });
    }

    /// Return to the welcome state, dropping the document and invalidating
    /// any in-flight load.
    pub fn go_home(&mut self) {
        self.generation += 1;
        self.state = ViewerState::Welcome;
        self.title = DEFAULT_TITLE.to_string();
        self.active = None;
        self.document = None;
        self.error = None;
        self.pending = None;
    }

    /// Per-frame hook: dispatch due loads, drain outcomes, enforce the
    /// timeout policy. Returns the events produced this tick.
    pub fn tick(&mut self, now: Instant) -> Vec<ViewerEvent> {
        let mut events = Vec::new();

        if let Some(pending) = self.pending.as_mut() {
            if pending.dispatched_at.is_none()
                && now.duration_since(pending.requested_at) >= self.policy.spinner_delay
            {
                pending.dispatched_at = Some(now);
                let tx = self.tx.clone();
                let generation = pending.generation;
                let path = pending.path.clone();
                thread::spawn(move || {
                    let result = Document::open(&path);
                    let _ = tx.send(LoadOutcome { generation, result });
                });
            }
        }

        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(event) = self.apply_outcome(outcome) {
                events.push(event);
            }
        }

        if self.state == ViewerState::Loading {
            if let Some(dispatched_at) = self.pending.as_ref().and_then(|p| p.dispatched_at) {
                if now.duration_since(dispatched_at) >= self.policy.load_timeout {
                    self.pending = None;
                    if self.policy.force_show_on_timeout {
                        tracing::warn!("load timed out, forcing the viewer visible");
                        self.state = ViewerState::Showing;
                        events.push(ViewerEvent::ForcedShow);
                    } else {
                        self.state = ViewerState::Error;
                        self.error = Some(LOAD_TIMEOUT_MESSAGE.to_string());
                        events.push(ViewerEvent::LoadFailed(LOAD_TIMEOUT_MESSAGE.to_string()));
                    }
                }
            }
        }

        events
    }

    /// Apply one load outcome. Outcomes stamped with a superseded
    /// generation are discarded without effect.
    fn apply_outcome(&mut self, outcome: LoadOutcome) -> Option<ViewerEvent> {
        if outcome.generation != self.generation {
            tracing::debug!("discarding load outcome from superseded generation");
            return None;
        }
        self.pending = None;
        match outcome.result {
            Ok(document) => {
                self.state = ViewerState::Showing;
                self.document = Some(document);
                self.error = None;
                Some(ViewerEvent::Loaded)
            }
            Err(err) => {
                tracing::error!("Failed to load document: {}", err);
                self.state = ViewerState::Error;
                self.document = None;
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
                Some(ViewerEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn immediate_policy() -> LoadPolicy {
        LoadPolicy {
            spinner_delay: Duration::ZERO,
            load_timeout: Duration::from_secs(5),
            force_show_on_timeout: false,
        }
    }

    fn stub_document(path: &Path) -> Document {
        Document {
            path: path.to_path_buf(),
            content: "# Stub\n".to_string(),
            title: None,
            outline: Vec::new(),
            line_count: 1,
        }
    }

    fn tick_until(
        controller: &mut ViewerController,
        target: ViewerState,
    ) -> Vec<ViewerEvent> {
        let mut events = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            events.extend(controller.tick(Instant::now()));
            if controller.state() == target {
                return events;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("controller never reached {:?}", target);
    }

    #[test]
    fn test_initial_state() {
        let controller = ViewerController::new(LoadPolicy::default());
        assert_eq!(controller.state(), ViewerState::Welcome);
        assert_eq!(controller.title(), DEFAULT_TITLE);
        assert!(controller.active().is_none());
        assert!(controller.document().is_none());
    }

    #[test]
    fn test_open_enters_loading_immediately() {
        let mut controller = ViewerController::new(LoadPolicy::default());
        controller.open(PathBuf::from("essays/a.md"), "  An Essay  ", Instant::now());

        assert_eq!(controller.state(), ViewerState::Loading);
        assert_eq!(controller.title(), "An Essay");
        assert_eq!(controller.active(), Some(Path::new("essays/a.md")));
        assert!(controller.is_busy());
    }

    #[test]
    fn test_successful_load_reaches_showing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Hello\n\nBody text.\n").unwrap();

        let mut controller = ViewerController::new(immediate_policy());
        controller.open(path.clone(), "Doc", Instant::now());

        let events = tick_until(&mut controller, ViewerState::Showing);
        assert!(events.contains(&ViewerEvent::Loaded));
        assert_eq!(controller.document().unwrap().path, path);
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_failed_load_reaches_error_with_fixed_message() {
        let mut controller = ViewerController::new(immediate_policy());
        controller.open(PathBuf::from("/nonexistent/gone.md"), "Gone", Instant::now());

        let events = tick_until(&mut controller, ViewerState::Error);
        assert!(events.contains(&ViewerEvent::LoadFailed(LOAD_FAILED_MESSAGE.to_string())));
        assert_eq!(controller.error_message(), Some(LOAD_FAILED_MESSAGE));
        assert!(controller.document().is_none());
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        // A completion belonging to an earlier navigation must not
        // affect the newer one.
        let mut controller = ViewerController::new(LoadPolicy::default());
        let now = Instant::now();
        controller.open(PathBuf::from("a.md"), "A", now);
        let stale_generation = controller.generation;
        controller.open(PathBuf::from("b.md"), "B", now);

        let event = controller.apply_outcome(LoadOutcome {
            generation: stale_generation,
            result: Ok(stub_document(Path::new("a.md"))),
        });

        assert!(event.is_none());
        assert_eq!(controller.state(), ViewerState::Loading);
        assert_eq!(controller.title(), "B");
        assert!(controller.document().is_none());
    }

    #[test]
    fn test_new_open_replaces_pending_timeout() {
        // A second navigation replaces the first pending load outright, so
        // the first load's timeout deadline can never fire afterwards.
        let mut controller = ViewerController::new(LoadPolicy::default());
        let now = Instant::now();
        controller.open(PathBuf::from("a.md"), "A", now);
        controller.pending.as_mut().unwrap().dispatched_at =
            Some(now - Duration::from_secs(60));
        controller.open(PathBuf::from("b.md"), "B", now);

        let events = controller.tick(now);
        assert!(events.is_empty());
        assert_eq!(controller.state(), ViewerState::Loading);
    }

    #[test]
    fn test_timeout_surfaces_error_by_default() {
        let mut controller = ViewerController::new(LoadPolicy::default());
        let now = Instant::now();
        controller.open(PathBuf::from("slow.md"), "Slow", now);
        controller.pending.as_mut().unwrap().dispatched_at =
            Some(now - LOAD_TIMEOUT - Duration::from_millis(1));

        let events = controller.tick(now);
        assert_eq!(controller.state(), ViewerState::Error);
        assert!(events.contains(&ViewerEvent::LoadFailed(LOAD_TIMEOUT_MESSAGE.to_string())));
    }

    #[test]
    fn test_timeout_forces_showing_when_policy_set() {
        let mut controller = ViewerController::new(LoadPolicy {
            force_show_on_timeout: true,
            ..LoadPolicy::default()
        });
        let now = Instant::now();
        controller.open(PathBuf::from("slow.md"), "Slow", now);
        controller.pending.as_mut().unwrap().dispatched_at =
            Some(now - LOAD_TIMEOUT - Duration::from_millis(1));

        let events = controller.tick(now);
        assert_eq!(controller.state(), ViewerState::Showing);
        assert!(events.contains(&ViewerEvent::ForcedShow));
    }

    #[test]
    fn test_go_home_restores_welcome() {
        let mut controller = ViewerController::new(LoadPolicy::default());
        let now = Instant::now();
        controller.open(PathBuf::from("a.md"), "A", now);
        let generation = controller.generation;
        controller.apply_outcome(LoadOutcome {
            generation,
            result: Ok(stub_document(Path::new("a.md"))),
        });
        assert_eq!(controller.state(), ViewerState::Showing);

        controller.go_home();
        assert_eq!(controller.state(), ViewerState::Welcome);
        assert_eq!(controller.title(), DEFAULT_TITLE);
        assert!(controller.active().is_none());
        assert!(controller.document().is_none());
        assert!(!controller.is_busy());

        // an outcome from before go_home is invalidated
        let event = controller.apply_outcome(LoadOutcome {
            generation,
            result: Ok(stub_document(Path::new("a.md"))),
        });
        assert!(event.is_none());
        assert_eq!(controller.state(), ViewerState::Welcome);
    }

    #[test]
    fn test_spinner_delay_defers_dispatch() {
        let mut controller = ViewerController::new(LoadPolicy::default());
        let now = Instant::now();
        controller.open(PathBuf::from("a.md"), "A", now);

        controller.tick(now);
        assert!(controller.pending.as_ref().unwrap().dispatched_at.is_none());

        controller.tick(now + SPINNER_DELAY);
        assert!(controller.pending.as_ref().unwrap().dispatched_at.is_some());
    }
}
