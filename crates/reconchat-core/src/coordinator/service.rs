//! RequestCoordinator -- the request lifecycle around the session store.
//!
//! Each user-triggered operation owns one busy flag. A second invocation
//! in the same category while the flag is raised is rejected, not queued;
//! operations in different categories run side by side.
//!
//! Failures never propagate: they are logged, recorded as the last error,
//! announced on the event bus, and reported back as [`Dispatch::Failed`].

use std::sync::Mutex;

use reconchat_types::event::{ClientEvent, OperationOutcome};
use reconchat_types::message::Message;
use reconchat_types::operation::{Dispatch, Operation, OperationFailure, OperationState};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::{ArtifactSink, ChatBackend};
use crate::event::EventBus;
use crate::session::SessionStore;

use super::busy::{BusyFlag, BusyGuard};

/// Filename used for reports unless overridden.
pub const DEFAULT_REPORT_FILENAME: &str = "report.pdf";

/// Orchestrates send, report and clear against a [`ChatBackend`].
///
/// Methods take `&self`; wrap the coordinator in an `Arc` to drive
/// operations from spawned tasks.
pub struct RequestCoordinator<B, S> {
    backend: B,
    sink: S,
    session: SessionStore,
    events: EventBus,
    report_filename: String,
    sending: BusyFlag,
    report_generating: BusyFlag,
    clearing: BusyFlag,
    last_error: Mutex<Option<OperationFailure>>,
}

impl<B: ChatBackend, S: ArtifactSink> RequestCoordinator<B, S> {
    /// Create a coordinator with an empty session.
    ///
    /// The session store publishes onto the same bus as the coordinator.
    pub fn new(backend: B, sink: S, events: EventBus) -> Self {
        Self {
            backend,
            sink,
            session: SessionStore::new(events.clone()),
            events,
            report_filename: DEFAULT_REPORT_FILENAME.to_string(),
            sending: BusyFlag::new(),
            report_generating: BusyFlag::new(),
            clearing: BusyFlag::new(),
            last_error: Mutex::new(None),
        }
    }

    /// Override the fixed filename suggested for reports.
    pub fn with_report_filename(mut self, filename: impl Into<String>) -> Self {
        self.report_filename = filename.into();
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the busy flags and the last recorded failure.
    pub fn state(&self) -> OperationState {
        OperationState {
            sending: self.sending.is_set(),
            report_generating: self.report_generating.is_set(),
            clearing: self.clearing.is_set(),
            last_error: self.last_error.lock().expect("last_error lock poisoned").clone(),
        }
    }

    /// Populate the session from backend history.
    ///
    /// Runs once at startup and is not gated. On failure the session is
    /// left as it was.
    pub async fn load_history(&self) -> Dispatch {
        let operation = Operation::FetchHistory;
        self.events.publish(ClientEvent::OperationStarted { operation });
        debug!(%operation, "issuing request");

        let outcome = match self.backend.fetch_history().await {
            Ok(messages) => {
                self.session.load(messages);
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        };
        self.settle(operation, outcome)
    }

    /// Send a user message.
    ///
    /// Whitespace-only input is ignored without touching any state. The
    /// user message is appended before the request is issued and stays in
    /// the session whatever the outcome.
    pub async fn send_message(&self, text: &str) -> Dispatch {
        let text = text.trim();
        if text.is_empty() {
            return Dispatch::Skipped;
        }
        let Some(guard) = self.begin(&self.sending, Operation::SendMessage) else {
            return Dispatch::Busy;
        };

        self.session.append(Message::user(text));
        let outcome = match self.backend.send_message(text).await {
            Ok(reply) => {
                self.session.append(Message::assistant(reply));
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        };

        drop(guard);
        self.settle(Operation::SendMessage, outcome)
    }

    /// Generate the session report and hand it to the artifact sink.
    ///
    /// Nothing is saved when the backend call fails.
    pub async fn generate_report(&self) -> Dispatch {
        let Some(guard) = self.begin(&self.report_generating, Operation::GenerateReport) else {
            return Dispatch::Busy;
        };

        let outcome = match self.backend.generate_report().await {
            Ok(artifact) => {
                debug!(bytes = artifact.len(), content_type = %artifact.content_type, "report received");
                match self.sink.save(&artifact, &self.report_filename).await {
                    Ok(path) => {
                        info!(path = %path.display(), "report saved");
                        self.events.publish(ClientEvent::ArtifactSaved { path });
                        Ok(())
                    }
                    Err(err) => Err(err.to_string()),
                }
            }
            Err(err) => Err(err.to_string()),
        };

        drop(guard);
        self.settle(Operation::GenerateReport, outcome)
    }

    /// Clear history on the backend, then locally.
    ///
    /// The local session is only cleared once the backend confirms.
    pub async fn clear_history(&self) -> Dispatch {
        let Some(guard) = self.begin(&self.clearing, Operation::ClearHistory) else {
            return Dispatch::Busy;
        };

        let outcome = match self.backend.clear_history().await {
            Ok(()) => {
                self.session.clear();
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        };

        drop(guard);
        self.settle(Operation::ClearHistory, outcome)
    }

    /// Raise `flag` for `operation`, or report that the category is busy.
    fn begin<'a>(&self, flag: &'a BusyFlag, operation: Operation) -> Option<BusyGuard<'a>> {
        match flag.try_acquire() {
            Some(guard) => {
                debug!(%operation, "issuing request");
                self.events.publish(ClientEvent::OperationStarted { operation });
                Some(guard)
            }
            None => {
                debug!(%operation, "request already in flight, ignoring");
                None
            }
        }
    }

    /// Log, record and announce how an issued operation ended.
    fn settle(&self, operation: Operation, outcome: Result<(), String>) -> Dispatch {
        match outcome {
            Ok(()) => {
                info!(%operation, "operation completed");
                self.events.publish(ClientEvent::OperationFinished {
                    operation,
                    outcome: OperationOutcome::Succeeded,
                });
                Dispatch::Completed
            }
            Err(error) => {
                warn!(%operation, %error, "operation failed");
                *self.last_error.lock().expect("last_error lock poisoned") = Some(OperationFailure {
                    operation,
                    message: error.clone(),
                });
                self.events.publish(ClientEvent::OperationFinished {
                    operation,
                    outcome: OperationOutcome::Failed { error },
                });
                Dispatch::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reconchat_types::artifact::Artifact;
    use reconchat_types::error::{DownloadError, TransportError};
    use reconchat_types::message::MessageRole;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockBackend {
        history: Option<Vec<Message>>,
        reply: Option<String>,
        report: Option<Vec<u8>>,
        clear_ok: bool,
        /// When set, send, report and clear wait on this before answering.
        gate: Option<Arc<Notify>>,
        fetch_calls: AtomicUsize,
        send_calls: AtomicUsize,
        report_calls: AtomicUsize,
        clear_calls: AtomicUsize,
    }

    impl MockBackend {
        fn healthy() -> Self {
            Self {
                history: Some(vec![Message::user("earlier"), Message::assistant("answer")]),
                reply: Some("pong".to_string()),
                report: Some(b"%PDF-1.7 report".to_vec()),
                clear_ok: true,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        async fn wait_gate(&self) {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    impl ChatBackend for MockBackend {
        async fn fetch_history(&self) -> Result<Vec<Message>, TransportError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.history
                .clone()
                .ok_or_else(|| TransportError::with_status(Operation::FetchHistory, 500, "HTTP 500"))
        }

        async fn send_message(&self, _text: &str) -> Result<String, TransportError> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            self.wait_gate().await;
            self.reply
                .clone()
                .ok_or_else(|| TransportError::with_status(Operation::SendMessage, 503, "HTTP 503"))
        }

        async fn generate_report(&self) -> Result<Artifact, TransportError> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            self.wait_gate().await;
            self.report
                .clone()
                .map(Artifact::pdf)
                .ok_or_else(|| TransportError::new(Operation::GenerateReport, "connection reset"))
        }

        async fn clear_history(&self) -> Result<(), TransportError> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            self.wait_gate().await;
            if self.clear_ok {
                Ok(())
            } else {
                Err(TransportError::with_status(Operation::ClearHistory, 500, "HTTP 500"))
            }
        }
    }

    #[derive(Default)]
    struct MockSink {
        fail: bool,
        saved: Mutex<Vec<(String, usize)>>,
    }

    impl ArtifactSink for MockSink {
        async fn save(&self, artifact: &Artifact, filename: &str) -> Result<PathBuf, DownloadError> {
            if self.fail {
                return Err(DownloadError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.saved
                .lock()
                .unwrap()
                .push((filename.to_string(), artifact.len()));
            Ok(PathBuf::from("/downloads").join(filename))
        }
    }

    fn coordinator(backend: MockBackend) -> RequestCoordinator<MockBackend, MockSink> {
        RequestCoordinator::new(backend, MockSink::default(), EventBus::new(64))
    }

    #[tokio::test]
    async fn send_empty_or_whitespace_is_a_no_op() {
        let coord = coordinator(MockBackend::healthy());
        let mut rx = coord.subscribe();

        assert_eq!(coord.send_message("").await, Dispatch::Skipped);
        assert_eq!(coord.send_message("   ").await, Dispatch::Skipped);
        assert_eq!(coord.send_message("\n\t").await, Dispatch::Skipped);

        assert_eq!(coord.backend.send_calls.load(Ordering::SeqCst), 0);
        assert!(coord.session().is_empty());
        assert_eq!(coord.state(), OperationState::default());
        assert!(rx.try_recv().is_err(), "no event should be published");
    }

    #[tokio::test]
    async fn send_success_appends_user_then_assistant() {
        let coord = coordinator(MockBackend::healthy());

        assert_eq!(coord.send_message("ping").await, Dispatch::Completed);

        assert_eq!(
            coord.session().messages(),
            vec![Message::user("ping"), Message::assistant("pong")]
        );
        assert!(!coord.state().sending);
    }

    #[tokio::test]
    async fn send_trims_input() {
        let coord = coordinator(MockBackend::healthy());
        coord.send_message("  ping \n").await;
        assert_eq!(coord.session().messages()[0].content, "ping");
    }

    #[tokio::test]
    async fn send_failure_keeps_optimistic_message() {
        let coord = coordinator(MockBackend::failing());

        assert_eq!(coord.send_message("ping").await, Dispatch::Failed);

        assert_eq!(coord.session().messages(), vec![Message::user("ping")]);
        let state = coord.state();
        assert!(!state.sending);
        let failure = state.last_error.unwrap();
        assert_eq!(failure.operation, Operation::SendMessage);
        assert!(failure.message.contains("503"));
    }

    #[tokio::test]
    async fn user_message_is_visible_before_reply_arrives() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate.clone()));

        let observer = async {
            tokio::task::yield_now().await;
            let snapshot = coord.session().messages();
            let sending = coord.state().sending;
            gate.notify_one();
            (snapshot, sending)
        };

        let (dispatch, (snapshot, sending)) = tokio::join!(coord.send_message("ping"), observer);

        assert_eq!(dispatch, Dispatch::Completed);
        assert_eq!(snapshot, vec![Message::user("ping")]);
        assert!(sending);
        assert_eq!(coord.session().len(), 2);
    }

    #[tokio::test]
    async fn report_while_generating_is_not_issued_twice() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate.clone()));

        let second = async {
            let busy_during = coord.state().report_generating;
            let dispatch = coord.generate_report().await;
            gate.notify_one();
            (busy_during, dispatch)
        };

        let (first, (busy_during, second)) = tokio::join!(coord.generate_report(), second);

        assert!(busy_during);
        assert_eq!(first, Dispatch::Completed);
        assert_eq!(second, Dispatch::Busy);
        assert_eq!(coord.backend.report_calls.load(Ordering::SeqCst), 1);
        assert!(!coord.state().report_generating);
    }

    #[tokio::test]
    async fn send_while_sending_is_not_issued_twice() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate.clone()));

        let second = async {
            let busy_during = coord.state().sending;
            let dispatch = coord.send_message("again").await;
            gate.notify_one();
            (busy_during, dispatch)
        };

        let (first, (busy_during, second)) = tokio::join!(coord.send_message("ping"), second);

        assert!(busy_during);
        assert_eq!(first, Dispatch::Completed);
        assert_eq!(second, Dispatch::Busy);
        assert_eq!(coord.backend.send_calls.load(Ordering::SeqCst), 1);
        // The rejected text never reached the session.
        assert_eq!(coord.session().len(), 2);
        assert_eq!(
            coord.session().messages(),
            vec![Message::user("ping"), Message::assistant("pong")]
        );
        assert!(!coord.state().sending);
    }

    #[tokio::test]
    async fn clear_while_clearing_is_not_issued_twice() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate.clone()));
        coord.load_history().await;
        assert_eq!(coord.session().len(), 2);

        let second = async {
            let busy_during = coord.state().clearing;
            let dispatch = coord.clear_history().await;
            gate.notify_one();
            (busy_during, dispatch)
        };

        let (first, (busy_during, second)) = tokio::join!(coord.clear_history(), second);

        assert!(busy_during);
        assert_eq!(first, Dispatch::Completed);
        assert_eq!(second, Dispatch::Busy);
        assert_eq!(coord.backend.clear_calls.load(Ordering::SeqCst), 1);
        assert!(coord.session().is_empty());
        assert!(!coord.state().clearing);
    }

    #[tokio::test]
    async fn send_and_report_run_concurrently() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate.clone()));

        let observer = async {
            tokio::task::yield_now().await;
            let state = coord.state();
            // Both requests are parked on the gate at the same time.
            gate.notify_one();
            gate.notify_one();
            state
        };

        let (sent, reported, during) =
            tokio::join!(coord.send_message("ping"), coord.generate_report(), observer);

        assert!(during.sending);
        assert!(during.report_generating);
        assert!(!during.clearing);
        assert_eq!(sent, Dispatch::Completed);
        assert_eq!(reported, Dispatch::Completed);
        assert_eq!(coord.state(), OperationState::default());
    }

    #[tokio::test]
    async fn report_success_saves_with_fixed_filename() {
        let coord = coordinator(MockBackend::healthy());
        let mut rx = coord.subscribe();

        assert_eq!(coord.generate_report().await, Dispatch::Completed);

        let saved = coord.sink.saved.lock().unwrap().clone();
        assert_eq!(saved, vec![("report.pdf".to_string(), 15)]);

        let mut saw_saved = false;
        while let Ok(event) = rx.try_recv() {
            if let ClientEvent::ArtifactSaved { path } = event {
                assert_eq!(path, PathBuf::from("/downloads/report.pdf"));
                saw_saved = true;
            }
        }
        assert!(saw_saved);
    }

    #[tokio::test]
    async fn report_filename_can_be_overridden() {
        let coord = coordinator(MockBackend::healthy()).with_report_filename("recon.pdf");
        coord.generate_report().await;
        assert_eq!(coord.sink.saved.lock().unwrap()[0].0, "recon.pdf");
    }

    #[tokio::test]
    async fn report_failure_performs_no_download() {
        let coord = coordinator(MockBackend::failing());

        assert_eq!(coord.generate_report().await, Dispatch::Failed);

        assert!(coord.sink.saved.lock().unwrap().is_empty());
        let state = coord.state();
        assert!(!state.report_generating);
        assert_eq!(state.last_error.unwrap().operation, Operation::GenerateReport);
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let sink = MockSink {
            fail: true,
            ..Default::default()
        };
        let coord = RequestCoordinator::new(MockBackend::healthy(), sink, EventBus::new(16));

        assert_eq!(coord.generate_report().await, Dispatch::Failed);
        assert!(coord.state().last_error.unwrap().message.contains("read-only"));
        assert!(!coord.state().report_generating);
    }

    #[tokio::test]
    async fn clear_success_empties_session() {
        let coord = coordinator(MockBackend::healthy());
        coord.load_history().await;
        coord.send_message("ping").await;
        assert_eq!(coord.session().len(), 4);

        assert_eq!(coord.clear_history().await, Dispatch::Completed);
        assert!(coord.session().is_empty());
        assert!(!coord.state().clearing);
    }

    #[tokio::test]
    async fn clear_failure_leaves_session_unchanged() {
        let backend = MockBackend {
            clear_ok: false,
            ..MockBackend::healthy()
        };
        let coord = coordinator(backend);
        coord.load_history().await;
        let before = coord.session().messages();

        assert_eq!(coord.clear_history().await, Dispatch::Failed);

        assert_eq!(coord.session().messages(), before);
        assert_eq!(coord.state().last_error.unwrap().operation, Operation::ClearHistory);
    }

    #[tokio::test]
    async fn load_history_replaces_session_in_order() {
        let coord = coordinator(MockBackend::healthy());
        coord.session().append(Message::user("local only"));

        assert_eq!(coord.load_history().await, Dispatch::Completed);

        let roles: Vec<MessageRole> = coord.session().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(coord.session().messages()[0].content, "earlier");
    }

    #[tokio::test]
    async fn load_history_failure_leaves_session_empty() {
        let coord = coordinator(MockBackend::failing());
        assert_eq!(coord.load_history().await, Dispatch::Failed);
        assert!(coord.session().is_empty());
        assert_eq!(coord.backend.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_send_future_releases_flag() {
        let gate = Arc::new(Notify::new());
        let coord = coordinator(MockBackend::healthy().gated(gate));

        let mut pending = Box::pin(coord.send_message("ping"));
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), &mut pending).await;
        assert!(timed_out.is_err());
        assert!(coord.state().sending);

        drop(pending);
        assert!(!coord.state().sending);
        assert_eq!(coord.session().messages(), vec![Message::user("ping")]);
    }

    #[tokio::test]
    async fn lifecycle_events_bracket_each_operation() {
        let coord = coordinator(MockBackend::failing());
        let mut rx = coord.subscribe();

        coord.clear_history().await;

        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::OperationStarted {
                operation: Operation::ClearHistory
            }
        );
        match rx.try_recv().unwrap() {
            ClientEvent::OperationFinished { operation, outcome } => {
                assert_eq!(operation, Operation::ClearHistory);
                assert!(matches!(outcome, OperationOutcome::Failed { .. }));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn coordinator_drives_from_spawned_tasks() {
        let coord = Arc::new(coordinator(MockBackend::healthy()));

        let send = tokio::spawn({
            let coord = Arc::clone(&coord);
            async move { coord.send_message("ping").await }
        });
        let report = tokio::spawn({
            let coord = Arc::clone(&coord);
            async move { coord.generate_report().await }
        });

        assert_eq!(send.await.unwrap(), Dispatch::Completed);
        assert_eq!(report.await.unwrap(), Dispatch::Completed);
        assert_eq!(coord.session().len(), 2);
    }
}
