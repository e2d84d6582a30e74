//! Main application state and the action pipeline.
//!
//! `PanelApp` owns the raw state map from the hub, the per-control
//! dispatcher, the notification slot and the confirmation dialog. An action
//! moves through it as: submit (gesture) -> confirm (consequential actions
//! park here until the dialog resolves) -> proceed (pre-flight toast, spawn
//! the service call) -> report (result toast). Declining the dialog drops
//! the request silently.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use eframe::egui;
use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::action::{ActionKind, ActionRequest};
use crate::config::Config;
use crate::dispatch::{ActionResult, Dispatcher};
use crate::model::PanelModel;
use crate::notify::{NotificationCenter, Severity};
use crate::service::{HubClient, ServiceError};
use crate::snapshot::{EntityState, FEED_ENTITY, STATUS_ENTITY};

/// Main application state
pub struct PanelApp {
    /// Application configuration
    pub config: Config,
    /// Hub API client
    client: HubClient,
    /// Keyed read-only state map from the last successful refresh
    states: HashMap<String, EntityState>,
    /// Async task for refreshing the state map
    states_task: Option<JoinHandle<Result<Vec<EntityState>, ServiceError>>>,
    /// Error message from the last refresh attempt
    pub states_error: Option<String>,
    /// When the last refresh attempt finished
    last_refresh: Option<Instant>,
    /// In-flight service calls, keyed by originating control
    pub dispatcher: Dispatcher,
    /// The single toast slot
    pub notifications: NotificationCenter,
    /// Contents of the feed URL input field
    pub feed_url_input: String,
    /// Request parked while its confirmation dialog is open
    pub pending_confirm: Option<ActionRequest>,
}

impl PanelApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            Config::default()
        });

        let mut app = Self::with_config(config);
        app.refresh_snapshot();
        app
    }

    fn with_config(config: Config) -> Self {
        let client = HubClient::new(&config.hub.url, config.hub.token.clone())
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            states: HashMap::new(),
            states_task: None,
            states_error: None,
            last_refresh: None,
            dispatcher: Dispatcher::default(),
            notifications: NotificationCenter::default(),
            feed_url_input: String::new(),
            pending_confirm: None,
        }
    }

    /// Derive the render model from the current state map. Recomputed every
    /// frame; never cached across refreshes.
    pub fn build_model(&self) -> PanelModel {
        PanelModel::build(self.states.get(STATUS_ENTITY), self.states.get(FEED_ENTITY))
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn is_refreshing(&self) -> bool {
        self.states_task.is_some()
    }

    /// Fetch a fresh state map from the hub
    pub fn refresh_snapshot(&mut self) {
        if self.states_task.is_some() {
            return;
        }

        let client = self.client.clone();
        self.states_task = Some(tokio::spawn(async move { client.fetch_states().await }));
    }

    /// Entry point for a user gesture. Consequential actions park here until
    /// their confirmation dialog resolves; everything else proceeds directly.
    pub fn submit(&mut self, request: ActionRequest) {
        if request.kind.requires_confirmation() {
            self.pending_confirm = Some(request);
        } else {
            self.proceed(request);
        }
    }

    /// Resolve the open confirmation dialog. Declining is a silent no-op.
    pub fn resolve_confirm(&mut self, accepted: bool) {
        let Some(request) = self.pending_confirm.take() else {
            return;
        };

        if accepted {
            self.proceed(request);
        }
    }

    /// Invoke the action: pre-flight toast, then the spawned service call.
    fn proceed(&mut self, request: ActionRequest) {
        match request.kind {
            ActionKind::RestoreBackup => {
                // No service call; hand the user over to the hub's own
                // backup surface.
                let url = format!("{}/config/backups", self.client.base_url());
                match open::that(&url) {
                    Ok(()) => {
                        self.notifications.show(request.pending_message(), Severity::Info);
                    }
                    Err(e) => {
                        tracing::error!("Failed to open backup manager: {}", e);
                        self.notifications.show(
                            format!("Failed to open backup manager: {}", e),
                            Severity::Error,
                        );
                    }
                }
                return;
            }
            ActionKind::ConfigureFeed => {
                let blank = request
                    .feed_url
                    .as_deref()
                    .is_none_or(|url| url.trim().is_empty());
                if blank {
                    self.notifications
                        .show("Enter the RTR feed URL before saving.", Severity::Error);
                    return;
                }
            }
            _ => {}
        }

        let Some(service) = request.kind.service() else {
            return;
        };

        let payload = request.payload();
        let client = self.client.clone();

        self.notifications
            .show(request.pending_message(), Severity::Info);
        self.dispatcher
            .begin(request, async move { client.call_service(service, payload).await });
    }

    /// Surface a finished invocation's outcome.
    fn report(&mut self, request: ActionRequest, result: ActionResult) {
        if result.success {
            if request.kind == ActionKind::ConfigureFeed {
                // Only a successful save clears the input.
                self.feed_url_input.clear();
            }
            self.notifications
                .show(request.success_message(), Severity::Success);
            // The hub state just changed; pick it up promptly.
            self.refresh_snapshot();
        } else {
            let message = result
                .error_message
                .unwrap_or_else(|| "Unknown error".to_string());
            self.notifications.show(message, Severity::Error);
        }
    }

    /// Poll async work and timers. Runs once per frame.
    fn poll(&mut self, ctx: &egui::Context) {
        let refresh_due = self.last_refresh.is_none_or(|t| {
            t.elapsed() >= Duration::from_secs(self.config.hub.refresh_interval_secs.max(5))
        });
        if refresh_due {
            self.refresh_snapshot();
        }

        if self.states_task.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = self.states_task.take() {
                match handle.now_or_never() {
                    Some(Ok(Ok(states))) => {
                        self.states = states
                            .into_iter()
                            .map(|entity| (entity.entity_id.clone(), entity))
                            .collect();
                        self.states_error = None;
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("Snapshot refresh failed: {}", e);
                        self.states_error = Some(e.to_string());
                    }
                    Some(Err(e)) => {
                        tracing::error!("Snapshot task panicked: {}", e);
                        self.states_error = Some("Snapshot refresh panicked".to_string());
                    }
                    None => {
                        tracing::warn!("Snapshot task not ready despite is_finished()");
                    }
                }
                self.last_refresh = Some(Instant::now());
            }
        }

        for (request, result) in self.dispatcher.poll() {
            self.report(request, result);
        }

        self.notifications.tick(Instant::now());

        if self.states_task.is_some() || self.dispatcher.any_loading() {
            ctx.request_repaint();
        } else if let Some(deadline) = self.notifications.deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        } else {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll(ctx);

        let model = self.build_model();
        crate::ui::render_panel(self, ctx, &model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::snapshot::ModuleRecord;

    fn app() -> PanelApp {
        PanelApp::with_config(Config::default())
    }

    fn module(id: &str) -> ModuleRecord {
        ModuleRecord {
            id: id.to_string(),
            ..ModuleRecord::default()
        }
    }

    #[tokio::test]
    async fn test_consequential_action_waits_for_confirmation() {
        let mut app = app();

        app.submit(ActionRequest::new(ActionKind::Update));

        assert!(app.pending_confirm.is_some());
        assert!(!app.dispatcher.any_loading());
        assert!(app.notifications.current().is_none());
    }

    #[tokio::test]
    async fn test_declined_confirmation_is_silent() {
        let mut app = app();

        app.submit(ActionRequest::for_module(
            ActionKind::RemoveModule,
            module("ipm"),
        ));
        app.resolve_confirm(false);

        assert!(app.pending_confirm.is_none());
        assert!(!app.dispatcher.any_loading());
        assert!(app.notifications.current().is_none());
    }

    #[tokio::test]
    async fn test_accepted_confirmation_invokes_with_preflight_toast() {
        let mut app = app();

        app.submit(ActionRequest::new(ActionKind::Update));
        app.resolve_confirm(true);

        assert!(app.dispatcher.is_loading("update"));
        let toast = app.notifications.current().expect("pre-flight toast");
        assert_eq!(toast.severity, Severity::Info);
        assert!(toast.message.contains("Updating"));
    }

    #[tokio::test]
    async fn test_unconfirmed_actions_invoke_directly() {
        let mut app = app();

        app.submit(ActionRequest::new(ActionKind::CheckUpdates));

        assert!(app.pending_confirm.is_none());
        assert!(app.dispatcher.is_loading("check-updates"));
    }

    #[tokio::test]
    async fn test_blank_feed_url_never_invokes() {
        let mut app = app();

        app.submit(ActionRequest::configure_feed("   ".to_string()));

        assert!(!app.dispatcher.any_loading());
        let toast = app.notifications.current().expect("validation toast");
        assert_eq!(toast.severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_feed_input_cleared_only_on_success() {
        let mut app = app();
        app.feed_url_input = "https://rtr.example/feed".to_string();

        let request = ActionRequest::configure_feed(app.feed_url_input.clone());
        app.report(request.clone(), ActionResult::failed("gateway offline"));
        assert_eq!(app.feed_url_input, "https://rtr.example/feed");

        app.report(request, ActionResult::ok());
        assert!(app.feed_url_input.is_empty());
    }

    #[tokio::test]
    async fn test_completed_refresh_stamps_last_refresh() {
        let mut app = app();
        assert!(app.last_refresh().is_none());

        app.refresh_snapshot();
        let ctx = egui::Context::default();
        for _ in 0..500 {
            app.poll(&ctx);
            if app.last_refresh().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // No hub is listening in tests; the attempt fails but still stamps
        // the marker the footer renders.
        assert!(app.last_refresh().is_some());
        assert!(app.states_error.is_some());
    }

    #[tokio::test]
    async fn test_failed_result_surfaces_error_message() {
        let mut app = app();

        app.report(
            ActionRequest::new(ActionKind::Backup),
            ActionResult::failed("disk full"),
        );

        let toast = app.notifications.current().expect("error toast");
        assert_eq!(toast.severity, Severity::Error);
        assert!(toast.message.contains("disk full"));
    }
}
