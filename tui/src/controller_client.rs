//! Controller Client
//!
//! Thin wrapper around the planner [`Controller`] for TUI integration. The
//! controller is embedded directly (no network between surface and core);
//! this client owns its message receiver and gives the app one place to
//! send actions and collect what came back.
//!
//! # Architecture
//!
//! The TUI holds no planner logic. Its job is:
//! 1. Convert key presses to [`UserAction`]s
//! 2. Send them to the controller
//! 3. Collect [`PlannerMessage`]s and apply effect outcomes every frame
//! 4. Render from [`AppState`] and display state

use std::sync::Arc;

use tokio::sync::mpsc;

use planner_core::{
    AppState, BackendGateway, Controller, ControllerConfig, HttpGateway, PlannerConfig,
    PlannerMessage, PushPlatform, UserAction,
};

/// Capacity of the controller to surface channel
const MESSAGE_BUFFER: usize = 100;

/// Client for the embedded controller
pub struct ControllerClient<G: BackendGateway + 'static = HttpGateway> {
    controller: Controller<G>,
    rx: mpsc::Receiver<PlannerMessage>,
}

impl ControllerClient<HttpGateway> {
    /// Controller talking HTTP to the configured backend
    pub fn new(config: &PlannerConfig, platform: Arc<dyn PushPlatform>) -> Self {
        Self::with_gateway(
            HttpGateway::from_config(config),
            platform,
            ControllerConfig::from(config),
        )
    }
}

impl<G: BackendGateway + 'static> ControllerClient<G> {
    /// Controller over any gateway
    pub fn with_gateway(
        gateway: G,
        platform: Arc<dyn PushPlatform>,
        config: ControllerConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(MESSAGE_BUFFER);
        let controller = Controller::new(gateway, platform, config, tx);
        Self { controller, rx }
    }

    /// Announce the initial screen
    pub async fn start(&mut self) {
        self.controller.start().await;
    }

    /// Send a user action to the controller
    pub async fn send(&mut self, action: UserAction) {
        self.controller.handle_action(action).await;
    }

    /// Apply finished effects (must be called regularly)
    pub async fn poll_effects(&mut self) -> bool {
        self.controller.poll_effects().await
    }

    /// Receive all pending messages from the controller (non-blocking)
    pub fn recv_all(&mut self) -> Vec<PlannerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Planner state to render
    pub fn state(&self) -> &AppState {
        self.controller.state()
    }

    /// Whether a backend call is still running
    pub fn is_busy(&self) -> bool {
        self.controller.pending_effects() > 0
    }
}
