//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - ControllerClient for the planner
//! - DisplayState and InputState for rendering
//!
//! Key presses become [`UserAction`]s for the embedded controller, except
//! for the notification keys, which act on the push worker directly the way
//! a click on a system notification would.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::task::JoinHandle;

use planner_core::worker::NotificationAction;
use planner_core::{
    PlannerConfig, PlannerMessage, PushPlatform, UserAction, WorkerEvent, WorkerState,
};

use crate::controller_client::ControllerClient;
use crate::display::DisplayState;
use crate::input::{InputState, KeyOutcome, NotificationCommand};
use crate::platform::TerminalPlatform;
use crate::views::{self, ViewContext};

/// Frame budget (~10 FPS is plenty for forms and lists)
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// How long a tick waits for terminal input before doing work
const TICK: Duration = Duration::from_millis(16);

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,

    // === Planner Integration ===
    client: ControllerClient,
    platform: Arc<TerminalPlatform>,
    worker_task: JoinHandle<()>,

    // === Surface State ===
    display: DisplayState,
    input: InputState,

    /// Last frame time
    last_frame: Instant,
}

impl App {
    /// Create the app and start its push worker
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &PlannerConfig) -> Self {
        let (platform, worker_task) = TerminalPlatform::spawn(config.push.app_scope.clone());
        let platform = Arc::new(platform);
        let push: Arc<dyn PushPlatform> = platform.clone();

        Self {
            running: true,
            client: ControllerClient::new(config, push),
            platform,
            worker_task,
            display: DisplayState::new(config.notification_timeout),
            input: InputState::new(),
            last_frame: Instant::now(),
        }
    }

    /// Message to print after the terminal is restored
    pub fn goodbye(&self) -> Option<&str> {
        self.display.goodbye.as_deref()
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        self.client.start().await;
        self.process_messages();
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => {
                            tracing::info!("Terminal event stream closed");
                            self.running = false;
                        }
                    }
                }

                _ = tokio::time::sleep(TICK) => {}
            }

            // Apply finished backend calls
            self.client.poll_effects().await;

            self.process_messages();
            self.update();
            self.render(terminal)?;

            if self.display.quit_requested {
                self.running = false;
            }

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if self.running && elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        self.worker_task.abort();
        Ok(())
    }

    /// Process all pending messages from the controller
    fn process_messages(&mut self) {
        for msg in self.client.recv_all() {
            if let PlannerMessage::ScreenChanged { screen } = &msg {
                self.input.on_screen(*screen);
            }
            self.display.apply_message(msg);
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.display.update(delta);
    }

    fn render(&self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let ctx = ViewContext {
            state: self.client.state(),
            display: &self.display,
            input: &self.input,
            panel: self.platform.panel(),
            busy: self.client.is_busy(),
        };
        terminal.draw(|frame| views::draw(frame, &ctx))?;
        Ok(())
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) {
        match self.input.handle_key(key, self.client.state()) {
            KeyOutcome::Ignored | KeyOutcome::Edited => {}
            KeyOutcome::Action(action) => {
                if matches!(action, UserAction::ConfirmationAnswered { .. }) {
                    self.display.clear_prompt();
                }
                self.client.send(action).await;
            }
            KeyOutcome::Notification(command) => self.handle_notification(command),
        }
    }

    /// Act on the newest notification in the panel
    fn handle_notification(&mut self, command: NotificationCommand) {
        let panel = self.platform.panel();
        let Some(notification) = panel.latest() else {
            self.display
                .apply_message(PlannerMessage::info("No notifications to act on"));
            return;
        };

        let worker = self.platform.worker();
        let active = worker.state() == WorkerState::Activated;

        let event = match command {
            NotificationCommand::Dismiss => {
                panel.close(&notification.tag);
                if !active {
                    return;
                }
                WorkerEvent::NotificationClose { notification }
            }
            _ if !active => {
                self.display
                    .apply_message(PlannerMessage::info("Enable reminders first"));
                return;
            }
            NotificationCommand::Open => WorkerEvent::NotificationClick {
                notification,
                action: None,
            },
            NotificationCommand::MarkConsumed => WorkerEvent::NotificationClick {
                notification,
                action: Some(NotificationAction::MarkConsumed.id().to_string()),
            },
            NotificationCommand::Snooze => WorkerEvent::NotificationClick {
                notification,
                action: Some(NotificationAction::Snooze.id().to_string()),
            },
        };

        if let Err(e) = worker.dispatch(event) {
            tracing::warn!(error = %e, "Push worker unavailable");
            self.display
                .apply_message(PlannerMessage::error("Reminder worker stopped"));
        }
    }
}
