//! Event loop driving a session against a move service.
//!
//! The controller stays on the loop's task. Move requests run as spawned
//! tasks that report back over a channel, so board commands keep flowing
//! (and are refused as busy) while the service thinks.

use crate::bot::{BotTicket, MoveService, MoveServiceError};
use crate::config::{ConfigError, SessionConfig};
use crate::games::chess::{Move, Side, Square};
use crate::session::{BotOutcome, ClickOutcome, SessionController, SessionError, SessionState};
use crate::view::BoardSnapshot;
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Input from a board view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// A square was clicked.
    SquareClicked(Square),
    /// A piece was dragged from one square to another.
    AttemptMove {
        /// Origin square.
        from: Square,
        /// Destination square.
        to: Square,
    },
    /// The human picked a side.
    ChooseColor(Side),
    /// Start over, keeping the chosen side.
    NewGame,
    /// Start over and pick a side again.
    ChooseNewColor,
    /// Stop the loop.
    Shutdown,
}

/// Everything a front-end shows after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionView {
    /// Session snapshot.
    state: SessionState,
    /// Board to draw.
    board: BoardSnapshot,
    /// Numbered move list.
    history: Vec<String>,
    /// Status line, absent while the game runs.
    status_text: Option<String>,
}

impl SessionView {
    fn capture(controller: &SessionController) -> Self {
        Self {
            state: controller.snapshot().clone(),
            board: controller.board(),
            history: controller.game().history().lines(),
            status_text: controller.status_text(),
        }
    }
}

/// Notification sent to the front-end.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Session state changed.
    StateChanged(SessionView),
    /// A move was played by either side.
    MovePlayed(Move),
    /// A command was refused; nothing changed.
    CommandRejected(SessionError),
    /// A move request was sent.
    BotThinking(BotTicket),
    /// The bot did not produce a usable move; only a new game continues.
    BotStalled(String),
    /// The game ended.
    GameOver(String),
}

/// Drives a [`SessionController`] and its move requests.
pub struct SessionRunner {
    controller: SessionController,
    service: Arc<dyn MoveService>,
    pacing_delay: Duration,
    request_timeout: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionRunner {
    /// Creates a runner.
    #[instrument(skip(controller, service, events), fields(service = %service.name()))]
    pub fn new(
        controller: SessionController,
        service: Arc<dyn MoveService>,
        pacing_delay: Duration,
        request_timeout: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        info!("Creating session runner");
        Self {
            controller,
            service,
            pacing_delay,
            request_timeout,
            events,
        }
    }

    /// Creates a runner with the controller, pacing and timeout from `config`.
    #[instrument(skip_all)]
    pub fn from_config(
        config: &SessionConfig,
        service: Arc<dyn MoveService>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Self, ConfigError> {
        let controller = SessionController::new(config.controller_options()?);
        Ok(Self::new(
            controller,
            service,
            config.pacing_delay(),
            config.request_timeout(),
            events,
        ))
    }

    /// The controller being driven.
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Runs until [`SessionCommand::Shutdown`] or until the command channel
    /// closes, then hands the controller back.
    #[instrument(skip_all)]
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> SessionController {
        info!("Starting session loop");
        let (response_tx, mut response_rx) = mpsc::unbounded_channel();

        self.publish();
        self.dispatch_bot_request(&response_tx);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some((ticket, response)) = response_rx.recv() => {
                    self.handle_response(ticket, response);
                }
            }
            self.dispatch_bot_request(&response_tx);
        }

        info!("Session loop stopped");
        self.controller
    }

    #[instrument(skip(self))]
    fn handle_command(&mut self, command: SessionCommand) {
        debug!("Handling command");
        let result = match command {
            SessionCommand::SquareClicked(square) => {
                self.controller.square_clicked(square).map(|outcome| match outcome {
                    ClickOutcome::Moved(mv) => Some(mv),
                    ClickOutcome::Selected(_) | ClickOutcome::Cleared => None,
                })
            }
            SessionCommand::AttemptMove { from, to } => {
                self.controller.attempt_move(from, to).map(Some)
            }
            SessionCommand::ChooseColor(side) => self.controller.choose_color(side).map(|_| None),
            SessionCommand::NewGame => {
                self.controller.new_game();
                Ok(None)
            }
            SessionCommand::ChooseNewColor => self.controller.choose_new_color().map(|_| None),
            SessionCommand::Shutdown => Ok(None),
        };

        match result {
            Ok(Some(mv)) => self.announce_move(mv),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, "Command rejected");
                self.emit(SessionEvent::CommandRejected(e));
                return;
            }
        }
        self.publish();
    }

    #[instrument(skip(self, ticket, response), fields(generation = ticket.generation()))]
    fn handle_response(
        &mut self,
        ticket: BotTicket,
        response: Result<Option<String>, MoveServiceError>,
    ) {
        match self.controller.resolve_bot_response(ticket, response) {
            BotOutcome::Applied(mv) => self.announce_move(mv),
            BotOutcome::Rejected(e) => self.emit(SessionEvent::BotStalled(e.to_string())),
            BotOutcome::NoMove => {
                self.emit(SessionEvent::BotStalled("Bot returned no move".to_string()))
            }
            BotOutcome::TransportFailed(e) => self.emit(SessionEvent::BotStalled(e.message)),
            BotOutcome::Discarded => return,
        }
        self.publish();
    }

    fn dispatch_bot_request(
        &mut self,
        responses: &mpsc::UnboundedSender<(BotTicket, Result<Option<String>, MoveServiceError>)>,
    ) {
        let Some(ticket) = self.controller.take_bot_request() else {
            return;
        };
        self.emit(SessionEvent::BotThinking(ticket.clone()));

        let service = Arc::clone(&self.service);
        let responses = responses.clone();
        let pacing_delay = self.pacing_delay;
        let request_timeout = self.request_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(pacing_delay).await;
            let request = service.request_move(ticket.fen());
            let response = match tokio::time::timeout(request_timeout, request).await {
                Ok(response) => response,
                Err(_) => {
                    let timeout_ms = request_timeout.as_millis();
                    warn!(timeout_ms, "Move request timed out");
                    let message = format!("Move request timed out after {timeout_ms} ms");
                    Err(MoveServiceError::new(message))
                }
            };
            if responses.send((ticket, response)).is_err() {
                debug!("Session loop gone, dropping move response");
            }
        });
    }

    fn announce_move(&self, mv: Move) {
        self.emit(SessionEvent::MovePlayed(mv));
        if let Some(text) = self.controller.status_text() {
            info!(status = %text, "Game over");
            self.emit(SessionEvent::GameOver(text));
        }
    }

    fn publish(&self) {
        self.emit(SessionEvent::StateChanged(SessionView::capture(&self.controller)));
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
