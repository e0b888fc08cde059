//! Session controller: color assignment, turn alternation and the bot gate.
//!
//! The controller is synchronous. When the bot is to move it parks a
//! [`BotTicket`] in an outbox; whoever drives the session (normally
//! [`crate::SessionRunner`]) takes the ticket, calls the move service and
//! hands the outcome back through [`SessionController::resolve_bot_response`].

use crate::bot::{BotOrchestrator, BotTicket, MoveServiceError};
use crate::games::chess::{Game, GameStatus, Move, MoveError, Position, Side, Square};
use crate::highlight::{HighlightMap, compute_highlights};
use crate::view::BoardSnapshot;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Top-level phase of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum SessionPhase {
    /// Waiting for the human to pick a side.
    AwaitingColorChoice,
    /// The human may select squares and move.
    HumanToMove,
    /// The bot is to move; a request is outstanding or has stalled.
    BotToMove,
    /// The game is over.
    Terminal,
}

/// Immutable view of the session, replaced on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionState {
    /// Side the human plays, `None` until chosen.
    human: Option<Side>,
    /// Side to move.
    turn: Side,
    /// Selected square, if any.
    selection: Option<Square>,
    /// Highlight overlay for the selection.
    highlights: HighlightMap,
    /// Game status.
    status: GameStatus,
    /// Whether a move request is outstanding.
    busy: bool,
    /// Current phase.
    phase: SessionPhase,
    /// Reset counter carried by bot tickets.
    generation: u64,
}

/// Options fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct ControllerOptions {
    /// Whether the human picks a side before playing.
    allow_color_choice: bool,
    /// Position every game starts from.
    start: Position,
}

impl ControllerOptions {
    /// Whether the human picks a side before playing.
    pub fn allow_color_choice(&self) -> bool {
        self.allow_color_choice
    }

    /// Position every game starts from.
    pub fn start(&self) -> &Position {
        &self.start
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::new(false, Position::new())
    }
}

/// Result of a square click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The square was selected and its targets highlighted.
    Selected(Square),
    /// The selection was cleared.
    Cleared,
    /// A move was played from the previous selection.
    Moved(Move),
}

/// What happened to a move service response.
#[derive(Debug, Clone)]
pub enum BotOutcome {
    /// The suggested move was legal and has been played.
    Applied(Move),
    /// The suggestion failed validation; the position is unchanged.
    Rejected(MoveError),
    /// The service answered without a move.
    NoMove,
    /// The request failed or timed out.
    TransportFailed(MoveServiceError),
    /// The response belonged to an earlier game and was ignored.
    Discarded,
}

/// Error returned when a session command is refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// A move request is outstanding.
    #[display("Waiting for the bot to move")]
    Busy,

    /// The human tried to act on the bot's turn.
    #[display("Not your turn: {} to move", _0)]
    NotYourTurn(Side),

    /// The game is over.
    #[display("Game is over")]
    GameOver,

    /// No side has been chosen yet.
    #[display("Choose a side first")]
    AwaitingColorChoice,

    /// A side has already been chosen for this game.
    #[display("Side already chosen")]
    ColorAlreadyChosen,

    /// This session does not offer a color choice.
    #[display("Color choice is not available")]
    ColorChoiceDisabled,

    /// The move itself was refused.
    #[display("{}", _0)]
    Move(MoveError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Move(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::Move(err)
    }
}

/// Owns the game and decides who may act on it.
#[derive(Debug)]
pub struct SessionController {
    options: ControllerOptions,
    game: Game,
    human: Option<Side>,
    selection: Option<Square>,
    highlights: HighlightMap,
    phase: SessionPhase,
    generation: u64,
    bot: BotOrchestrator,
    outbox: Option<BotTicket>,
    state: SessionState,
}

impl SessionController {
    /// Creates a session.
    ///
    /// Without a color choice the human plays White; if the start position
    /// has Black to move, a bot request is issued immediately.
    #[instrument(skip(options), fields(allow_color_choice = options.allow_color_choice))]
    pub fn new(options: ControllerOptions) -> Self {
        let game = Game::from_position(options.start.clone());
        let human = (!options.allow_color_choice).then_some(Side::White);
        let state = SessionState {
            human,
            turn: game.turn(),
            selection: None,
            highlights: HighlightMap::new(),
            status: game.status(),
            busy: false,
            phase: SessionPhase::AwaitingColorChoice,
            generation: 0,
        };

        let mut controller = Self {
            options,
            game,
            human,
            selection: None,
            highlights: HighlightMap::new(),
            phase: SessionPhase::AwaitingColorChoice,
            generation: 0,
            bot: BotOrchestrator::new(),
            outbox: None,
            state,
        };
        controller.enter_turn();
        controller.publish();
        info!(phase = %controller.phase, "Session created");
        controller
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &SessionState {
        &self.state
    }

    /// The game in progress.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Options this session was created with.
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Status line, or `None` while the game runs.
    pub fn status_text(&self) -> Option<String> {
        self.game.status().status_text()
    }

    /// Snapshot for a board view.
    pub fn board(&self) -> BoardSnapshot {
        BoardSnapshot::new(
            self.game.fen(),
            self.highlights.clone(),
            self.human.unwrap_or(Side::White),
        )
    }

    /// Fixes the human's side and starts the game.
    #[instrument(skip(self))]
    pub fn choose_color(&mut self, side: Side) -> Result<(), SessionError> {
        if !self.options.allow_color_choice {
            return Err(SessionError::ColorChoiceDisabled);
        }
        if self.phase != SessionPhase::AwaitingColorChoice {
            return Err(SessionError::ColorAlreadyChosen);
        }

        info!(side = %side, "Human chose side");
        self.game.reset();
        self.human = Some(side);
        self.clear_selection();
        self.enter_turn();
        self.publish();
        Ok(())
    }

    /// Handles a click on `square`.
    ///
    /// With nothing selected the square is selected if it has legal targets.
    /// Clicking the selection again clears it, clicking another own piece
    /// re-selects, and any other square attempts a move. A failed attempt
    /// is treated as a fresh selection of the clicked square.
    #[instrument(skip(self), fields(square = %square))]
    pub fn square_clicked(&mut self, square: Square) -> Result<ClickOutcome, SessionError> {
        self.ensure_human_may_act()?;

        let selection = self.selection;
        let outcome = match selection {
            None => self.select(square),
            Some(selected) if selected == square => {
                debug!("Deselecting");
                self.clear_selection();
                ClickOutcome::Cleared
            }
            Some(_) if self.is_own_piece(square) => self.select(square),
            Some(selected) => match self.game.apply_local_move(selected, square) {
                Ok(mv) => {
                    self.after_local_move(&mv);
                    ClickOutcome::Moved(mv)
                }
                Err(e) => {
                    debug!(error = %e, "Click did not form a move, reselecting");
                    self.select(square)
                }
            },
        };

        self.publish();
        Ok(outcome)
    }

    /// Plays a drag gesture from `from` to `to`.
    ///
    /// A refused move leaves the session untouched.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub fn attempt_move(&mut self, from: Square, to: Square) -> Result<Move, SessionError> {
        self.ensure_human_may_act()?;

        let mv = self.game.apply_local_move(from, to)?;
        self.after_local_move(&mv);
        self.publish();
        Ok(mv)
    }

    /// Starts over from the start position.
    ///
    /// Accepted in every phase. Any outstanding request becomes stale. A
    /// chosen side is kept.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        self.abandon_game();
        info!(generation = self.generation, "New game");
        self.enter_turn();
        self.publish();
    }

    /// Starts over and returns to the side picker.
    #[instrument(skip(self))]
    pub fn choose_new_color(&mut self) -> Result<(), SessionError> {
        if !self.options.allow_color_choice {
            return Err(SessionError::ColorChoiceDisabled);
        }
        self.abandon_game();
        self.human = None;
        info!(generation = self.generation, "Returning to side picker");
        self.enter_turn();
        self.publish();
        Ok(())
    }

    /// Takes the pending move request, if one was issued since the last call.
    pub fn take_bot_request(&mut self) -> Option<BotTicket> {
        self.outbox.take()
    }

    /// Applies the move service's answer to `ticket`.
    ///
    /// Responses for an earlier game are discarded without any state change.
    /// Otherwise the session leaves the busy state whatever the answer. A
    /// rejected or missing move leaves the bot to move until a new game.
    #[instrument(skip(self, ticket, response), fields(generation = ticket.generation()))]
    pub fn resolve_bot_response(
        &mut self,
        ticket: BotTicket,
        response: Result<Option<String>, MoveServiceError>,
    ) -> BotOutcome {
        if ticket.generation() != self.generation || !self.bot.finish(&ticket) {
            info!(current = self.generation, "Discarding stale bot response");
            return BotOutcome::Discarded;
        }

        let outcome = match response {
            Ok(Some(token)) => match self.game.apply_remote_move(&token) {
                Ok(mv) => {
                    info!(san = %mv.san(), "Bot moved");
                    self.enter_turn();
                    BotOutcome::Applied(mv)
                }
                Err(e) => {
                    warn!(token = %token, error = %e, "Bot move rejected, waiting for new game");
                    BotOutcome::Rejected(e)
                }
            },
            Ok(None) => {
                warn!("Move service returned no move");
                BotOutcome::NoMove
            }
            Err(e) => {
                warn!(error = %e, "Move service unavailable");
                BotOutcome::TransportFailed(e)
            }
        };

        self.publish();
        outcome
    }

    fn ensure_human_may_act(&self) -> Result<(), SessionError> {
        if self.bot.is_busy() {
            debug!("Gesture rejected while busy");
            return Err(SessionError::Busy);
        }
        match self.phase {
            SessionPhase::HumanToMove => Ok(()),
            SessionPhase::Terminal => Err(SessionError::GameOver),
            SessionPhase::AwaitingColorChoice => Err(SessionError::AwaitingColorChoice),
            SessionPhase::BotToMove => Err(SessionError::NotYourTurn(self.game.turn())),
        }
    }

    fn is_own_piece(&self, square: Square) -> bool {
        matches!(
            self.game.position().piece_at(square),
            Some((side, _)) if Some(side) == self.human
        )
    }

    fn select(&mut self, square: Square) -> ClickOutcome {
        let highlights = compute_highlights(self.game.position(), Some(square));
        if highlights.is_empty() {
            debug!("No legal targets, clearing selection");
            self.clear_selection();
            return ClickOutcome::Cleared;
        }
        debug!(targets = highlights.len() - 1, "Selected");
        self.selection = Some(square);
        self.highlights = highlights;
        ClickOutcome::Selected(square)
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.highlights.clear();
    }

    fn after_local_move(&mut self, mv: &Move) {
        info!(san = %mv.san(), "Human moved");
        self.clear_selection();
        self.enter_turn();
    }

    fn abandon_game(&mut self) {
        self.generation += 1;
        self.bot.cancel();
        self.outbox = None;
        self.game.reset();
        self.clear_selection();
    }

    /// Derives the phase from the chosen side and the position, and issues a
    /// ticket if the bot is to move. Without a side the picker comes first,
    /// even for a finished start position.
    fn enter_turn(&mut self) {
        let next = match self.human {
            None => SessionPhase::AwaitingColorChoice,
            Some(_) if self.game.status().is_terminal() => SessionPhase::Terminal,
            Some(side) if side == self.game.turn() => SessionPhase::HumanToMove,
            Some(_) => SessionPhase::BotToMove,
        };

        if next != self.phase {
            info!(from = %self.phase, to = %next, "Phase transition");
        }
        self.phase = next;

        if next == SessionPhase::BotToMove {
            if let Some(ticket) = self.bot.begin(self.generation, self.game.fen()) {
                self.outbox = Some(ticket);
            }
        }
    }

    fn publish(&mut self) {
        self.state = SessionState {
            human: self.human,
            turn: self.game.turn(),
            selection: self.selection,
            highlights: self.highlights.clone(),
            status: self.game.status(),
            busy: self.bot.is_busy(),
            phase: self.phase,
            generation: self.generation,
        };
    }
}
