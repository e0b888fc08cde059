//! Line-oriented terminal front-end: input parsing and event rendering.

use crate::games::chess::{MoveToken, Side, Square};
use crate::runner::{SessionCommand, SessionEvent, SessionView};
use crate::session::SessionPhase;
use crate::view::render_board;

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalInput {
    /// Forward to the session.
    Command(SessionCommand),
    /// Redraw the board.
    ShowBoard,
    /// Print the move list.
    ShowHistory,
    /// Print the command summary.
    Help,
    /// Leave.
    Quit,
}

/// Terminal input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum InputError {
    /// Blank line.
    #[display("Empty input")]
    Empty,
    /// Not a known command or move.
    #[display("Unknown command {:?}, type `help`", _0)]
    Unknown(String),
    /// A square name was expected.
    #[display("Not a square: {:?}", _0)]
    BadSquare(String),
}

impl std::error::Error for InputError {}

/// Command summary printed by `help`.
pub const HELP: &str = "\
Commands:
  e2e4        move a piece (drag)
  click e2    click a square
  white|black pick a side
  new         start a new game
  color       start over and pick a side again
  board       show the board
  history     show the move list
  quit        leave";

/// Parses one line of terminal input.
pub fn parse_input(line: &str) -> Result<TerminalInput, InputError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err(InputError::Empty);
    };
    let word = first.to_ascii_lowercase();

    let input = match word.as_str() {
        "quit" | "exit" | "q" => TerminalInput::Quit,
        "help" | "?" => TerminalInput::Help,
        "board" => TerminalInput::ShowBoard,
        "history" => TerminalInput::ShowHistory,
        "new" => TerminalInput::Command(SessionCommand::NewGame),
        "color" => TerminalInput::Command(SessionCommand::ChooseNewColor),
        "click" => {
            let text = words.next().unwrap_or_default();
            let square: Square = text
                .parse()
                .map_err(|_| InputError::BadSquare(text.to_string()))?;
            TerminalInput::Command(SessionCommand::SquareClicked(square))
        }
        _ => {
            if let Ok(side) = word.parse::<Side>() {
                TerminalInput::Command(SessionCommand::ChooseColor(side))
            } else if let Ok(token) = MoveToken::parse(&word) {
                TerminalInput::Command(SessionCommand::AttemptMove {
                    from: token.from(),
                    to: token.to(),
                })
            } else {
                return Err(InputError::Unknown(first.to_string()));
            }
        }
    };

    Ok(input)
}

/// Renders a session view: board, turn and status.
pub fn render_view(view: &SessionView) -> String {
    let state = view.state();
    let mut out = render_board(view.board());

    match state.phase() {
        SessionPhase::AwaitingColorChoice => {
            out.push_str("Choose your side: `white` or `black`\n");
        }
        _ => {
            if let Some(human) = state.human() {
                out.push_str(&format!("You play {}. ", human.label()));
            }
            out.push_str(&format!("Current turn: {}\n", state.turn().label()));
        }
    }

    if *state.busy() {
        out.push_str("Bot is thinking...\n");
    }
    if let Some(text) = view.status_text() {
        out.push_str(text);
        out.push('\n');
    }
    out
}

/// Renders the move list, one ply per line.
pub fn render_history(view: &SessionView) -> String {
    if view.history().is_empty() {
        "No moves yet.".to_string()
    } else {
        view.history().join("\n")
    }
}

/// Text to print for an event, if any.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StateChanged(view) => Some(render_view(view)),
        SessionEvent::MovePlayed(mv) => Some(format!("{} played {}", mv.side().label(), mv.san())),
        SessionEvent::CommandRejected(e) => Some(format!("Rejected: {}", e)),
        SessionEvent::BotThinking(_) => None,
        SessionEvent::BotStalled(reason) => Some(format!(
            "Bot could not move ({}). Type `new` to start over.",
            reason
        )),
        SessionEvent::GameOver(text) => Some(text.clone()),
    }
}
