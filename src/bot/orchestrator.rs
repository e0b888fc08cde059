//! Request lifecycle for the remote opponent.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Stamp identifying one outstanding move request.
///
/// A response is only applied while its ticket's generation matches the
/// session's current generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotTicket {
    generation: u64,
    fen: String,
}

impl BotTicket {
    /// Session generation the request was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position sent to the move service.
    pub fn fen(&self) -> &str {
        &self.fen
    }
}

/// Phase of the bot request state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotPhase {
    /// No request outstanding.
    Idle,
    /// Waiting for the response to this ticket.
    Requesting(BotTicket),
}

/// Tracks the single outstanding move request.
#[derive(Debug, Clone)]
pub struct BotOrchestrator {
    phase: BotPhase,
}

impl BotOrchestrator {
    /// Creates an idle orchestrator.
    pub fn new() -> Self {
        Self {
            phase: BotPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &BotPhase {
        &self.phase
    }

    /// Whether a request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, BotPhase::Requesting(_))
    }

    /// Enters `Requesting` and returns the ticket for the request.
    ///
    /// Returns `None` if a request is already outstanding.
    #[instrument(skip(self, fen))]
    pub fn begin(&mut self, generation: u64, fen: String) -> Option<BotTicket> {
        if self.is_busy() {
            debug!("Request already outstanding");
            return None;
        }
        let ticket = BotTicket { generation, fen };
        info!(generation, fen = %ticket.fen, "Requesting bot move");
        self.phase = BotPhase::Requesting(ticket.clone());
        Some(ticket)
    }

    /// Returns to `Idle` if `ticket` is the outstanding request.
    ///
    /// Returns `false` and leaves the phase untouched for any other ticket.
    #[instrument(skip(self, ticket), fields(generation = ticket.generation))]
    pub fn finish(&mut self, ticket: &BotTicket) -> bool {
        match &self.phase {
            BotPhase::Requesting(current) if current == ticket => {
                self.phase = BotPhase::Idle;
                true
            }
            _ => {
                debug!("Ticket is not outstanding");
                false
            }
        }
    }

    /// Abandons any outstanding request.
    pub fn cancel(&mut self) {
        if self.is_busy() {
            debug!("Cancelling outstanding request");
        }
        self.phase = BotPhase::Idle;
    }
}

impl Default for BotOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_request_at_a_time() {
        let mut bot = BotOrchestrator::new();
        let ticket = bot.begin(0, "fen".to_string()).unwrap();
        assert!(bot.is_busy());
        assert!(bot.begin(0, "fen".to_string()).is_none());

        assert!(bot.finish(&ticket));
        assert!(!bot.is_busy());
        assert!(!bot.finish(&ticket));
    }

    #[test]
    fn foreign_ticket_does_not_finish() {
        let mut bot = BotOrchestrator::new();
        let stale = bot.begin(0, "a".to_string()).unwrap();
        bot.cancel();
        let current = bot.begin(1, "b".to_string()).unwrap();

        assert!(!bot.finish(&stale));
        assert_eq!(bot.phase(), &BotPhase::Requesting(current));
    }
}
