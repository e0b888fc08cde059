//! Remote opponent: request lifecycle and move service clients.

mod orchestrator;
mod service;

pub use orchestrator::{BotOrchestrator, BotPhase, BotTicket};
pub use service::{HttpMoveService, MoveRequest, MoveResponse, MoveService, MoveServiceError};
