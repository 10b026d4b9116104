//! Stateless per-table repositories.

pub mod session;
pub mod turn;

pub use session::SessionRepo;
pub use turn::{AppendTurnOptions, TurnRepo};
