//! Domain models for positions and risk exposure.

mod position;
mod summary;

pub use position::{AssessedPosition, Position, PositionSide};
pub use summary::RiskSummary;
