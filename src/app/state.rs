//! Runtime state of the monitor.

use crate::domain::{AssessedPosition, RiskSummary};

/// Explicit application state, updated by the monitor's handlers.
///
/// On a failed refresh the prior positions and summary stay untouched and
/// only `error` is set; the caller can keep rendering the last good data.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    /// Open positions with risk exposure attached, exchange order.
    pub positions: Vec<AssessedPosition>,
    /// Aggregate exposure summary from the last successful refresh.
    pub summary: Option<RiskSummary>,
    /// Message from the last failed refresh, cleared on success.
    pub error: Option<String>,
    /// True while a refresh is in flight.
    pub loading: bool,
}
