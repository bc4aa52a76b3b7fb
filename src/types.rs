use std::fmt;
use std::time::Duration;

/// Canonical node identifier type used throughout the crate.
pub type NodeId = String;

/// Lifecycle of a single node within a run.
///
/// Transitions are strictly `Idle -> Processing -> Done`; a node never moves
/// backwards and never skips `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Waiting for its parents (or for the initial dispatch, for roots).
    Idle,
    /// Claimed by the dispatcher; work is in flight.
    Processing,
    /// Work finished and dependents have been notified.
    Done,
}

impl NodeStatus {
    /// Whether `self -> next` is a legal single-step transition.
    pub fn can_transition_to(self, next: NodeStatus) -> bool {
        matches!(
            (self, next),
            (NodeStatus::Idle, NodeStatus::Processing) | (NodeStatus::Processing, NodeStatus::Done)
        )
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Processing => "processing",
            NodeStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// Parse a duration string like `"250ms"`, `"1s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{}' is missing a unit suffix", s))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}

/// Express `elapsed` as a (possibly fractional) number of time units.
pub fn in_units(elapsed: Duration, time_unit: Duration) -> f64 {
    if time_unit.is_zero() {
        return 0.0;
    }
    elapsed.as_secs_f64() / time_unit.as_secs_f64()
}
