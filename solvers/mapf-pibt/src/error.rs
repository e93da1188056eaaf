//! Error taxonomy for the PIBT planner (§7).

/// Errors the engine can surface. `Unreachable` is deliberately absent: an
/// unreachable goal is not an error, the planner proceeds and the agent may
/// stay put until the caller changes its goal or the map changes.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("map not found: {0}")]
    MapNotFound(String),

    #[error("agent {id}: position ({x}, {y}) is not a traversable node")]
    NodeNotTraversable { id: i32, x: u32, y: u32 },

    #[error("duplicate agent id {0} in request")]
    DuplicateAgentInRequest(i32),

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}
