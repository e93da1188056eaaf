//! Online PIBT (Priority Inheritance with Backtracking) MAPF planner.
//!
//! Given every agent's current cell and goal, [`PibtEngine::plan`] returns a
//! conflict-free assignment of next cells for one discrete timestep. Graphs
//! are built from an already-parsed `mapf_core::GridMap`; the textual map
//! format itself is that crate's concern, not this one's.

mod distance;
mod engine;
mod error;
mod graph;
mod registry;

pub use engine::{AgentRequest, AgentResult, PibtEngine};
pub use error::PlannerError;
pub use graph::{Graph, Node};
