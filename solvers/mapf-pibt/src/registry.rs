//! The cross-timestep agent registry: persistent per-agent state that
//! survives between `plan()` calls.

use std::collections::HashMap;

use rand::Rng;

use crate::distance::DistanceTable;
use crate::graph::Graph;

/// Persistent state for one agent, retained across planning calls.
pub struct Agent {
    pub id: i32,
    pub v_now: u32,
    pub v_next: Option<u32>,
    pub goal: u32,
    pub elapsed: u32,
    pub init_d: u32,
    pub tie_breaker: f32,
    pub dist: DistanceTable,
}

/// `id -> Agent`. Agents absent from a given request remain here but are
/// not planned and do not occupy a cell for that call.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<i32, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self { agents: HashMap::new() }
    }

    pub fn get(&self, id: i32) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: i32) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.agents.contains_key(&id)
    }

    /// Insert a brand-new agent, building its distance table and computing
    /// `init_d` from it (see DESIGN.md for why `init_d` is not left at 0).
    pub fn insert<R: Rng>(&mut self, graph: &Graph, id: i32, v_now: u32, goal: u32, rng: &mut R) {
        let dist = DistanceTable::build(graph, goal);
        let init_d = dist.get(v_now);
        self.agents.insert(
            id,
            Agent {
                id,
                v_now,
                v_next: None,
                goal,
                elapsed: 0,
                init_d,
                tie_breaker: rng.gen_range(0.0..1.0),
                dist,
            },
        );
    }

    /// Update an existing agent ahead of a new planning call: refresh
    /// `v_now`, clear `v_next`, and rebuild the distance table if the goal
    /// changed.
    pub fn refresh(&mut self, graph: &Graph, id: i32, v_now: u32, goal: u32) {
        let agent = self.agents.get_mut(&id).expect("refresh on unknown agent");
        agent.v_now = v_now;
        agent.v_next = None;
        if agent.goal != goal {
            agent.goal = goal;
            agent.dist = DistanceTable::build(graph, goal);
        }
    }

    pub fn path_dist(&self, id: i32, node: u32) -> u32 {
        self.agents[&id].dist.get(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapf_core::GridMap;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn refresh_rebuilds_distance_table_on_goal_change() {
        let map = GridMap::parse("type octile\nheight 1\nwidth 5\nmap\n.....\n").unwrap();
        let g = Graph::from_grid_map(&map);
        let mut reg = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);

        let start = g.get_node(0, 0).unwrap();
        let goal_a = g.get_node(3, 0).unwrap();
        reg.insert(&g, 0, start, goal_a, &mut rng);
        assert_eq!(reg.path_dist(0, start), 3);

        let goal_b = g.get_node(4, 0).unwrap();
        reg.refresh(&g, 0, start, goal_b);
        assert_eq!(reg.path_dist(0, start), 4);
    }

    #[test]
    fn refresh_keeps_distance_table_when_goal_unchanged() {
        let map = GridMap::parse("type octile\nheight 1\nwidth 3\nmap\n...\n").unwrap();
        let g = Graph::from_grid_map(&map);
        let mut reg = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(2);

        let start = g.get_node(0, 0).unwrap();
        let goal = g.get_node(2, 0).unwrap();
        reg.insert(&g, 0, start, goal, &mut rng);
        let mid = g.get_node(1, 0).unwrap();
        reg.refresh(&g, 0, mid, goal);
        assert_eq!(reg.path_dist(0, mid), 1);
    }
}
