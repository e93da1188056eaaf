//! Per-agent shortest-path distance tables, built by reverse BFS from a goal.

use std::collections::VecDeque;

use crate::graph::Graph;

/// `dist[node_id]` is the hop count from `node_id` to the goal this table
/// was built for. Unreachable nodes hold [`DistanceTable::UNREACHABLE`].
#[derive(Debug, Clone)]
pub struct DistanceTable {
    dist: Vec<u32>,
}

impl DistanceTable {
    pub const UNREACHABLE: u32 = u32::MAX;

    /// BFS from `goal` over `graph`; neighbour hops cost 1.
    pub fn build(graph: &Graph, goal: u32) -> Self {
        let mut dist = vec![Self::UNREACHABLE; graph.len()];
        dist[goal as usize] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(goal);

        while let Some(u) = queue.pop_front() {
            let du = dist[u as usize];
            for &v in graph.neighbours(u) {
                if dist[v as usize] == Self::UNREACHABLE {
                    dist[v as usize] = du + 1;
                    queue.push_back(v);
                }
            }
        }

        Self { dist }
    }

    /// Shortest-path distance from `node` to this table's goal, or
    /// [`Self::UNREACHABLE`] if no path exists.
    pub fn get(&self, node: u32) -> u32 {
        self.dist[node as usize]
    }
}
