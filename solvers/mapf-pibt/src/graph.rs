//! Grid graph model: dense-id nodes over the passable cells of a `GridMap`.

use std::collections::HashMap;

use mapf_core::{GridMap, Tile};

/// A traversable grid cell.
///
/// Created once when the graph is built from a [`GridMap`]; never mutated
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: u32,
    pub x: u32,
    pub y: u32,
}

/// The set of passable nodes of a grid map, plus their 4-connected
/// neighbour relation.
///
/// Obstacle cells never become nodes: there is nothing to avoid at plan
/// time because an agent can never be assigned an obstacle cell as its
/// current position or goal in the first place.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    neighbours: Vec<Vec<u32>>,
    by_pos: HashMap<(u32, u32), u32>,
}

impl Graph {
    /// Build a graph from an already-parsed [`GridMap`].
    pub fn from_grid_map(map: &GridMap) -> Self {
        let width = map.width();
        let height = map.height();

        let mut nodes = Vec::new();
        let mut by_pos = HashMap::new();

        for y in 0..height {
            for x in 0..width {
                if map.get(x, y) == Some(Tile::Passable) {
                    let id = nodes.len() as u32;
                    nodes.push(Node { id, x, y });
                    by_pos.insert((x, y), id);
                }
            }
        }

        let mut neighbours = vec![Vec::with_capacity(4); nodes.len()];
        const CARDINALS: [(i64, i64); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        for node in &nodes {
            for (dx, dy) in CARDINALS {
                let nx = node.x as i64 + dx;
                let ny = node.y as i64 + dy;
                if nx < 0 || ny < 0 {
                    continue;
                }
                if let Some(&nid) = by_pos.get(&(nx as u32, ny as u32)) {
                    neighbours[node.id as usize].push(nid);
                }
            }
        }

        Self { nodes, neighbours, by_pos }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up the node id at a grid position, translating a request's
    /// `(x, y)` into the graph's dense id space.
    pub fn get_node(&self, x: u32, y: u32) -> Option<u32> {
        self.by_pos.get(&(x, y)).copied()
    }

    pub fn node(&self, id: u32) -> Node {
        self.nodes[id as usize]
    }

    pub fn position_of(&self, id: u32) -> (u32, u32) {
        let n = self.node(id);
        (n.x, n.y)
    }

    /// Neighbours of `id` (cardinal, passable cells only - never includes
    /// `id` itself; the "stay" move is synthesized by the caller).
    pub fn neighbours(&self, id: u32) -> &[u32] {
        &self.neighbours[id as usize]
    }
}
