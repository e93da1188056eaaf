//! The PIBT engine: priority ordering, `funcPIBT`/`plan_one_step`/
//! `choose_node`, and the per-timestep commit phase.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::distance::DistanceTable;
use crate::error::PlannerError;
use crate::graph::Graph;
use crate::registry::AgentRegistry;

/// One agent's current position and goal for this planning call.
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest {
    pub id: i32,
    pub init: (u32, u32),
    pub goal: (u32, u32),
}

/// The next position assigned to one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentResult {
    pub id: i32,
    pub pos: (u32, u32),
}

/// Owns the graph, the persistent agent registry, and the planner-scoped
/// RNG. One instance per map; `plan()` takes `&mut self`, which makes two
/// concurrent calls against the same engine a compile error rather than a
/// documentation-only rule.
pub struct PibtEngine {
    graph: Graph,
    registry: AgentRegistry,
    rng: StdRng,
}

impl PibtEngine {
    /// Build an engine over `graph`, seeding its RNG explicitly so that
    /// `(seed, request sequence)` fully determines every future `plan()`
    /// output.
    pub fn new(graph: Graph, seed: u64) -> Self {
        Self {
            graph,
            registry: AgentRegistry::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Plan one timestep for the given batch of agents.
    ///
    /// Ingestion is atomic: if any request is invalid, no agent, reservation
    /// table, or distance table is touched.
    pub fn plan(&mut self, requests: &[AgentRequest]) -> Result<Vec<AgentResult>, PlannerError> {
        let validated = self.validate(requests)?;

        for &(id, init_id, goal_id) in &validated {
            if self.registry.contains(id) {
                self.registry.refresh(&self.graph, id, init_id, goal_id);
            } else {
                self.registry.insert(&self.graph, id, init_id, goal_id, &mut self.rng);
            }
        }

        tracing::debug!(agents = validated.len(), "planning timestep");

        for &(id, init_id, _) in &validated {
            if self.registry.path_dist(id, init_id) == DistanceTable::UNREACHABLE {
                tracing::warn!(agent = id, "goal unreachable from current position");
            }
        }

        let n = self.graph.len();
        let mut occupied_now: Vec<Option<i32>> = vec![None; n];
        let mut occupied_next: Vec<Option<i32>> = vec![None; n];
        for &(id, init_id, _) in &validated {
            occupied_now[init_id as usize] = Some(id);
        }

        let mut order: Vec<i32> = validated.iter().map(|&(id, _, _)| id).collect();
        order.sort_by(|&a_id, &b_id| {
            let a = self.registry.get(a_id).expect("ingested agent missing");
            let b = self.registry.get(b_id).expect("ingested agent missing");
            b.elapsed
                .cmp(&a.elapsed)
                .then_with(|| b.init_d.cmp(&a.init_d))
                .then_with(|| b.tie_breaker.partial_cmp(&a.tie_breaker).unwrap())
        });

        let mut decided: Vec<i32> = Vec::with_capacity(order.len());
        for id in order {
            let has_next = self.registry.get(id).expect("ingested agent missing").v_next.is_some();
            if !has_next {
                func_pibt(id, &self.graph, &mut self.registry, &occupied_now, &mut occupied_next, &mut self.rng);
            }
            decided.push(id);
        }

        let results = self.verify_and_collect(&decided)?;
        self.commit(&decided);
        Ok(results)
    }

    fn validate(&self, requests: &[AgentRequest]) -> Result<Vec<(i32, u32, u32)>, PlannerError> {
        let mut seen = HashSet::with_capacity(requests.len());
        let mut validated = Vec::with_capacity(requests.len());
        for req in requests {
            if !seen.insert(req.id) {
                return Err(PlannerError::DuplicateAgentInRequest(req.id));
            }
            let init_id = self.graph.get_node(req.init.0, req.init.1).ok_or(
                PlannerError::NodeNotTraversable { id: req.id, x: req.init.0, y: req.init.1 },
            )?;
            let goal_id = self.graph.get_node(req.goal.0, req.goal.1).ok_or(
                PlannerError::NodeNotTraversable { id: req.id, x: req.goal.0, y: req.goal.1 },
            )?;
            validated.push((req.id, init_id, goal_id));
        }
        Ok(validated)
    }

    /// Post-plan consistency check (§7: `InternalInvariantViolation`).
    /// Reachable only by an engine bug, never by caller input.
    fn verify_and_collect(&self, decided: &[i32]) -> Result<Vec<AgentResult>, PlannerError> {
        let mut seen_next = HashSet::with_capacity(decided.len());
        let mut results = Vec::with_capacity(decided.len());
        for &id in decided {
            let agent = self.registry.get(id).expect("decided agent missing");
            let v_next = agent.v_next.ok_or_else(|| {
                let msg = format!("agent {id} has no v_next after planning");
                tracing::error!("{msg}");
                PlannerError::InternalInvariantViolation(msg)
            })?;
            if !seen_next.insert(v_next) {
                let msg = format!("vertex collision at node {v_next}");
                tracing::error!("{msg}");
                return Err(PlannerError::InternalInvariantViolation(msg));
            }
            results.push(AgentResult { id, pos: self.graph.position_of(v_next) });
        }

        for i in 0..decided.len() {
            for j in (i + 1)..decided.len() {
                let ai = self.registry.get(decided[i]).expect("decided agent missing");
                let aj = self.registry.get(decided[j]).expect("decided agent missing");
                if ai.v_next == Some(aj.v_now) && aj.v_next == Some(ai.v_now) {
                    let msg = format!(
                        "swap collision between agents {} and {}",
                        decided[i], decided[j]
                    );
                    tracing::error!("{msg}");
                    return Err(PlannerError::InternalInvariantViolation(msg));
                }
            }
        }

        Ok(results)
    }

    fn commit(&mut self, decided: &[i32]) {
        for &id in decided {
            let agent = self.registry.get_mut(id).expect("decided agent missing");
            let v_next = agent.v_next.expect("verified non-null above");
            agent.elapsed = if v_next == agent.goal { 0 } else { agent.elapsed + 1 };
            agent.v_now = v_next;
            agent.v_next = None;
        }
    }
}

/// Priority inheritance with backtracking for a single agent. Returns
/// whether `id` secured a node other than a forced stay.
fn func_pibt(
    id: i32,
    graph: &Graph,
    registry: &mut AgentRegistry,
    occupied_now: &[Option<i32>],
    occupied_next: &mut [Option<i32>],
    rng: &mut StdRng,
) -> bool {
    let mut v = plan_one_step(id, graph, registry, occupied_now, occupied_next, rng);
    loop {
        let node = match v {
            None => {
                let v_now = registry.get(id).expect("agent must exist").v_now;
                occupied_next[v_now as usize] = Some(id);
                registry.get_mut(id).expect("agent must exist").v_next = Some(v_now);
                return false;
            }
            Some(node) => node,
        };

        if let Some(aj) = occupied_now[node as usize] {
            if aj != id && registry.get(aj).expect("agent must exist").v_next.is_none() {
                tracing::trace!(agent = id, displaces = aj, node, "priority inheritance");
                if !func_pibt(aj, graph, registry, occupied_now, occupied_next, rng) {
                    v = plan_one_step(id, graph, registry, occupied_now, occupied_next, rng);
                    continue;
                }
            }
        }
        return true;
    }
}

fn plan_one_step(
    id: i32,
    graph: &Graph,
    registry: &mut AgentRegistry,
    occupied_now: &[Option<i32>],
    occupied_next: &mut [Option<i32>],
    rng: &mut StdRng,
) -> Option<u32> {
    let v = choose_node(id, graph, registry, occupied_now, occupied_next, rng);
    if let Some(node) = v {
        occupied_next[node as usize] = Some(id);
        registry.get_mut(id).expect("agent must exist").v_next = Some(node);
    }
    v
}

fn choose_node(
    id: i32,
    graph: &Graph,
    registry: &AgentRegistry,
    occupied_now: &[Option<i32>],
    occupied_next: &[Option<i32>],
    rng: &mut StdRng,
) -> Option<u32> {
    let agent = registry.get(id).expect("agent must exist");
    let v_now = agent.v_now;
    let goal = agent.goal;

    let mut candidates: Vec<u32> = graph.neighbours(v_now).to_vec();
    candidates.push(v_now);
    candidates.shuffle(rng);

    let mut best: Option<u32> = None;
    for u in candidates {
        if occupied_next[u as usize].is_some() {
            continue;
        }
        if let Some(aj) = occupied_now[u as usize] {
            if registry.get(aj).expect("agent must exist").v_next == Some(v_now) {
                continue;
            }
        }

        if u == goal {
            return Some(u);
        }

        best = match best {
            None => Some(u),
            Some(v) => {
                let c_v = registry.path_dist(id, v);
                let c_u = registry.path_dist(id, u);
                let prefer_u = c_u < c_v
                    || (c_u == c_v && occupied_now[v as usize].is_some() && occupied_now[u as usize].is_none());
                if prefer_u {
                    Some(u)
                } else {
                    Some(v)
                }
            }
        };
    }
    best
}
