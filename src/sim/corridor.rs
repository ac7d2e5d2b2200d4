//! A one-dimensional pellet-collection world with a pursuer

use std::any::Any;

use crate::{
    Error, Result,
    features::FeatureVector,
    ports::environment::{Action, Environment, FeatureExtractor, OpponentPolicy},
};

/// Move one cell toward lower indices.
pub const LEFT: Action = Action(0);
/// Move one cell toward higher indices.
pub const RIGHT: Action = Action(1);

const PELLET_SCORE: f64 = 10.0;
const CAUGHT_PENALTY: f64 = 50.0;

/// A corridor of cells with pellets and a pursuer.
///
/// The agent starts at the left wall, the pursuer at the right wall.
/// Every other cell holds a pellet. The episode ends when all pellets
/// are eaten or the pursuer reaches the agent's cell.
#[derive(Debug, Clone)]
pub struct CorridorWorld {
    length: usize,
    agent: usize,
    chaser: usize,
    pellets: Vec<bool>,
    score: f64,
    caught: bool,
}

impl CorridorWorld {
    pub fn new(length: usize) -> Result<Self> {
        if length < 3 {
            return Err(Error::InvalidConfiguration {
                message: format!("corridor length {length} is too short (minimum 3)"),
            });
        }
        let mut pellets = vec![true; length];
        pellets[0] = false;
        pellets[length - 1] = false;
        Ok(Self {
            length,
            agent: 0,
            chaser: length - 1,
            pellets,
            score: 0.0,
            caught: false,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn agent_position(&self) -> usize {
        self.agent
    }

    pub fn chaser_position(&self) -> usize {
        self.chaser
    }

    pub fn is_caught(&self) -> bool {
        self.caught
    }

    pub fn pellets_remaining(&self) -> usize {
        self.pellets.iter().filter(|&&p| p).count()
    }

    /// The cell a position moves to under an action, respecting walls.
    pub fn position_after(&self, position: usize, action: Action) -> usize {
        match action {
            LEFT => position.saturating_sub(1),
            _ => (position + 1).min(self.length - 1),
        }
    }

    /// Distance from a cell to the nearest remaining pellet, or the full
    /// corridor length when none remain.
    pub fn nearest_pellet_distance(&self, from: usize) -> usize {
        self.pellets
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p)
            .map(|(i, _)| i.abs_diff(from))
            .min()
            .unwrap_or(self.length)
    }
}

impl Default for CorridorWorld {
    fn default() -> Self {
        let length = 21;
        let mut pellets = vec![true; length];
        pellets[0] = false;
        pellets[length - 1] = false;
        Self {
            length,
            agent: 0,
            chaser: length - 1,
            pellets,
            score: 0.0,
            caught: false,
        }
    }
}

impl Environment for CorridorWorld {
    fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if self.agent > 0 {
            actions.push(LEFT);
        }
        if self.agent < self.length - 1 {
            actions.push(RIGHT);
        }
        actions
    }

    fn advance(&mut self, learner_action: Action, opponent_action: Action) {
        self.agent = self.position_after(self.agent, learner_action);
        if self.pellets[self.agent] {
            self.pellets[self.agent] = false;
            self.score += PELLET_SCORE;
        }
        self.chaser = self.position_after(self.chaser, opponent_action);
        if self.chaser == self.agent {
            self.caught = true;
            self.score -= CAUGHT_PENALTY;
        }
    }

    fn is_over(&self) -> bool {
        self.caught || self.pellets_remaining() == 0
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// Opponent policy that steps the pursuer toward the agent.
pub struct Pursuer;

impl OpponentPolicy for Pursuer {
    fn select(&mut self, env: &dyn Environment) -> Action {
        let Some(world) = (env as &dyn Any).downcast_ref::<CorridorWorld>() else {
            debug_assert!(false, "pursuer requires a corridor world");
            return LEFT;
        };
        if world.chaser_position() > world.agent_position() {
            LEFT
        } else {
            RIGHT
        }
    }
}

/// Feature extractor over (corridor state, candidate action) pairs.
///
/// Three features, each scaled into [0, 1]:
/// 1. Pellet proximity after the move (1 at a pellet cell)
/// 2. Pursuer distance after the move (1 at the far end)
/// 3. Fraction of cells still holding a pellet
pub struct CorridorExtractor;

impl FeatureExtractor for CorridorExtractor {
    fn len(&self) -> usize {
        3
    }

    fn extract(&self, env: &dyn Environment, action: Action) -> FeatureVector {
        let Some(world) = (env as &dyn Any).downcast_ref::<CorridorWorld>() else {
            debug_assert!(false, "corridor extractor requires a corridor world");
            return FeatureVector::zeros(3);
        };
        let length = world.length() as f64;
        let next = world.position_after(world.agent_position(), action);

        let pellet_proximity = 1.0 - world.nearest_pellet_distance(next) as f64 / length;
        let pursuer_distance = next.abs_diff(world.chaser_position()) as f64 / length;
        let pellet_fraction = world.pellets_remaining() as f64 / length;

        FeatureVector::new(vec![pellet_proximity, pursuer_distance, pellet_fraction])
    }
}
