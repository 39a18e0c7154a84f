//! Demo world - A small random-walk simulation driving the exporter
//!
//! Agents wander a grid towards randomly chosen destinations, spending energy
//! as they move and recovering it once they arrive. Two overlays are exposed:
//! a north-south `temperature` gradient and an `indoors` flag for a central
//! building.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use rand::Rng;

use crate::application::ports::outbound::{
    EntityView, OverlayMap, OverlaySampler, WorldSnapshotPort,
};
use crate::domain::value_objects::{FieldValue, InfoValue, Position};
use crate::infrastructure::config::SimulationConfig;

const MAX_ENERGY: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Worker,
    Visitor,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Worker => write!(f, "worker"),
            AgentRole::Visitor => write!(f, "visitor"),
        }
    }
}

impl InfoValue for AgentRole {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

/// Point-in-time copy of one agent
#[derive(Debug, Clone)]
pub struct AgentSnapshot {
    pub name: String,
    pub position: Position,
    pub destination: Position,
    pub role: AgentRole,
    pub energy: i64,
}

impl EntityView for AgentSnapshot {
    fn info_field_names() -> Vec<String> {
        vec!["role".to_string(), "energy".to_string()]
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_at_destination(&self) -> bool {
        self.position == self.destination
    }

    fn info_values(&self) -> Vec<&dyn InfoValue> {
        vec![&self.role as &dyn InfoValue, &self.energy]
    }
}

/// Linear gradient from 10 degrees (north edge) to 30 degrees (south edge)
struct TemperatureOverlay {
    rows: i32,
}

impl OverlaySampler for TemperatureOverlay {
    fn value_at(&self, position: &Position) -> FieldValue {
        let ratio = f64::from(position.row) / f64::from(self.rows.max(2) - 1);
        let celsius = 10.0 + 20.0 * ratio;
        FieldValue::Float((celsius * 10.0).round() / 10.0)
    }
}

/// True inside the central quarter of the grid
struct IndoorsOverlay {
    rows: i32,
    cols: i32,
}

impl OverlaySampler for IndoorsOverlay {
    fn value_at(&self, position: &Position) -> FieldValue {
        let rows = self.rows / 4..self.rows * 3 / 4;
        let cols = self.cols / 4..self.cols * 3 / 4;
        FieldValue::Bool(rows.contains(&position.row) && cols.contains(&position.col))
    }
}

/// Random-walk world
pub struct DemoWorld {
    rows: i32,
    cols: i32,
    agents: RwLock<Vec<AgentSnapshot>>,
    overlays: OverlayMap,
}

impl DemoWorld {
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Self {
        let rows = config.grid_rows.max(1);
        let cols = config.grid_cols.max(1);

        let agents = (0..config.agent_count)
            .map(|i| {
                let position = random_position(rng, rows, cols);
                AgentSnapshot {
                    name: format!("Agent-{i}"),
                    position,
                    destination: random_position(rng, rows, cols),
                    role: if i % 3 == 0 {
                        AgentRole::Visitor
                    } else {
                        AgentRole::Worker
                    },
                    energy: MAX_ENERGY,
                }
            })
            .collect();

        let mut overlays: OverlayMap = BTreeMap::new();
        overlays.insert(
            "temperature".to_string(),
            Arc::new(TemperatureOverlay { rows }) as Arc<dyn OverlaySampler>,
        );
        overlays.insert(
            "indoors".to_string(),
            Arc::new(IndoorsOverlay { rows, cols }) as Arc<dyn OverlaySampler>,
        );

        Self {
            rows,
            cols,
            agents: RwLock::new(agents),
            overlays,
        }
    }

    /// Advance every agent by one iteration
    pub fn step<R: Rng>(&self, rng: &mut R) {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        for agent in agents.iter_mut() {
            if agent.position == agent.destination {
                agent.energy = (agent.energy + 5).min(MAX_ENERGY);
                if rng.gen_bool(0.1) {
                    agent.destination = random_position(rng, self.rows, self.cols);
                }
                continue;
            }

            let d_row = (agent.destination.row - agent.position.row).signum();
            let d_col = (agent.destination.col - agent.position.col).signum();
            agent.position = agent
                .position
                .step_within(d_row, d_col, self.rows, self.cols);
            agent.energy = (agent.energy - 1).max(0);
        }
    }
}

impl WorldSnapshotPort for DemoWorld {
    type Entity = AgentSnapshot;

    fn entities(&self) -> Vec<AgentSnapshot> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn overlays(&self) -> OverlayMap {
        self.overlays.clone()
    }
}

fn random_position<R: Rng>(rng: &mut R, rows: i32, cols: i32) -> Position {
    Position::new(rng.gen_range(0..rows), rng.gen_range(0..cols))
}
