//! AI systems (behavior state machine + patrol planner)

pub mod fsm;
pub mod patrol;


// Re-export all systems
pub use fsm::*;
pub use patrol::*;
