//! Command protocol handling.
//!
//! JSON-lines commands in, JSON-lines messages out, plus the scenario files
//! a session is bootstrapped from.

pub mod parser;
pub mod scenario;

pub use parser::{parse_command, Command};
pub use scenario::{Scenario, ScenarioError};
