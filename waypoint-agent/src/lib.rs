//! Plan pipeline for Waypoint: model, parser, interpreter, orchestrator.
//!
//! An instruction flows through [`orchestrator::Navigator`]: the external
//! generator produces noisy text, [`parser::parse_plan`] recovers a typed
//! [`plan::Plan`], and [`interpreter::execute_plan`] drives the browser
//! session and aggregates extractions into an ordered
//! [`interpreter::ResultMap`].

pub mod history;
pub mod interpreter;
pub mod orchestrator;
pub mod parser;
pub mod plan;

pub use history::TaskHistory;
pub use interpreter::{execute_plan, ResultMap};
pub use orchestrator::Navigator;
pub use parser::parse_plan;
pub use plan::{Plan, Step};
