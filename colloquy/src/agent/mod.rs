//! Agent module — configuration and the run loop.
//!
//! - **[`Agent`]** is a pure description of identity, instructions,
//!   tools, handoffs, and guardrails. It contains no execution logic.
//! - **[`Runner`]** drives an agent through the turn loop against a
//!   generation client, swapping agents on handoffs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use colloquy::prelude::*;
//!
//! let agent = Agent::new("analyst")
//!     .instructions("You answer questions about dashboard data.")
//!     .tool(lookup_metric_tool())
//!     .shared();
//!
//! let runner = Runner::new(client);
//! let result = runner.run(agent, "How did Q3 revenue trend?", &[], RunConfig::default()).await?;
//! println!("{}", result.text());
//! ```

mod config;
mod result;
mod runner;

pub use config::{Agent, Instructions, InstructionsProvider};
pub use result::{RunConfig, RunItem, RunResult};
pub use runner::Runner;
