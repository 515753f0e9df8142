//! The core step loop — the heart of Stepwright.
//!
//! The agent follows a bounded **Think → Act** cycle:
//!
//! 1. **Receive** a goal from the caller
//! 2. **Think**: send the log to the reasoning oracle with the declared tools
//! 3. **If tool calls**: execute them and record the paired responses
//! 4. **If text only**: that is the final answer — the run finishes
//! 5. Repeat until the answer arrives, the terminate sentinel fires, or the
//!    step budget runs out
//!
//! One step before the budget runs out, a warning message nudges the oracle
//! to wrap up. When the budget is exhausted the run is forced to finish with
//! an explicit marker — budget exhaustion is a designed outcome, not an
//! error.

pub mod events;
pub mod run_context;
pub mod runner;
pub mod step;

#[cfg(test)]
pub mod test_helpers;

pub use events::{StreamEvent, DONE_SENTINEL};
pub use run_context::{AgentRunConfig, AgentRunContext};
pub use runner::{AgentRunner, StreamSettings};
pub use step::StepEngine;
