//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: lifecycle of one crawl run (ready, running, completed, aborted)
//! - `Throttle`: politeness interval shared by every outbound request

mod run_state;
mod throttle;

// Re-export main types
pub use run_state::RunState;
pub use throttle::Throttle;
