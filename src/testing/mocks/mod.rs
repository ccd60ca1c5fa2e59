//! Mock implementations for testing
//!
//! Stand-ins for the model provider and for the coaching backend a session
//! runs against.

pub mod claude;
pub mod session;

pub use claude::*;
pub use session::*;
