//! Writing session management
//!
//! A session carries one piece of writing from context through criteria
//! extraction into a sequence of assessed drafts.

pub mod comparison;
pub mod manager;
pub mod state;

pub use comparison::{compare, CalibrationRow, Comparison, ProgressRow};
pub use manager::{CoachingBackend, Progress, SessionManager};
pub use state::{Effect, Iteration, IterationKind, Phase, Session, SessionError};
