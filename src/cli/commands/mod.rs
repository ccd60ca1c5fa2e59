//! Command implementation modules

pub mod coach;
pub mod serve;

pub use coach::run_coach_command;
pub use serve::run_serve_command;
