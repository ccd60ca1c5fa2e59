//! # Writing Gym
//!
//! A writing coach: describe what a piece is for, get criteria drawn from that
//! description, then draft, self-assess and revise against AI scores.
//!
//! ## Usage
//!
//! ```bash
//! writing-gym serve [--port 3001]
//! writing-gym coach [--server http://localhost:3001]
//! ```
//!
//! ## Modules
//!
//! - `api` - HTTP endpoints for criteria extraction and draft assessment
//! - `claude` - Prompt templates, the Messages API client and response parsing
//! - `cli` - Argument parsing, command routing and terminal rendering
//! - `client` - Client for a running API, usable as a session backend
//! - `coaching` - Prompt, completion, parse and validate pipelines
//! - `config` - Configuration file and environment loading
//! - `model` - Context, criteria and assessment types
//! - `session` - Session state machine, its manager and comparison views
//! - `validation` - Checks on caller input and model output
//! - `testing` - Mocks and fixtures
pub mod api;
pub mod claude;
pub mod cli;
pub mod client;
pub mod coaching;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod validation;

pub mod testing;

pub use error::{Error, Result};
