pub mod checks;
pub mod config;
pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod io;
pub mod paths;
pub mod progress;
pub mod registry;
pub mod runlog;
pub mod runner;
pub mod saga;
pub mod spec;
pub mod template;

pub use error::{LiftoffError, Result};
