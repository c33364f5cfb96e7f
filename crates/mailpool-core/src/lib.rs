pub mod account;
pub mod classifier;
pub mod config;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod executor;
pub mod io;
pub mod rotation;
pub mod rules;
pub mod types;

pub use error::{PoolError, Result};
