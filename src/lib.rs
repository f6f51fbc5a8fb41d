pub mod cli;
pub mod command;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod parser;
pub mod progress;
pub mod resolver;
pub mod strategy;
