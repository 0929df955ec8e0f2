pub mod app;
pub mod client;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod naming;
pub mod poll;
pub mod workflow;

pub use app::AppRecord;
pub use client::{AppClient, Lookup};
pub use errors::{ClientError, CliError, CliErrorKind, Operation};
pub use poll::PollPolicy;
