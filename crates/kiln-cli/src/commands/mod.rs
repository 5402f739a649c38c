//! Command handlers, one module per subcommand.

pub mod clean;
pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
