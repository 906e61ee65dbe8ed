pub mod cli;
pub mod google;
pub mod load_config;
pub mod oauth;
pub mod stdin;

pub use cli::{run, Cli, Commands};
