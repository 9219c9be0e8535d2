pub mod cli;
pub mod load_config;

pub use cli::{convert_files, run, Cli, CommandLineArgs};
