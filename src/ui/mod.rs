// UI module - terminal front end
//
// This module contains:
// - Cli: clap command-line definition
// - CliController: interactive wizard, shell and tool sessions
// - render: plain-text views of state

pub mod cli;
pub mod controller;
pub mod render;

pub use cli::{Cli, Command, TextInput};
pub use controller::CliController;
