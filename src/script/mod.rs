//! Script building blocks: commands and the diagnostic history

pub mod command;
pub mod history;

pub use command::{Channel, Command};
pub use history::{Event, History};
