pub mod config;
pub mod constants;

pub use config::{FocusConfig, FocusConfigError, load_focus_config};
