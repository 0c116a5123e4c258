// Shared utilities module
pub mod errors;
pub mod logging;
pub mod env_vars;
pub mod config_loader;
pub mod ui;

pub use errors::*;
pub use logging::*;
pub use env_vars::*;
pub use config_loader::*;
pub use ui::*;
