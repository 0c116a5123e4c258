// Infrastructure layer
pub mod file_system;
pub mod process;
pub mod delivery;
pub mod processors;

pub use file_system::*;
pub use process::*;
pub use delivery::*;
pub use processors::*;
