// ojpack - single-file bundling for competitive-programming submissions

pub mod utils;
pub mod core;
pub mod infrastructure;
pub mod cli;
