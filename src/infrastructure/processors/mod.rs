// Processors module
pub mod directives;
pub mod python_resolver;
pub mod external_bundler;
pub mod minifier;

pub use directives::*;
pub use python_resolver::*;
pub use external_bundler::*;
pub use minifier::*;
