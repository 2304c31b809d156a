pub mod types;
pub mod skip;

pub use types::*;
pub use skip::*;
