pub mod math;
pub mod time;
pub mod units;

pub use math::*;
pub use time::*;
pub use units::*;
