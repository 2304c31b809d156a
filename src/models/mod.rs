pub mod big_buy;
pub mod eth_price;
pub mod pool;
pub mod price;
pub mod swap_event;
pub mod volume;

pub use big_buy::*;
pub use eth_price::*;
pub use pool::*;
pub use price::*;
pub use swap_event::*;
pub use volume::*;
