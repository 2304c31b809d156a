pub mod big_buy_analyzer;
pub mod eth_price_reconciler;
pub mod event_ledger;
pub mod price_aggregator;
pub mod price_derivation;
pub mod swap_decoder;
pub mod token_analyzer;
pub mod volume_analyzer;

pub use big_buy_analyzer::*;
pub use eth_price_reconciler::*;
pub use event_ledger::*;
pub use price_aggregator::*;
pub use price_derivation::*;
pub use swap_decoder::*;
pub use token_analyzer::*;
pub use volume_analyzer::*;
