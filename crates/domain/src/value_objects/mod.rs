pub mod liquidity_quote;
pub mod percentage;
pub mod removal_quote;
pub mod swap_quote;

pub use liquidity_quote::LiquidityQuote;
pub use percentage::Percentage;
pub use removal_quote::RemovalQuote;
pub use swap_quote::SwapQuote;
