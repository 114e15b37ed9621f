//! Buy/sell against the trading-bot contract.

mod contract;
pub mod flow;
pub mod slippage;

pub use contract::{EvmTradingBot, RouterQuoter};
pub use flow::{
    quote_price, run_buy, run_sell, BuyRequest, ChainError, FlowStage, SellRequest, Swap,
    TradeError, TradeReceipt, TradeSettings, TradingBot,
};
