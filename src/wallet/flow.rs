use alloy_primitives::utils::format_ether;
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;

use super::slippage::{apply_slippage, deadline};
use crate::config::Chain;
use crate::state::StatusHub;

/// Failure of a single chain call.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc call failed: {0}")]
    Rpc(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("invalid chain config: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowStage {
    #[default]
    Idle,
    WalletConnect,
    CheckAllowedAsset,
    AddAsset,
    ApproveAsset,
    CheckBalance,
    QuotePrice,
    ComputeSlippage,
    SubmitSwap,
    AwaitConfirmation,
    Done,
    Failed,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("no signer configured, set {0}")]
    MissingSigner(&'static str),
    #[error("invalid signer key: {0}")]
    InvalidSigner(String),
    #[error("no {token} balance held by the contract")]
    EmptyBalance { token: Address },
    #[error("{stage} failed: {source}")]
    Step {
        stage: FlowStage,
        #[source]
        source: ChainError,
    },
}

impl TradeError {
    /// What the user sees; details go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyBalance { .. } => "No balance deposited in the smart contract.",
            Self::MissingSigner(_) | Self::InvalidSigner(_) => "Wallet not available.",
            Self::Step { .. } => "Something went wrong. Please try again.",
        }
    }
}

/// Swap arguments for `buyASSET` / `sellASSET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub token_in: Address,
    pub amount_in: U256,
    pub token_out: Address,
    pub min_out: U256,
    pub deadline: U256,
}

/// Calls the flow makes against the trading-bot contract and the router.
/// Sends return the hash right away; `confirm` waits for the receipt.
#[async_trait]
pub trait TradingBot: Send + Sync {
    /// Account the contract is called from.
    async fn connect(&self) -> Result<Address, ChainError>;
    async fn allowed_token_count(&self) -> Result<U256, ChainError>;
    async fn allowed_token(&self, index: U256) -> Result<Address, ChainError>;
    async fn add_asset(&self, name: &str, token: Address) -> Result<TxHash, ChainError>;
    /// `setAssets`: contract approves the router for `token`.
    async fn approve_asset(&self, token: Address) -> Result<TxHash, ChainError>;
    async fn deposit_balance(&self, token: Address) -> Result<U256, ChainError>;
    async fn token_balance(&self, token: Address) -> Result<U256, ChainError>;
    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>, ChainError>;
    async fn submit_buy(&self, swap: &Swap) -> Result<TxHash, ChainError>;
    async fn submit_sell(&self, swap: &Swap) -> Result<TxHash, ChainError>;
    async fn confirm(&self, tx: TxHash) -> Result<TxHash, ChainError>;
}

/// Per-trade constants from the `[chain]` config section.
#[derive(Debug, Clone, Copy)]
pub struct TradeSettings {
    pub quote_token: Address,
    pub slippage_bps: u32,
    pub deadline_secs: u64,
}

impl TradeSettings {
    pub fn from_chain(chain: &Chain) -> Result<Self, ChainError> {
        let quote_token = chain
            .quote_token
            .parse()
            .map_err(|e| ChainError::Config(format!("quote_token: {e}")))?;
        Ok(Self {
            quote_token,
            slippage_bps: chain.slippage_bps,
            deadline_secs: chain.deadline_secs,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuyRequest {
    pub token_name: String,
    pub token_address: Address,
}

#[derive(Debug, Clone)]
pub struct SellRequest {
    pub token_address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeReceipt {
    pub tx_hash: TxHash,
    pub swap: Swap,
    /// Quote-token price of one asset unit after a buy
    pub price_bought: Option<Decimal>,
}

/// Publishes each stage to the status hub as the flow moves through it.
struct Flow<'a> {
    side: &'static str,
    status: &'a StatusHub,
}

impl<'a> Flow<'a> {
    fn new(side: &'static str, status: &'a StatusHub) -> Self {
        status.set_stage(FlowStage::Idle);
        Self { side, status }
    }

    fn enter(&self, stage: FlowStage) {
        tracing::debug!(side = self.side, %stage, "trade step");
        self.status.set_stage(stage);
    }

    async fn step<T, F>(&self, stage: FlowStage, call: F) -> Result<T, TradeError>
    where
        F: Future<Output = Result<T, ChainError>>,
    {
        self.enter(stage);
        call.await.map_err(|source| {
            tracing::error!(side = self.side, %stage, error = %source, "trade step failed");
            self.status.set_stage(FlowStage::Failed);
            TradeError::Step { stage, source }
        })
    }

    fn abort(&self, err: TradeError) -> TradeError {
        self.status.set_stage(FlowStage::Failed);
        err
    }

    fn finish(&self, hash: TxHash) {
        self.status.set_stage(FlowStage::Done);
        tracing::info!(side = self.side, tx = %hash, "trade confirmed");
    }
}

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// `amounts[0] / amounts[1]` of a quote, in ether units.
pub fn quote_price(amounts: &[U256]) -> Option<Decimal> {
    let [paid, got, ..] = amounts else {
        return None;
    };
    let paid = Decimal::from_str(&format_ether(*paid)).ok()?;
    let got = Decimal::from_str(&format_ether(*got)).ok()?;
    paid.checked_div(got).map(|p| p.normalize())
}

fn second_amount(amounts: &[U256]) -> Result<U256, ChainError> {
    amounts
        .get(1)
        .copied()
        .ok_or_else(|| ChainError::Rpc(format!("router returned {} amounts", amounts.len())))
}

/// Buy `req.token_address` with the contract's whole quote-token deposit.
pub async fn run_buy<B: TradingBot + ?Sized>(
    bot: &B,
    settings: &TradeSettings,
    status: &StatusHub,
    req: &BuyRequest,
) -> Result<TradeReceipt, TradeError> {
    let flow = Flow::new("buy", status);
    let asset = req.token_address;
    let quote = settings.quote_token;
    status.set_token_address(asset.to_string());

    let account = flow.step(FlowStage::WalletConnect, bot.connect()).await?;
    tracing::info!(%account, token = %req.token_name, %asset, "starting buy");

    let count = flow
        .step(FlowStage::CheckAllowedAsset, bot.allowed_token_count())
        .await?;
    let mut allowed = false;
    let mut i = U256::ZERO;
    while i < count {
        let token = flow
            .step(FlowStage::CheckAllowedAsset, bot.allowed_token(i))
            .await?;
        if token == asset {
            allowed = true;
            break;
        }
        i += U256::from(1u8);
    }

    if !allowed {
        tracing::info!(token = %req.token_name, "asset not allowed yet, adding");
        let tx = flow
            .step(FlowStage::AddAsset, bot.add_asset(&req.token_name, asset))
            .await?;
        flow.step(FlowStage::AddAsset, bot.confirm(tx)).await?;
    }

    let tx = flow.step(FlowStage::ApproveAsset, bot.approve_asset(quote)).await?;
    flow.step(FlowStage::ApproveAsset, bot.confirm(tx)).await?;
    status.set_token_name(req.token_name.clone());

    let balance = flow
        .step(FlowStage::CheckBalance, bot.deposit_balance(quote))
        .await?;
    status.set_user_balance(format_ether(balance));
    if balance.is_zero() {
        tracing::warn!(token = %quote, "empty deposit balance, aborting buy");
        return Err(flow.abort(TradeError::EmptyBalance { token: quote }));
    }

    let path = vec![quote, asset];
    let amounts = flow
        .step(FlowStage::QuotePrice, bot.amounts_out(balance, path.clone()))
        .await?;
    let expected = flow
        .step(FlowStage::QuotePrice, async { second_amount(&amounts) })
        .await?;

    flow.enter(FlowStage::ComputeSlippage);
    let swap = Swap {
        token_in: quote,
        amount_in: balance,
        token_out: asset,
        min_out: apply_slippage(expected, settings.slippage_bps),
        deadline: deadline(now_unix(), settings.deadline_secs),
    };
    tracing::debug!(?swap, %expected, "buy swap");

    let tx = flow.step(FlowStage::SubmitSwap, bot.submit_buy(&swap)).await?;
    let hash = flow.step(FlowStage::AwaitConfirmation, bot.confirm(tx)).await?;
    status.set_tx_hash(hash.to_string());
    flow.finish(hash);

    // The trade already went through; a failed follow-up quote only leaves
    // the price unset.
    let one = U256::from(10u64).pow(U256::from(18u64));
    let price_bought = match bot.amounts_out(one, path).await {
        Ok(amounts) => quote_price(&amounts),
        Err(e) => {
            tracing::warn!(error = %e, "post-trade quote failed");
            None
        }
    };
    if let Some(price) = price_bought {
        status.set_price_bought(price);
    }

    Ok(TradeReceipt {
        tx_hash: hash,
        swap,
        price_bought,
    })
}

/// Sell the contract's whole balance of `req.token_address` for the quote token.
pub async fn run_sell<B: TradingBot + ?Sized>(
    bot: &B,
    settings: &TradeSettings,
    status: &StatusHub,
    req: &SellRequest,
) -> Result<TradeReceipt, TradeError> {
    let flow = Flow::new("sell", status);
    let asset = req.token_address;
    let quote = settings.quote_token;
    status.set_token_address(asset.to_string());

    let account = flow.step(FlowStage::WalletConnect, bot.connect()).await?;
    tracing::info!(%account, %asset, "starting sell");

    let balance = flow
        .step(FlowStage::CheckBalance, bot.token_balance(asset))
        .await?;
    if balance.is_zero() {
        tracing::warn!(token = %asset, "no tokens held by the contract, aborting sell");
        return Err(flow.abort(TradeError::EmptyBalance { token: asset }));
    }

    let tx = flow.step(FlowStage::ApproveAsset, bot.approve_asset(asset)).await?;
    flow.step(FlowStage::ApproveAsset, bot.confirm(tx)).await?;

    let amounts = flow
        .step(FlowStage::QuotePrice, bot.amounts_out(balance, vec![asset, quote]))
        .await?;
    let expected = flow
        .step(FlowStage::QuotePrice, async { second_amount(&amounts) })
        .await?;

    flow.enter(FlowStage::ComputeSlippage);
    let swap = Swap {
        token_in: asset,
        amount_in: balance,
        token_out: quote,
        min_out: apply_slippage(expected, settings.slippage_bps),
        deadline: deadline(now_unix(), settings.deadline_secs),
    };
    tracing::debug!(?swap, %expected, "sell swap");

    let tx = flow.step(FlowStage::SubmitSwap, bot.submit_sell(&swap)).await?;
    let hash = flow.step(FlowStage::AwaitConfirmation, bot.confirm(tx)).await?;
    status.set_tx_hash(hash.to_string());
    flow.finish(hash);

    Ok(TradeReceipt {
        tx_hash: hash,
        swap,
        price_bought: None,
    })
}
