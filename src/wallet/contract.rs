use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol;
use async_trait::async_trait;
use std::fmt::Display;

use super::flow::{ChainError, FlowStage, Swap, TradeError, TradingBot};
use crate::config::{Chain, PRIVATE_KEY_ENV};

sol! {
    #[sol(rpc)]
    interface IAutomatedTradingBot {
        function getAllowedTokensCount() external view returns (uint256);
        function allowedTokens(uint256 index) external view returns (string memory name, address tokenAddress);
        function addNewAsset(string memory name, address token) external;
        function setAssets(address token) external;
        function getDepositBalance(address token) external view returns (uint256);
        function getTokenBalance(address token) external view returns (uint256);
        function buyASSET(address tokenIn, uint256 amountIn, address tokenOut, uint256 amountOutMin, uint256 deadline) external;
        function sellASSET(address tokenIn, uint256 amountIn, address tokenOut, uint256 amountOutMin, uint256 deadline) external;
    }

    #[sol(rpc)]
    interface IPancakeRouter {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

fn rpc(e: impl Display) -> ChainError {
    ChainError::Rpc(e.to_string())
}

fn parse_address(name: &str, value: &str) -> Result<Address, TradeError> {
    value.parse().map_err(|e| TradeError::Step {
        stage: FlowStage::WalletConnect,
        source: ChainError::Config(format!("{name}: {e}")),
    })
}

/// Trading-bot contract plus router, signing with a local key.
pub struct EvmTradingBot {
    provider: DynProvider,
    account: Address,
    bot: IAutomatedTradingBot::IAutomatedTradingBotInstance<DynProvider>,
    router: IPancakeRouter::IPancakeRouterInstance<DynProvider>,
}

impl EvmTradingBot {
    /// Build a signing provider for `chain`. `private_key` normally comes
    /// from the environment; `None` or blank is `MissingSigner`.
    pub async fn connect(chain: &Chain, private_key: Option<&str>) -> Result<Self, TradeError> {
        let key = private_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(TradeError::MissingSigner(PRIVATE_KEY_ENV))?;
        let signer = key
            .parse::<PrivateKeySigner>()
            .map_err(|e| TradeError::InvalidSigner(e.to_string()))?
            .with_chain_id(Some(chain.chain_id));
        let account = signer.address();

        let contract = parse_address("contract_address", &chain.contract_address)?;
        let router = parse_address("router_address", &chain.router_address)?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&chain.rpc_url)
            .await
            .map_err(|e| TradeError::Step {
                stage: FlowStage::WalletConnect,
                source: rpc(e),
            })?
            .erased();

        tracing::info!(%account, %contract, rpc = %chain.rpc_url, "wallet connected");
        Ok(Self {
            bot: IAutomatedTradingBot::new(contract, provider.clone()),
            router: IPancakeRouter::new(router, provider.clone()),
            provider,
            account,
        })
    }
}

#[async_trait]
impl TradingBot for EvmTradingBot {
    async fn connect(&self) -> Result<Address, ChainError> {
        let chain_id = self.provider.get_chain_id().await.map_err(rpc)?;
        tracing::debug!(chain_id, account = %self.account, "rpc reachable");
        Ok(self.account)
    }

    async fn allowed_token_count(&self) -> Result<U256, ChainError> {
        self.bot.getAllowedTokensCount().call().await.map_err(rpc)
    }

    async fn allowed_token(&self, index: U256) -> Result<Address, ChainError> {
        let token = self.bot.allowedTokens(index).call().await.map_err(rpc)?;
        Ok(token.tokenAddress)
    }

    async fn add_asset(&self, name: &str, token: Address) -> Result<TxHash, ChainError> {
        let pending = self
            .bot
            .addNewAsset(name.to_string(), token)
            .send()
            .await
            .map_err(rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn approve_asset(&self, token: Address) -> Result<TxHash, ChainError> {
        let pending = self.bot.setAssets(token).send().await.map_err(rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn deposit_balance(&self, token: Address) -> Result<U256, ChainError> {
        self.bot.getDepositBalance(token).call().await.map_err(rpc)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, ChainError> {
        self.bot.getTokenBalance(token).call().await.map_err(rpc)
    }

    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>, ChainError> {
        self.router
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(rpc)
    }

    async fn submit_buy(&self, swap: &Swap) -> Result<TxHash, ChainError> {
        let pending = self
            .bot
            .buyASSET(swap.token_in, swap.amount_in, swap.token_out, swap.min_out, swap.deadline)
            .send()
            .await
            .map_err(rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn submit_sell(&self, swap: &Swap) -> Result<TxHash, ChainError> {
        let pending = self
            .bot
            .sellASSET(swap.token_in, swap.amount_in, swap.token_out, swap.min_out, swap.deadline)
            .send()
            .await
            .map_err(rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx: TxHash) -> Result<TxHash, ChainError> {
        tracing::debug!(%tx, "waiting for receipt");
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx)
            .get_receipt()
            .await
            .map_err(rpc)?;
        if !receipt.status() {
            return Err(ChainError::Reverted(tx));
        }
        Ok(receipt.transaction_hash)
    }
}

/// Read-only router access, no signer needed.
pub struct RouterQuoter {
    router: IPancakeRouter::IPancakeRouterInstance<DynProvider>,
}

impl RouterQuoter {
    pub async fn connect(chain: &Chain) -> Result<Self, ChainError> {
        let router: Address = chain
            .router_address
            .parse()
            .map_err(|e| ChainError::Config(format!("router_address: {e}")))?;
        let provider = ProviderBuilder::new()
            .connect(&chain.rpc_url)
            .await
            .map_err(rpc)?
            .erased();
        Ok(Self {
            router: IPancakeRouter::new(router, provider),
        })
    }

    pub async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>, ChainError> {
        self.router
            .getAmountsOut(amount_in, path)
            .call()
            .await
            .map_err(rpc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key() {
        let err = EvmTradingBot::connect(&Chain::default(), None).await.err().unwrap();
        assert!(matches!(err, TradeError::MissingSigner(PRIVATE_KEY_ENV)));

        let err = EvmTradingBot::connect(&Chain::default(), Some("  ")).await.err().unwrap();
        assert!(matches!(err, TradeError::MissingSigner(_)));
    }

    #[tokio::test]
    async fn test_bad_key() {
        let err = EvmTradingBot::connect(&Chain::default(), Some("not-a-key"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TradeError::InvalidSigner(_)));
    }

    #[tokio::test]
    async fn test_bad_contract_address() {
        let chain = Chain {
            contract_address: "0x1234".to_string(),
            ..Chain::default()
        };
        let key = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        let err = EvmTradingBot::connect(&chain, Some(key)).await.err().unwrap();
        assert!(matches!(
            err,
            TradeError::Step {
                stage: FlowStage::WalletConnect,
                source: ChainError::Config(_)
            }
        ));
    }
}
