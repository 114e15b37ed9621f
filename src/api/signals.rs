use super::{ApiClient, ApiError};
use crate::signals::Signal;

impl ApiClient {
    /// Fetch the current signal list.
    pub async fn fetch_signals(&self) -> Result<Vec<Signal>, ApiError> {
        let url = self.endpoints().signals_url.clone();
        let signals = self.get_list::<Signal>(&url).await?;
        tracing::info!(count = signals.len(), "fetched signals");
        Ok(signals)
    }
}
