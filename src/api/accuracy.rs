use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::signals::lenient;

/// Rolling accuracy of the signal model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccuracyStats {
    #[serde(rename = "pastAccuracy", default, deserialize_with = "lenient::opt_string")]
    pub past_accuracy: Option<String>,

    #[serde(rename = "currentAccuracy", default, deserialize_with = "lenient::opt_string")]
    pub current_accuracy: Option<String>,
}

impl AccuracyStats {
    /// Past accuracy is hidden while the service reports it as `N/A`.
    pub fn past_visible(&self) -> Option<&str> {
        self.past_accuracy
            .as_deref()
            .filter(|p| !p.contains("N/A"))
    }

    pub fn line(&self) -> String {
        let current = self.current_accuracy.as_deref().unwrap_or("N/A");
        match self.past_visible() {
            Some(past) => format!("Past Accuracy: {past} | Present Accuracy: {current}"),
            None => format!("Present Accuracy: {current}"),
        }
    }
}

impl ApiClient {
    pub async fn fetch_accuracy(&self) -> Result<AccuracyStats, ApiError> {
        let url = self.endpoints().accuracy_url.clone();
        let value = self.get_json(&url).await?;
        serde_json::from_value(value).map_err(|source| ApiError::Decode { url, source })
    }
}
