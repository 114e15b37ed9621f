use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Signal as published by the remote signal service.
/// Read-only: the pipeline only adds derived display fields on top.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signal {
    #[serde(rename = "pairName", default, deserialize_with = "lenient::string")]
    pub pair_name: String,

    #[serde(default)]
    pub signal: SignalKind,

    #[serde(rename = "currentPrice", default, deserialize_with = "lenient::opt_string")]
    pub current_price: Option<String>,

    #[serde(rename = "predictedTime", default, deserialize_with = "lenient::opt_string")]
    pub predicted_time: Option<String>,

    #[serde(rename = "expiryTime", default, deserialize_with = "lenient::opt_string")]
    pub expiry_time: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub target_diff_percent: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub now_diff_percent: Option<String>,

    #[serde(default)]
    pub hit_status: HitStatus,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hit_time: Option<String>,

    #[serde(rename = "pairAddress", default, deserialize_with = "lenient::opt_string")]
    pub pair_address: Option<String>,

    // Upstream key is misspelled.
    #[serde(rename = "currentPriceAtPredicition", default, deserialize_with = "lenient::opt_f64")]
    pub price_at_prediction: Option<f64>,

    #[serde(rename = "combinedPrediction", default, deserialize_with = "lenient::opt_f64")]
    pub combined_prediction: Option<f64>,

    #[serde(rename = "tpPercentage", default, deserialize_with = "lenient::opt_f64")]
    pub tp_percentage: Option<f64>,

    #[serde(rename = "slPercentage", default, deserialize_with = "lenient::opt_f64")]
    pub sl_percentage: Option<f64>,

    #[serde(rename = "riskRewardRatio", default, deserialize_with = "lenient::opt_f64")]
    pub risk_reward_ratio: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SignalKind {
    Buy,
    Hold,
    Sell,
    Error,
    /// Anything else the service emits. Sorts after the known kinds.
    Other(String),
    #[default]
    Missing,
}

impl SignalKind {
    /// Display priority: lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Buy => 1,
            Self::Hold => 2,
            Self::Sell => 3,
            Self::Error => 4,
            Self::Other(_) | Self::Missing => 99,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
            Self::Error => "Error",
            Self::Other(s) => s,
            Self::Missing => "",
        }
    }
}

impl From<&str> for SignalKind {
    fn from(s: &str) -> Self {
        // Service uses exact casing; anything else is treated as unknown.
        match s {
            "Buy" => Self::Buy,
            "Hold" => Self::Hold,
            "Sell" => Self::Sell,
            "Error" => Self::Error,
            "" => Self::Missing,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SignalKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = lenient::opt_string(d)?;
        Ok(raw.as_deref().map(SignalKind::from).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HitStatus {
    Reached,
    NotReached,
    Other(String),
    /// Absent or blank upstream; shown as not reached
    #[default]
    Missing,
}

impl HitStatus {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Reached => "Reached",
            Self::NotReached | Self::Missing => "Not Reached",
            Self::Other(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for HitStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = lenient::opt_string(d)?.unwrap_or_default();
        Ok(match raw.to_lowercase().as_str() {
            "reached" => Self::Reached,
            "" => Self::Missing,
            "not reached" => Self::NotReached,
            _ => Self::Other(raw),
        })
    }
}

/// Upstream fields flip between strings, numbers and null.
pub(crate) mod lenient {
    use super::*;

    fn value_to_string(v: Value) -> Option<String> {
        match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.and_then(value_to_string))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_string(d)?.unwrap_or_default())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let raw = r#"{
            "pairName": "CAKE/USDT",
            "signal": "Buy",
            "currentPrice": 2.3456,
            "predictedTime": "2024.01.15 10:00:00",
            "expiryTime": "2024.01.15 11:00:00",
            "target_diff_percent": "-0.42%",
            "now_diff_percent": "1.10%",
            "hit_status": "Not Reached",
            "hit_time": "Not Reached",
            "pairAddress": "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82",
            "currentPriceAtPredicition": "2.31",
            "tpPercentage": 1.36,
            "direction": "UP"
        }"#;
        let s: Signal = serde_json::from_str(raw).unwrap();

        assert_eq!(s.pair_name, "CAKE/USDT");
        assert_eq!(s.signal, SignalKind::Buy);
        assert_eq!(s.current_price.as_deref(), Some("2.3456"));
        assert_eq!(s.hit_status, HitStatus::NotReached);
        assert_eq!(s.price_at_prediction, Some(2.31));
        assert_eq!(s.tp_percentage, Some(1.36));
        assert_eq!(s.sl_percentage, None);
    }

    #[test]
    fn test_unknown_and_missing_signal() {
        let s: Signal = serde_json::from_str(r#"{"pairName": "X/USDT", "signal": "Exit"}"#).unwrap();
        assert_eq!(s.signal, SignalKind::Other("Exit".to_string()));
        assert_eq!(s.signal.priority(), 99);

        let s: Signal = serde_json::from_str(r#"{"pairName": "X/USDT", "signal": null}"#).unwrap();
        assert_eq!(s.signal, SignalKind::Missing);
        assert_eq!(s.signal.priority(), 99);
    }

    #[test]
    fn test_priority_order() {
        assert!(SignalKind::Buy.priority() < SignalKind::Hold.priority());
        assert!(SignalKind::Hold.priority() < SignalKind::Sell.priority());
        assert!(SignalKind::Sell.priority() < SignalKind::Error.priority());
        assert!(SignalKind::Error.priority() < SignalKind::from("Neutral").priority());
    }

    #[test]
    fn test_hit_status_variants() {
        let s: Signal = serde_json::from_str(r#"{"hit_status": "Reached"}"#).unwrap();
        assert!(s.hit_status.is_reached());

        let s: Signal = serde_json::from_str(r#"{"hit_status": "Pending"}"#).unwrap();
        assert_eq!(s.hit_status.as_str(), "Pending");

        let s: Signal = serde_json::from_str(r#"{"pairName": "CAKE/USDT"}"#).unwrap();
        assert_eq!(s.hit_status, HitStatus::Missing);
        assert_eq!(s.hit_status.as_str(), "Not Reached");
    }
}
