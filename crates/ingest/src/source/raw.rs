//! Wire shape of the upstream execution feed.
//!
//! Only the fields the mapper reads, plus a few kept for diagnostics, are
//! modeled. Unknown fields are ignored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Response envelope: `{"executions": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExecutionBatch {
    #[serde(default)]
    pub executions: Vec<RawExecution>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecution {
    pub trade_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub execution_state: Option<String>,
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub session_id: Option<String>,
    pub way: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub order_id: Option<String>,
    #[serde(default, with = "wire_time")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, with = "wire_time")]
    pub event_timestamp: Option<NaiveDateTime>,
    pub portfolio_id: Option<String>,
    pub mic: Option<String>,
    pub currency_id: Option<String>,
    pub market_trade_id: Option<String>,
    pub trade_type: Option<String>,
    pub version: Option<i32>,
}

/// Upstream times are `yyyy-MM-ddTHH:mm:ss.SSS±hh:mm`. The wall-clock part
/// is kept as-is and the offset dropped.
mod wire_time {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(WRITE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(text) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Some(dt.naive_local()));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("unrecognized timestamp '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn offset_is_dropped_and_wall_clock_kept() {
        let json = r#"{"executions":[{"tradeId":"T1","timestamp":"2025-01-01T09:30:00.000+01:00","type":"CASH_EXECUTTION","quantity":12.7,"hedgeRatio":1}]}"#;
        let batch: RawExecutionBatch = serde_json::from_str(json).unwrap();
        let exec = &batch.executions[0];
        assert_eq!(exec.trade_id.as_deref(), Some("T1"));
        assert_eq!(exec.kind.as_deref(), Some("CASH_EXECUTTION"));
        assert_eq!(
            exec.timestamp,
            Some(
                NaiveDate::from_ymd_opt(2025, 1, 1)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(exec.event_timestamp, None);
    }

    #[test]
    fn accepts_zulu_and_offsetless_times() {
        let z: RawExecution = serde_json::from_str(r#"{"timestamp":"2025-01-01T09:30:00Z"}"#).unwrap();
        let naive: RawExecution =
            serde_json::from_str(r#"{"timestamp":"2025-01-01T09:30:00.250"}"#).unwrap();
        assert!(z.timestamp.is_some());
        assert!(naive.timestamp.is_some());
    }

    #[test]
    fn rejects_garbage_time() {
        let res: Result<RawExecution, _> = serde_json::from_str(r#"{"timestamp":"yesterday"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn missing_envelope_field_is_empty() {
        let batch: RawExecutionBatch = serde_json::from_str("{}").unwrap();
        assert!(batch.executions.is_empty());
    }
}
