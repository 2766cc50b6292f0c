use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Logical upstream a ledger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// Test feed generated in-process.
    MockApi,
    /// Live execution feed.
    RealApi,
}

impl SourceTag {
    pub const ALL: [SourceTag; 2] = [SourceTag::MockApi, SourceTag::RealApi];

    /// Stable key segment; existing stored data uses these names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::MockApi => "mock-api",
            SourceTag::RealApi => "real-api",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business attributes shown in the front-end table. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notional: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mic: Option<String>,
}

/// The unit stored in a ledger and served to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Source-assigned identifier used for deduplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_id: Option<String>,
    #[serde(
        default,
        with = "crate::timestamp::option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_time: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub display: DisplayFields,
}

impl ExecutionRecord {
    /// Natural key, or `None` when absent or blank. Blank keys never dedup.
    pub fn natural_key(&self) -> Option<&str> {
        self.trade_id
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Inclusive lower-bound test on event time. Records without one never match.
    pub fn is_at_or_after(&self, start: &NaiveDateTime) -> bool {
        self.execution_time
            .as_ref()
            .map(|t| t >= start)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp;

    fn record(key: Option<&str>, time: Option<&str>) -> ExecutionRecord {
        ExecutionRecord {
            trade_id: key.map(str::to_string),
            execution_time: time.map(|t| timestamp::parse(t).unwrap()),
            display: DisplayFields::default(),
        }
    }

    #[test]
    fn blank_natural_key_is_none() {
        assert_eq!(record(Some("T1"), None).natural_key(), Some("T1"));
        assert_eq!(record(Some(""), None).natural_key(), None);
        assert_eq!(record(Some("   "), None).natural_key(), None);
        assert_eq!(record(None, None).natural_key(), None);
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let start = timestamp::parse("2025-01-01 00:00:00").unwrap();
        assert!(record(None, Some("2025-01-01 00:00:00")).is_at_or_after(&start));
        assert!(record(None, Some("2025-01-02 10:00:00")).is_at_or_after(&start));
        assert!(!record(None, Some("2024-12-31 23:59:59")).is_at_or_after(&start));
        assert!(!record(None, None).is_at_or_after(&start));
    }

    #[test]
    fn json_shape_matches_stored_layout() {
        let mut rec = record(Some("4567-ms87654"), Some("2025-01-01 09:00:00"));
        rec.display.side = Some("BUY".into());
        rec.display.quantity = Some(10);

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["tradeId"], "4567-ms87654");
        assert_eq!(json["executionTime"], "2025-01-01 09:00:00");
        assert_eq!(json["side"], "BUY");
        assert_eq!(json["quantity"], 10);
        // absent fields are omitted, not null
        assert!(json.get("isin").is_none());
    }

    #[test]
    fn decodes_records_written_by_older_writers() {
        let raw = r#"{"tradeId":"A","executionTime":"2025-01-01T09:00:00","instrumentType":"stock","unknownField":1}"#;
        let rec: ExecutionRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.natural_key(), Some("A"));
        assert_eq!(rec.display.instrument_type.as_deref(), Some("stock"));
        assert_eq!(
            rec.execution_time,
            Some(timestamp::parse("2025-01-01 09:00:00").unwrap())
        );
    }

    #[test]
    fn source_tag_key_segments() {
        assert_eq!(SourceTag::MockApi.as_str(), "mock-api");
        assert_eq!(SourceTag::RealApi.to_string(), "real-api");
    }
}
