//! Raw feed record to stored `ExecutionRecord`.
//!
//! Field-for-field compatible with ledgers written by earlier deployments.
//! Anything not listed here stays unset.

use ares_core::{DisplayFields, ExecutionRecord};

use crate::source::RawExecution;

/// Upstream spelling, typo included.
const CASH_EXECUTION_TYPE: &str = "CASH_EXECUTTION";
const REGION: &str = "paris";

pub fn to_record(raw: &RawExecution) -> ExecutionRecord {
    let notional = match (raw.price, raw.quantity) {
        (Some(price), Some(qty)) => Some(price * qty),
        _ => None,
    };

    ExecutionRecord {
        trade_id: raw.trade_id.clone(),
        execution_time: raw.timestamp,
        display: DisplayFields {
            order_id: raw.order_id.clone(),
            isin: None,
            side: raw.way.as_deref().map(side),
            trader: raw.user_id.clone(),
            book: raw.portfolio_id.as_deref().and_then(book),
            status: None,
            instrument: raw.product_id.clone(),
            region: Some(REGION.to_string()),
            quantity: raw.quantity.map(|q| q.trunc() as i64),
            price: raw.price,
            notional,
            currency: raw.currency_id.clone(),
            instrument_type: raw.kind.as_deref().and_then(instrument_type),
            mic: raw.mic.clone(),
        },
    }
}

pub fn to_records(raw: &[RawExecution]) -> Vec<ExecutionRecord> {
    raw.iter().map(to_record).collect()
}

fn side(way: &str) -> String {
    let way = way.trim().to_uppercase();
    match way.as_str() {
        "B" => "BUY".to_string(),
        "S" => "SELL".to_string(),
        _ => way,
    }
}

/// Right-hand side of the first `-` in the portfolio id.
fn book(portfolio: &str) -> Option<String> {
    portfolio.split_once('-').map(|(_, book)| book.to_string())
}

fn instrument_type(kind: &str) -> Option<String> {
    let normalized = kind.trim().to_uppercase().replace('-', "_");
    (normalized == CASH_EXECUTION_TYPE).then(|| "stock".to_string())
}
