//! Synthetic executions for the demo table.

use ares_core::{DisplayFields, ExecutionRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;

type Weighted = &'static [(&'static str, f64)];

const STATUSES: Weighted = &[
    ("ACK", 0.40),
    ("ANO", 0.25),
    ("TIMEOUT", 0.15),
    ("REJECTED", 0.10),
    ("PENDING", 0.10),
];
const INSTRUMENTS: Weighted = &[
    ("STOCK", 0.50),
    ("FUTURE", 0.20),
    ("OPTION", 0.15),
    ("BOND", 0.10),
    ("FOREX", 0.05),
];
const REGIONS: Weighted = &[
    ("AMERICAS", 0.35),
    ("EUROPE", 0.30),
    ("ASIA", 0.20),
    ("EMEA", 0.10),
    ("ALL", 0.05),
];
const MICS: Weighted = &[
    ("XNAS", 0.40),
    ("XNYS", 0.30),
    ("XPAR", 0.15),
    ("XLON", 0.10),
    ("XTKS", 0.05),
];
const CURRENCIES: Weighted = &[
    ("USD", 0.60),
    ("EUR", 0.20),
    ("GBP", 0.10),
    ("JPY", 0.07),
    ("CHF", 0.03),
];
const SIDES: Weighted = &[("BUY", 0.55), ("SELL", 0.45)];

/// Intraday hour buckets, peaking around the 17:00 close.
const HOUR_BUCKETS: &[(&[u32], f64)] = &[
    (&[17], 0.30),
    (&[16, 18], 0.20),
    (&[15, 19], 0.20),
    (&[13, 14, 20, 21], 0.15),
    (&[9, 10, 11, 12, 22], 0.10),
    (&[0, 1, 2, 3, 4, 5, 6, 7, 8, 23], 0.05),
];

/// Produces demo records. Stateless: all randomness comes from the caller's RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionGenerator;

impl ExecutionGenerator {
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<ExecutionRecord> {
        (0..count).map(|i| self.generate_one(i, rng)).collect()
    }

    pub fn generate_one<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> ExecutionRecord {
        let quantity: i64 = rng.gen_range(50..1000);
        let price: f64 = 10.0 + rng.gen::<f64>() * 500.0;

        ExecutionRecord {
            trade_id: None,
            execution_time: Some(execution_time(rng)),
            display: DisplayFields {
                order_id: Some(format!("ORD{:06}", 100_000 + index)),
                isin: Some(format!("US{:010}", 37_833_100 + index % 15)),
                side: Some(pick(rng, SIDES).to_string()),
                trader: Some(format!("TRADER{}", index % 8 + 1)),
                book: Some(format!("BOOK{}", index % 6 + 1)),
                status: Some(pick(rng, STATUSES).to_string()),
                instrument: Some(pick(rng, INSTRUMENTS).to_string()),
                region: Some(pick(rng, REGIONS).to_string()),
                quantity: Some(quantity),
                price: Some(price),
                notional: Some(price * quantity as f64),
                currency: Some(pick(rng, CURRENCIES).to_string()),
                instrument_type: None,
                mic: Some(pick(rng, MICS).to_string()),
            },
        }
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, table: Weighted) -> &'static str {
    table
        .choose_weighted(rng, |(_, w)| *w)
        .map(|(value, _)| *value)
        .unwrap_or(table[table.len() - 1].0)
}

/// A time on the fixed trade date 2024-12-18.
fn execution_time<R: Rng + ?Sized>(rng: &mut R) -> NaiveDateTime {
    let hours = HOUR_BUCKETS
        .choose_weighted(rng, |(_, w)| *w)
        .map(|(hours, _)| *hours)
        .unwrap_or(&[17]);
    let hour = hours.choose(rng).copied().unwrap_or(17);
    let minute = rng.gen_range(0..60);
    let second = rng.gen_range(0..60);

    NaiveDate::from_ymd_opt(2024, 12, 18)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .unwrap_or_default()
}
