//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use fraudscope_core::loader::RawTable;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const FULL_HEADER: &[&str] = &[
    "DELIVERY_ID",
    "CREATED_AT",
    "CONSUMER_ID",
    "PLATFORM",
    "GOV",
    "RECEIVED_CHARGEBACK",
    "IS_FRAUDULENT_CHARGEBACK",
    "CHARGEBACK_COST",
    "SIFT_CREATE_ORDER_PA_SCORE",
    "FAIL_CHARGES_1D",
    "CX_UNIQUE_ADDRESSES",
    "DEVICE_DELIVERIES",
];

/// Route library logs through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a raw table by hand. Empty strings become missing cells.
pub fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    init_logging();
    let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(|c| (!c.is_empty()).then_some(*c)));
    }
    table
}

/// A deterministic synthetic dataset with every column present and a
/// sprinkling of blanks and garbage cells.
pub fn synthetic(seed: u64, rows: usize) -> RawTable {
    init_logging();
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let platforms = ["ios", "android", "web"];
    let mut table = RawTable::new(FULL_HEADER.iter().map(|h| h.to_string()).collect());

    for i in 0..rows {
        let day = rng.gen_range(1..=28);
        let hour = rng.gen_range(0..24);
        let failed: u32 = if rng.gen_bool(0.2) { rng.gen_range(1..4) } else { 0 };
        let addresses: u32 = rng.gen_range(1..6);
        let risk: f64 = rng.gen_range(0.0..100.0);
        let fraud_odds = 0.02 + 0.05 * f64::from(failed) + 0.01 * f64::from(addresses);
        let fraud = rng.gen_bool(fraud_odds.min(0.9));
        let chargeback = fraud || rng.gen_bool(0.03);

        let cells: Vec<Option<String>> = vec![
            Some(format!("d{i}")),
            (!rng.gen_bool(0.02)).then(|| format!("2024-02-{day:02} {hour:02}:15:00")),
            Some(format!("c{}", rng.gen_range(0..rows.max(1) / 2 + 1))),
            (!rng.gen_bool(0.05)).then(|| platforms[rng.gen_range(0..platforms.len())].to_string()),
            if rng.gen_bool(0.03) {
                Some("n/a".to_string())
            } else {
                Some(rng.gen_range(500..20_000).to_string())
            },
            Some(if chargeback { "true" } else { "false" }.to_string()),
            Some(if fraud { "1" } else { "0" }.to_string()),
            chargeback.then(|| format!("{:.2}", rng.gen_range(5.0..300.0))),
            (!rng.gen_bool(0.05)).then(|| format!("{risk:.1}")),
            Some(failed.to_string()),
            Some(addresses.to_string()),
            Some(rng.gen_range(1..50).to_string()),
        ];
        table.push_row(cells);
    }
    table
}
