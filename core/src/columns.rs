//! Source column names and the role each one plays in normalization.
//!
//! RULE: Nothing outside this module spells a column name as a literal.

pub const DELIVERY_ID: &str = "DELIVERY_ID";
pub const CREATED_AT: &str = "CREATED_AT";
pub const CONSUMER_ID: &str = "CONSUMER_ID";
pub const PLATFORM: &str = "PLATFORM";
pub const GOV: &str = "GOV";
pub const RECEIVED_CHARGEBACK: &str = "RECEIVED_CHARGEBACK";
pub const IS_FRAUDULENT_CHARGEBACK: &str = "IS_FRAUDULENT_CHARGEBACK";
pub const CHARGEBACK_COST: &str = "CHARGEBACK_COST";
pub const RISK_SCORE: &str = "SIFT_CREATE_ORDER_PA_SCORE";
pub const FAIL_CHARGES_1HR: &str = "FAIL_CHARGES_1HR";
pub const FAIL_CHARGES_1D: &str = "FAIL_CHARGES_1D";
pub const FAIL_CHARGES_7D: &str = "FAIL_CHARGES_7D";
pub const CX_UNIQUE_ADDRESSES: &str = "CX_UNIQUE_ADDRESSES";
pub const UNIQUE_ADDRESS_PAST_1DAY: &str = "UNIQUE_ADDRESS_PAST_1DAY";
pub const UNIQUE_ADDRESS_PAST_7DAY: &str = "UNIQUE_ADDRESS_PAST_7DAY";

// ── Derived columns ─────────────────────────────────────────────────────────

pub const FRAUD_FLAG: &str = "FRAUD_FLAG";
pub const HOUR: &str = "HOUR";
pub const DOW: &str = "DOW";
pub const GOV_DOLLARS: &str = "GOV_DOLLARS";

/// Columns coerced to numbers whenever they are present.
pub const DECLARED_NUMERIC: &[&str] = &[
    GOV,
    CHARGEBACK_COST,
    RISK_SCORE,
    FAIL_CHARGES_1HR,
    FAIL_CHARGES_1D,
    FAIL_CHARGES_7D,
    "DEVICE_DELIVERIES",
    "DEVICE_PCT_CHARGEBACK",
    "CCR_PAST_DELIVERIES",
    "CCR_CHARGEBACK_DELIVERIES",
    "CX_PCT_CHARGEBACK",
    CX_UNIQUE_ADDRESSES,
    UNIQUE_ADDRESS_PAST_1DAY,
    UNIQUE_ADDRESS_PAST_7DAY,
    "CX_DEVICE_ORDER_NUM",
    "CX_ADDRESS_ORDER_NUM",
    "CX_CARD_ORDER_NUM",
    "CX_ORDER_NUM",
    "CX_AGE_ON_DELIVERY_BASED_ON_FIRST_ORDER",
];

/// Boolean-like columns coerced to 0/1.
pub const DECLARED_FLAGS: &[&str] = &[RECEIVED_CHARGEBACK, IS_FRAUDULENT_CHARGEBACK];

/// Label columns. Never a predictor of themselves or of each other.
pub const LABELS: &[&str] = &[RECEIVED_CHARGEBACK, IS_FRAUDULENT_CHARGEBACK, FRAUD_FLAG];

/// Columns that are never numeric candidates even when every cell parses.
pub const NON_SIGNAL: &[&str] = &[DELIVERY_ID, CONSUMER_ID, CREATED_AT, PLATFORM];

pub fn is_declared_numeric(name: &str) -> bool {
    DECLARED_NUMERIC.contains(&name)
}

pub fn is_label(name: &str) -> bool {
    LABELS.contains(&name)
}

/// Whether an undeclared column may be inferred numeric.
pub fn is_inference_candidate(name: &str) -> bool {
    !is_declared_numeric(name)
        && !DECLARED_FLAGS.contains(&name)
        && !is_label(name)
        && !NON_SIGNAL.contains(&name)
}
