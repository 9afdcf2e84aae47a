//! Field glossary shown on the dashboard.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub field: &'static str,
    pub definition: &'static str,
}

pub static GLOSSARY: &[GlossaryEntry] = &[
    entry("DELIVERY_ID", "ID of Order/Delivery."),
    entry("CREATED_AT", "Timestamp for order creation."),
    entry("CONSUMER_ID", "ID of consumer account."),
    entry("GOV", "Gross Order Value in cents; includes items subtotal, fees, taxes, tip."),
    entry(
        "CX_AGE_ON_DELIVERY_BASED_ON_FIRST_ORDER",
        "Consumer age in days at this delivery, since first order date.",
    ),
    entry("PLATFORM", "Platform used at checkout (iOS/Android/Web)."),
    entry("RECEIVED_CHARGEBACK", "Whether the delivery received a chargeback."),
    entry(
        "IS_FRAUDULENT_CHARGEBACK",
        "True if chargeback reason ∈ {'fraudulent','unrecognized','general'} per issuer.",
    ),
    entry(
        "CHARGEBACK_COST",
        "Potential chargeback cost in cents (txn amount + processor fee; goes to 0 if win).",
    ),
    entry("CX_DEVICE_ORDER_NUM", "Sequence number of orders by this consumer on this device."),
    entry("CX_ADDRESS_ORDER_NUM", "Sequence number of orders by this consumer to this address."),
    entry(
        "CX_CARD_ORDER_NUM",
        "Sequence number of orders by this consumer using this card fingerprint.",
    ),
    entry("CX_ORDER_NUM", "Sequence number of orders by this consumer (overall)."),
    entry(
        "CX_UNIQUE_ADDRESSES",
        "Total unique addresses this consumer has ever used (to date).",
    ),
    entry(
        "UNIQUE_ADDRESS_PAST_1DAY",
        "Unique addresses used in last 24 hours from this order's creation.",
    ),
    entry(
        "UNIQUE_ADDRESS_PAST_7DAY",
        "Unique addresses used in last 7×24 hours from this order's creation.",
    ),
    entry("SIFT_CREATE_ORDER_PA_SCORE", "Sift score for this order creation event."),
    entry("FAIL_CHARGES_1HR", "Failed charge attempts in the hour before order."),
    entry("FAIL_CHARGES_1D", "Failed charge attempts in the day before order."),
    entry("FAIL_CHARGES_7D", "Failed charge attempts in the 7 days before order."),
    entry("DEVICE_DELIVERIES", "Total deliveries placed by this device (to date)."),
    entry(
        "DEVICE_PCT_CHARGEBACK",
        "% of this device's deliveries that received chargebacks.",
    ),
    entry("CCR_PAST_DELIVERIES", "Consumer's total deliveries prior to this one."),
    entry("CCR_CHARGEBACK_DELIVERIES", "Consumer's total prior chargebacks."),
    entry(
        "CX_PCT_CHARGEBACK",
        "Consumer chargeback rate = CCR_CHARGEBACK_DELIVERIES / CCR_PAST_DELIVERIES.",
    ),
];

const fn entry(field: &'static str, definition: &'static str) -> GlossaryEntry {
    GlossaryEntry { field, definition }
}

/// Definition of a field, exact name match.
pub fn lookup(field: &str) -> Option<&'static GlossaryEntry> {
    GLOSSARY.iter().find(|e| e.field == field)
}
