use crate::domain::model::WeightSet;
use crate::domain::payload::{PayloadItem, PayloadWeight, TransactionPayload};
use crate::utils::error::{Result, SplitError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const DEFAULT_CURRENCY: &str = "JPY";

#[derive(Debug, Clone)]
pub struct TransactionDetails {
    pub purpose: String,
    pub paying_member_id: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub timestamp_ms: i64,
}

/// Builds the ledger expense: the payer covers the whole total and every
/// weighted member shares it.
pub fn assemble_payload(weights: &WeightSet, details: &TransactionDetails) -> TransactionPayload {
    let amount = format_amount(details.total_amount);

    let for_whom = weights
        .entries()
        .iter()
        .filter(|entry| entry.weight > 0)
        .map(|entry| PayloadWeight {
            member_id: entry.member_id.clone(),
            weight: entry.weight.to_string(),
        })
        .collect();

    let mut exchange_rates = BTreeMap::new();
    exchange_rates.insert(details.currency.clone(), "1".to_string());

    TransactionPayload {
        currency_code: details.currency.clone(),
        date_time: details.timestamp_ms,
        exchange_rates,
        fixed_exchange_rate: false,
        items: vec![PayloadItem {
            amount: amount.clone(),
            for_whom,
        }],
        purpose: details.purpose.clone(),
        kind: "expense".to_string(),
        who_paid: vec![PayloadWeight {
            member_id: details.paying_member_id.clone(),
            weight: amount,
        }],
    }
}

/// Plain decimal rendering without trailing zeros, e.g. `1340` or `99.5`.
pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Parses a receipt date into UTC.
///
/// Dates carrying an offset (RFC 3339) are converted through that offset.
/// Naive date-times and bare dates are taken to already be UTC.
pub fn parse_receipt_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(SplitError::invalid_input(
        "receipt_date",
        value,
        "Expected an RFC 3339 timestamp or YYYY-MM-DD[THH:MM:SS]",
    ))
}

/// Epoch milliseconds of the receipt date, or of `now` when there is none.
pub fn timestamp_ms(receipt_date: Option<&str>, now: DateTime<Utc>) -> Result<i64> {
    match receipt_date {
        Some(value) => Ok(parse_receipt_date(value)?.timestamp_millis()),
        None => Ok(now.timestamp_millis()),
    }
}
