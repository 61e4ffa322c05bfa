// Wire shape of a ledger expense. Field names follow the ledger's JSON API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub currency_code: String,
    /// Epoch milliseconds, UTC.
    pub date_time: i64,
    pub exchange_rates: BTreeMap<String, String>,
    pub fixed_exchange_rate: bool,
    pub items: Vec<PayloadItem>,
    pub purpose: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub who_paid: Vec<PayloadWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadItem {
    pub amount: String,
    pub for_whom: Vec<PayloadWeight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadWeight {
    pub member_id: String,
    /// Integer or decimal amount rendered as a string.
    pub weight: String,
}
