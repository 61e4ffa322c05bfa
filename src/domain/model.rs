use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One item's cost attributed to a member. A member may appear many times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberCostEntry {
    pub member_id: String,
    pub cost: Decimal,
}

impl MemberCostEntry {
    pub fn new(member_id: impl Into<String>, cost: Decimal) -> Self {
        Self {
            member_id: member_id.into(),
            cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

/// How the engine decides whether per-member tax is added on top of costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Fold tax only when costs plus computed tax equal the stated total exactly.
    #[default]
    Infer,
    /// Always add tax.
    Fold,
    /// Costs already include tax.
    Included,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub member_costs: Vec<MemberCostEntry>,
    /// Percentage, e.g. `10` for 10%.
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub shared_items: Vec<Decimal>,
    pub group_id: String,
    #[serde(default)]
    pub tax_mode: TaxMode,
}

impl AllocationRequest {
    pub fn new(
        member_costs: Vec<MemberCostEntry>,
        tax_percentage: Decimal,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            member_costs,
            tax_percentage,
            total_amount: Decimal::ZERO,
            shared_items: Vec::new(),
            group_id: group_id.into(),
            tax_mode: TaxMode::Infer,
        }
    }

    pub fn with_total(mut self, total_amount: Decimal) -> Self {
        self.total_amount = total_amount;
        self
    }

    pub fn with_shared_items(mut self, shared_items: Vec<Decimal>) -> Self {
        self.shared_items = shared_items;
        self
    }

    pub fn with_tax_mode(mut self, tax_mode: TaxMode) -> Self {
        self.tax_mode = tax_mode;
        self
    }
}

/// Owed amount per member, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationResult {
    amounts: IndexMap<String, Decimal>,
}

impl AllocationResult {
    pub fn from_amounts(amounts: IndexMap<String, Decimal>) -> Self {
        Self { amounts }
    }

    pub fn get(&self, member_id: &str) -> Option<Decimal> {
        self.amounts.get(member_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.amounts.iter().map(|(id, amount)| (id.as_str(), *amount))
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(String::as_str)
    }

    pub fn amounts(&self) -> Vec<Decimal> {
        self.amounts.values().copied().collect()
    }

    pub fn total(&self) -> Decimal {
        self.amounts.values().copied().sum()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWeight {
    pub member_id: String,
    pub weight: u64,
}

/// Integer weights aligned with an [`AllocationResult`], zero weights removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet {
    entries: Vec<MemberWeight>,
}

impl WeightSet {
    /// Zips member ids with weights positionally and drops zero weights.
    pub fn from_aligned<'a>(
        member_ids: impl IntoIterator<Item = &'a str>,
        weights: impl IntoIterator<Item = u64>,
    ) -> Self {
        let entries = member_ids
            .into_iter()
            .zip(weights)
            .filter(|(_, weight)| *weight > 0)
            .map(|(member_id, weight)| MemberWeight {
                member_id: member_id.to_string(),
                weight,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[MemberWeight] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything needed to record one expense on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(flatten)]
    pub allocation: AllocationRequest,
    pub purpose: String,
    pub paying_member_id: String,
    /// RFC 3339 timestamp or a naive `YYYY-MM-DD[THH:MM:SS]` taken as UTC.
    #[serde(default)]
    pub receipt_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Key the ledger assigned to the new transaction.
    pub name: String,
}
