use crate::domain::model::{AllocationRequest, AllocationResult, GroupMember, TaxMode};
use crate::domain::ports::MembershipDirectory;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::{
    validate_group_id, validate_non_empty_string, validate_non_negative, validate_range, Validate,
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Splits itemized receipt costs, tax and shared items between group members.
///
/// Tax is always truncated toward zero, never rounded, and computed per
/// member on that member's own direct-cost subtotal. Whether tax is added
/// at all is decided by [`TaxMode`]; with [`TaxMode::Infer`] the engine
/// folds tax in only when direct costs, per-member tax and taxed shared
/// items sum exactly to the request's total.
pub struct AllocationEngine<D: MembershipDirectory> {
    directory: D,
}

impl<D: MembershipDirectory> AllocationEngine<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub async fn allocate(&self, request: &AllocationRequest) -> Result<AllocationResult> {
        request.validate()?;

        let tax_fraction = request.tax_percentage / Decimal::ONE_HUNDRED;

        let mut totals: IndexMap<String, Decimal> = IndexMap::new();
        for entry in &request.member_costs {
            let subtotal = totals.entry(entry.member_id.clone()).or_insert(Decimal::ZERO);
            *subtotal = checked_add("member_costs", *subtotal, entry.cost)?;
        }

        let member_tax = totals
            .iter()
            .map(|(member_id, subtotal)| {
                Ok((member_id.clone(), truncated_tax(*subtotal, tax_fraction)?))
            })
            .collect::<Result<Vec<(String, Decimal)>>>()?;

        let fold_tax = match request.tax_mode {
            TaxMode::Fold => true,
            TaxMode::Included => false,
            TaxMode::Infer => {
                let direct = checked_sum("member_costs", totals.values().copied())?;
                let tax = checked_sum("tax", member_tax.iter().map(|(_, tax)| *tax))?;
                let mut shared = Decimal::ZERO;
                for amount in &request.shared_items {
                    let taxed = checked_add(
                        "shared_items",
                        *amount,
                        truncated_tax(*amount, tax_fraction)?,
                    )?;
                    shared = checked_add("shared_items", shared, taxed)?;
                }
                let grand_sum = checked_sum("total_amount", [direct, tax, shared])?;

                tracing::debug!(
                    "Reconciliation for group {}: direct {} + tax {} + shared {} = {} vs total {}",
                    request.group_id,
                    direct,
                    tax,
                    shared,
                    grand_sum,
                    request.total_amount
                );
                grand_sum == request.total_amount
            }
        };
        tracing::debug!("Folding tax into member totals: {}", fold_tax);

        if fold_tax {
            for (member_id, tax) in &member_tax {
                if let Some(total) = totals.get_mut(member_id) {
                    *total = checked_add("tax", *total, *tax)?;
                }
            }
        }

        if !request.shared_items.is_empty() {
            let members = self.group_members(&request.group_id).await?;
            let member_count = Decimal::from(members.len());

            for shared in &request.shared_items {
                let portion = *shared / member_count;
                let portion_tax = if fold_tax {
                    truncated_tax(portion, tax_fraction)?
                } else {
                    Decimal::ZERO
                };
                let share = checked_add("shared_items", portion, portion_tax)?;

                for member in &members {
                    let total = totals.entry(member.id.clone()).or_insert(Decimal::ZERO);
                    *total = checked_add("shared_items", *total, share)?;
                }
            }
        }

        Ok(AllocationResult::from_amounts(totals))
    }

    async fn group_members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        let members = self
            .directory
            .members(group_id)
            .await
            .map_err(|e| {
                if matches!(
                    &e,
                    SplitError::DependencyUnavailable { dependency, .. } if dependency == "membership"
                ) {
                    return e;
                }
                SplitError::dependency(
                    "membership",
                    format!("lookup for group {} failed: {}", group_id, e),
                )
            })?;

        if members.is_empty() {
            tracing::warn!("Group {} has no members to split shared items with", group_id);
            return Err(SplitError::dependency(
                "membership",
                format!("group {} has no members to split shared items with", group_id),
            ));
        }

        tracing::debug!("Splitting shared items across {} members", members.len());
        Ok(members)
    }
}

/// `amount * fraction`, truncated toward zero.
pub fn truncated_tax(amount: Decimal, fraction: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(fraction)
        .map(|tax| tax.trunc())
        .ok_or_else(|| overflow("tax", amount))
}

fn checked_add(field: &str, left: Decimal, right: Decimal) -> Result<Decimal> {
    left.checked_add(right).ok_or_else(|| overflow(field, right))
}

fn checked_sum(field: &str, values: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| checked_add(field, acc, value))
}

fn overflow(field: &str, value: Decimal) -> SplitError {
    SplitError::invalid_input(field, value, "Amount is too large to allocate exactly")
}

impl Validate for AllocationRequest {
    fn validate(&self) -> Result<()> {
        validate_group_id("group_id", &self.group_id)?;
        validate_range(
            "tax_percentage",
            self.tax_percentage,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        )?;
        validate_non_negative("total_amount", self.total_amount)?;

        for (index, entry) in self.member_costs.iter().enumerate() {
            validate_non_empty_string(&format!("member_costs[{}].member_id", index), &entry.member_id)?;
            validate_non_negative(
                &format!("member_costs[{}].cost ({})", index, entry.member_id),
                entry.cost,
            )?;
        }

        for (index, amount) in self.shared_items.iter().enumerate() {
            validate_non_negative(&format!("shared_items[{}]", index), *amount)?;
        }

        Ok(())
    }
}
