use crate::domain::model::MemberCostEntry;
use crate::utils::error::{Result, SplitError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct ItemRow {
    member_id: String,
    cost: String,
}

/// Reads `member_id,cost` rows. Costs are parsed as exact decimals.
pub fn read_member_costs<R: Read>(reader: R) -> Result<Vec<MemberCostEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut entries = Vec::new();
    for (index, row) in csv_reader.deserialize::<ItemRow>().enumerate() {
        let row = row?;
        let cost = Decimal::from_str(&row.cost).map_err(|e| {
            SplitError::invalid_input(&format!("items row {} cost", index + 1), &row.cost, e.to_string())
        })?;
        entries.push(MemberCostEntry::new(row.member_id, cost));
    }

    tracing::debug!("Read {} item rows", entries.len());
    Ok(entries)
}

pub fn read_member_costs_file<P: AsRef<Path>>(path: P) -> Result<Vec<MemberCostEntry>> {
    let file = std::fs::File::open(path)?;
    read_member_costs(file)
}
