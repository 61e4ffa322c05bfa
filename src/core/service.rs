use crate::core::allocation::AllocationEngine;
use crate::core::payload::{assemble_payload, timestamp_ms, TransactionDetails, DEFAULT_CURRENCY};
use crate::core::weights::{WeightNormalizer, WeightScale};
use crate::domain::model::{AllocationResult, TransactionReceipt, TransactionRequest, WeightSet};
use crate::domain::payload::TransactionPayload;
use crate::domain::ports::{LedgerSink, MembershipDirectory};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};

/// Result of running a request through allocation, weighting and assembly.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    pub group_id: String,
    pub allocation: AllocationResult,
    pub weights: WeightSet,
    pub payload: TransactionPayload,
}

pub struct SplitService<D: MembershipDirectory, L: LedgerSink> {
    engine: AllocationEngine<D>,
    ledger: L,
    normalizer: WeightNormalizer,
    currency: String,
}

impl<D: MembershipDirectory, L: LedgerSink> SplitService<D, L> {
    pub fn new(directory: D, ledger: L) -> Self {
        Self {
            engine: AllocationEngine::new(directory),
            ledger,
            normalizer: WeightNormalizer::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_scale(mut self, scale: WeightScale) -> Self {
        self.normalizer = WeightNormalizer::new(scale);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub async fn prepare(&self, request: &TransactionRequest) -> Result<PreparedTransaction> {
        self.prepare_at(request, Utc::now()).await
    }

    /// Like [`prepare`](Self::prepare) with an explicit clock for undated receipts.
    pub async fn prepare_at(
        &self,
        request: &TransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<PreparedTransaction> {
        request.validate()?;
        let timestamp_ms = timestamp_ms(request.receipt_date.as_deref(), now)?;

        let allocation = self.engine.allocate(&request.allocation).await?;
        tracing::debug!(
            "Allocated {} across {} members",
            allocation.total(),
            allocation.len()
        );

        let raw_weights = self.normalizer.normalize(&allocation.amounts())?;
        let weights = WeightSet::from_aligned(allocation.member_ids(), raw_weights);
        tracing::debug!(
            "Derived {} non-zero weights ({:?} scale)",
            weights.len(),
            self.normalizer.scale()
        );

        let details = TransactionDetails {
            purpose: request.purpose.clone(),
            paying_member_id: request.paying_member_id.clone(),
            total_amount: request.allocation.total_amount,
            currency: self.currency.clone(),
            timestamp_ms,
        };
        let payload = assemble_payload(&weights, &details);

        Ok(PreparedTransaction {
            group_id: request.allocation.group_id.clone(),
            allocation,
            weights,
            payload,
        })
    }

    pub async fn submit(
        &self,
        request: &TransactionRequest,
    ) -> Result<(PreparedTransaction, TransactionReceipt)> {
        let prepared = self.prepare(request).await?;
        let receipt = self
            .ledger
            .create_transaction(&prepared.group_id, &prepared.payload)
            .await?;

        tracing::info!(
            "Recorded transaction {} in group {} for {} members",
            receipt.name,
            prepared.group_id,
            prepared.weights.len()
        );
        Ok((prepared, receipt))
    }
}

impl Validate for TransactionRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("paying_member_id", &self.paying_member_id)?;
        validate_non_empty_string("purpose", &self.purpose)?;
        self.allocation.validate()
    }
}
