use crate::domain::model::{Group, GroupMember, TransactionReceipt};
use crate::domain::payload::TransactionPayload;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read access to the members of a ledger group.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    async fn members(&self, group_id: &str) -> Result<Vec<GroupMember>>;
}

/// Groups visible to the signed-in ledger account.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn groups(&self) -> Result<Vec<Group>>;
}

/// Records a finished transaction on the remote ledger.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn create_transaction(
        &self,
        group_id: &str,
        payload: &TransactionPayload,
    ) -> Result<TransactionReceipt>;
}

#[async_trait]
impl<T: MembershipDirectory + ?Sized> MembershipDirectory for std::sync::Arc<T> {
    async fn members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        (**self).members(group_id).await
    }
}

#[async_trait]
impl<T: LedgerSink + ?Sized> LedgerSink for std::sync::Arc<T> {
    async fn create_transaction(
        &self,
        group_id: &str,
        payload: &TransactionPayload,
    ) -> Result<TransactionReceipt> {
        (**self).create_transaction(group_id, payload).await
    }
}
