pub mod allocation;
pub mod payload;
pub mod service;
pub mod weights;

pub use crate::domain::model::{AllocationRequest, AllocationResult, WeightSet};
pub use crate::domain::ports::{GroupDirectory, LedgerSink, MembershipDirectory};
pub use crate::utils::error::Result;
