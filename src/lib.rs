pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, Command};

pub use adapters::{SettleUpCaches, SettleUpClient, TtlCache};
pub use config::Settings;
pub use core::{
    allocation::AllocationEngine,
    service::{PreparedTransaction, SplitService},
    weights::{WeightNormalizer, WeightScale},
};
pub use domain::model::{
    AllocationRequest, AllocationResult, GroupMember, MemberCostEntry, TaxMode, TransactionRequest,
    WeightSet,
};
pub use utils::error::{Result, SplitError};
