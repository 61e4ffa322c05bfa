// Adapters layer: concrete implementations of the domain ports.

pub mod cache;
pub mod items;
pub mod settle_up;

pub use cache::TtlCache;
pub use settle_up::{SettleUpCaches, SettleUpClient, Session};
