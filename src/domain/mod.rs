// Domain layer: value types, the ledger payload shape and the ports to external systems.

pub mod model;
pub mod payload;
pub mod ports;
