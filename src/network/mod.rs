//! Worker Protocol Boundary
//!
//! Message shapes for the external batch-execution transport. This
//! layer carries no simulation logic of its own — it exists so a host
//! (a batch runner, a tournament worker pool) has a stable wire format
//! to serialize `WorkerCommand`/`WorkerEvent` over, whatever transport
//! it chooses.

pub mod protocol;

pub use protocol::{roster_descriptors, wire_placements, AgentBinary, WireGameResult, WirePlacement, WorkerCommand, WorkerEvent};
