//! Shared primitives for Specflow.
//!
//! Every other crate in the workspace speaks in terms of these types:
//! opaque actor references supplied by the host, the ordered [`Priority`]
//! scale, and the [`Clock`] abstraction that keeps the lifecycle engine
//! deterministic under test.

pub mod actor;
pub mod clock;
pub mod error;
pub mod priority;

pub use actor::ActorRef;
pub use clock::{format_timestamp, Clock, ManualClock, SystemClock, Timestamp};
pub use error::CoreError;
pub use priority::Priority;
