//! # SlotBook core
//!
//! Domain model and scheduling rules for examiner interview slots.
//!
//! - [`models`]: slots, applications, request and response payloads
//! - [`rules`]: duration validation, overlap detection, day suggestions
//! - [`store`]: the unit-of-work traits every persistence backend implements
//! - [`memory`]: an in-process store
//! - [`scheduler`]: the service that ties rules and store together

pub mod errors;
pub mod memory;
pub mod models;
pub mod rules;
pub mod scheduler;
pub mod store;

pub use errors::{SchedulingError, SchedulingResult};
pub use scheduler::Scheduler;
