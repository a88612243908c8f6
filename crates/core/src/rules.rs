//! Pure scheduling rules: duration validation, overlap detection and the
//! per-day suggestion generator. Nothing in here touches a store.

pub mod conflict;
pub mod duration;
pub mod suggestions;
