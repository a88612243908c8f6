pub mod application;
pub mod fee;
pub mod interview_slot;
pub mod requests;
pub mod time_range;

pub use application::{Application, ApplicationStatus};
pub use fee::FeeValue;
pub use interview_slot::{InterviewSlot, SlotStatus};
pub use time_range::TimeRange;
