pub mod application;
pub mod interview_slot;
