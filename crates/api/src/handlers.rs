pub mod applications;
pub mod slots;
