pub mod controller;
pub mod shuffle;

pub use controller::AttemptController;
