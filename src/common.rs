pub mod error;
pub mod periodo;
