pub mod analyze;
pub mod top;
