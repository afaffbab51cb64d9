pub mod order;
pub mod dashboard;
