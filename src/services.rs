pub mod labels;
pub mod metrics;
pub mod tasks;
pub mod views;
