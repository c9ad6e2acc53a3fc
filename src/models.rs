pub mod recurrence;
pub mod store;
pub mod task;
