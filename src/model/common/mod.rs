pub mod election;
pub mod report;
