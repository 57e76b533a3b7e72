pub mod job;
pub mod ranking;
pub mod resume;
