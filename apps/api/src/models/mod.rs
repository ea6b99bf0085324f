pub mod client;
pub mod cv;
pub mod job;
pub mod shortlist;
pub mod user;
