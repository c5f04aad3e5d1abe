//! Data models for the Timely application.
//!
//! Field names serialize as camelCase to match the web and mobile clients.

mod bell_schedule;
mod calendar;
mod course;
pub mod datetime;
mod school;
mod user;

pub use bell_schedule::*;
pub use calendar::*;
pub use course::*;
pub use school::*;
pub use user::*;
