//! Data models for the urban-planning commission tracker.
//!
//! These models match the frontend TypeScript interfaces exactly for
//! seamless interoperability.

mod admin;
mod backup;
mod commission;
mod detail;

pub use admin::*;
pub use backup::*;
pub use commission::*;
pub use detail::*;
