//! Pure domain logic, kept free of HTTP and storage concerns.

pub mod csv;
pub mod dates;
pub mod generator;
pub mod merge;
pub mod stats;
