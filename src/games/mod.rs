//! Game implementations.

pub mod twist;
