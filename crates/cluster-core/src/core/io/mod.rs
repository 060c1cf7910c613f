//! Reading site layouts and writing simulation results.

pub mod layout;
