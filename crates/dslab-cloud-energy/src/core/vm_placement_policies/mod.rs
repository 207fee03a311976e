//! Implementations of VM placement policies.

pub mod best_fit;
pub mod first_fit;
pub mod random;
pub mod round_robin;
pub mod simple;
