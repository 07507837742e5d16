//! Request Rate Limiting
//!
//! Fixed-window gate and the counter store behind it.

pub mod gate;
pub mod store;

pub use gate::RateGate;
pub use store::{CounterStore, MemoryCounterStore};
