//! Cross-chain integration flows.

pub mod harness;

mod flows;
mod interleavings;
