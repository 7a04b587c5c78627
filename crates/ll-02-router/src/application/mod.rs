//! Application layer: router orchestration.

pub mod service;
