//! Transport-facing side of the router.

pub mod handler;
