#![allow(clippy::unwrap_used, clippy::expect_used)]

#[path = "suite/mod.rs"]
mod suite;
