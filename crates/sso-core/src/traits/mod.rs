//! Core traits defined in `sso-core` and implemented or consumed by other crates.

pub mod clock;

pub use clock::{Clock, SystemClock};
