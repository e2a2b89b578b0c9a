//! Time source abstraction.
//!
//! Production code uses [`SystemClock`]; tests inject a [`ManualClock`] to
//! drive cache expiry and order lookback deterministically.

use chrono::{DateTime, Utc};
use std::fmt;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;
