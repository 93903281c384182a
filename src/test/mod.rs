//! Shared fixtures for unit tests.
#![allow(dead_code)]


pub use builder::*;
pub use locator::CountingLocator;
