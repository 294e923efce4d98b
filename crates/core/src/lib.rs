//! Core business logic for Nightline.

pub mod permission;
pub mod services;

pub use permission::{Actor, Capability};
pub use services::*;
