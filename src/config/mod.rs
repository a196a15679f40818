//! Configuration module.
//!
//! This module provides functionality for loading the persistent
//! settings file and the optional probe exclusion list.

pub mod loader;

pub use loader::{ConfigLoader, Settings};
