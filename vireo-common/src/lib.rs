//! # Vireo Common Library
//!
//! Shared code for the Vireo session service:
//! - Database models and queries (servers, users)
//! - Preference document store (current server/user pointers)
//! - Configuration loading and root folder resolution
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod prefs;
pub mod uuid_utils;

pub use error::{Error, Result};
