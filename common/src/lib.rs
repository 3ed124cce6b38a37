//! Shared model for `sweepr`: targets, ports, settings and their errors.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
