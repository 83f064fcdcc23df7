//! Breakwater - access-evaluation service for an object-storage console
//!
//! This library provides the core functionality for the Breakwater console
//! access service. It exposes all modules for testing purposes.

pub mod access;
pub mod errors;
pub mod jobs;
pub mod session;
pub mod settings;
pub mod web;
