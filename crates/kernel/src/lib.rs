//! Mosaico Kernel Library
//!
//! Page composition: pages own ordered sections, sections own ordered
//! blocks, templates dictate block counts. This library exposes kernel
//! internals for integration testing; the main entry point for running the
//! server is the `mosaico` binary.

pub mod access;
pub mod columns;
pub mod composer;
pub mod config;
pub mod csrf;
pub mod editor;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod layout;
pub mod media;
pub mod models;
pub mod notices;
pub mod ordering;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod theme;

pub use config::Config;
pub use state::AppState;
