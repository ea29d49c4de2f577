//! HTTP route modules.

pub mod editor;
pub mod front;
mod helpers;
