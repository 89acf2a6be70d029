//! Utility modules shared across the wiki engine.

pub mod exec;
pub mod fs;
pub mod hash;
pub mod html;
pub mod slug;
