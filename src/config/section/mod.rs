//! Configuration section definitions.
//!
//! Each submodule defines one top-level `wiki.toml` table.

mod media;
mod render;
mod routes;
mod storage;
mod toolchain;

pub use media::MediaConfig;
pub use render::RenderConfig;
pub use routes::RoutesConfig;
pub use storage::StorageConfig;
pub use toolchain::ToolchainConfig;
