//! Data models shared across the workspace.

mod reference;
mod video;

pub use reference::*;
pub use video::*;
