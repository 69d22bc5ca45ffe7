//! Command modules for the solclone CLI

pub mod clone;
pub mod overrides;
pub mod remappings;

pub use clone::{clone, CloneArgs};
pub use overrides::overrides;
pub use remappings::remappings;
