//! File resolution across the source tree and the playground overlay
//!
//! Two parallel directory trees back every request: an immutable source tree
//! holding the original exercises, and a mutable playground overlay that
//! mirrors its relative paths. The overlay is created lazily and is entirely
//! disposable.

pub mod playground;
pub mod resolver;

pub use playground::PlaygroundStore;
pub use resolver::{FileOrigin, PathResolver, ResolvedFile, TaskFileRef};
