//! Shading node handles, the names the renderer-facing attribute tree keys its nodes by.

use crate::scene::Prim;

/// Maps a shading node to its handle. Implementations must be deterministic and must not map two
/// distinct nodes of one scene to the same handle.
pub trait HandleResolver {
    /// Handle of the given shading node.
    fn handle(&self, prim: &Prim) -> String;
}

impl<F: Fn(&Prim) -> String> HandleResolver for F {
    fn handle(&self, prim: &Prim) -> String {
        self(prim)
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Uses the authored handle when present, the prim name otherwise, with anything outside
/// `[A-Za-z0-9_]` replaced by `_`.
pub struct PrimNameHandles;

impl HandleResolver for PrimNameHandles {
    fn handle(&self, prim: &Prim) -> String {
        prim.handle()
            .unwrap_or_else(|| prim.name())
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}
