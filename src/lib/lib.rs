#![warn(missing_docs)]

//! Library used by the usd-arnold tool. Reads the shading networks of a USD-style scene and
//! writes their connections into a renderer-facing attribute tree, keyed by shading node handle.

pub mod attribute;
pub mod config;
pub mod diagnostics;
pub mod handle;
pub mod path;
pub mod scene;
pub mod shader;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        attribute::{update_or_create, Attribute, AttributeSink, AttributeTree, GroupAttribute},
        config::{TranslatorConfig, DEFAULT_CONFIG},
        diagnostics::{Skip, SkipReason, Summary},
        handle::{HandleResolver, PrimNameHandles},
        path::Path,
        scene::{Prim, Scene, Stage},
        shader::{ParameterPath, SourceRef, Translator},
    };
}
