//! Read-only snapshot of the prims a translation reads: their relationships and typed inputs.

pub mod parsing;

use crate::path::Path;

use std::{collections::BTreeMap, fmt::Debug};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// [Scene] construction errors.
pub enum Error {
    #[error("Prim `{0}` is defined twice")]
    /// Two prims share a path.
    DuplicatePrim(Path),

    #[error("`{0}` is a property path, prims need a prim path")]
    /// Prims cannot live at property paths.
    PropertyPath(Path),

    #[error(transparent)]
    /// Malformed path.
    Path(#[from] crate::path::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Named relationship and the paths it targets, in authored order.
pub struct Relationship {
    /// Full relationship name, e.g. `connectedSourceFor:kd_Color:r`.
    pub name: String,
    /// Authored targets.
    pub targets: Vec<Path>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Typed shader input and its connected source paths, in authored order.
pub struct Input {
    /// Full attribute name, e.g. `inputs:base_color`.
    pub name: String,
    /// Connected sources, each a property path on the upstream shader.
    pub connections: Vec<Path>,
}

impl Input {
    const NAMESPACE: &'static str = "inputs:";

    /// Input name without its `inputs:` namespace.
    pub fn base_name(&self) -> &str {
        self.name.strip_prefix(Self::NAMESPACE).unwrap_or(&self.name)
    }

    /// Whether at least one source is connected.
    pub fn has_connected_source(&self) -> bool {
        !self.connections.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A prim and the properties the translator cares about.
pub struct Prim {
    path: Path,
    type_name: String,
    handle: Option<String>,
    relationships: Vec<Relationship>,
    inputs: Vec<Input>,
}

impl Prim {
    /// Create a prim with no properties.
    pub fn new(path: Path, type_name: &str) -> Self {
        Self {
            path,
            type_name: type_name.to_owned(),
            handle: None,
            relationships: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Add a relationship.
    pub fn with_relationship(mut self, name: &str, targets: Vec<Path>) -> Self {
        self.relationships.push(Relationship {
            name: name.to_owned(),
            targets,
        });
        self
    }

    /// Add an input. `name` is the full attribute name, `inputs:` included.
    pub fn with_input(mut self, name: &str, connections: Vec<Path>) -> Self {
        self.inputs.push(Input {
            name: name.to_owned(),
            connections,
        });
        self
    }

    /// Set the authored shading node handle, overriding the derived one.
    pub fn with_handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_owned());
        self
    }

    #[allow(missing_docs)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[allow(missing_docs)]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Prim name, i.e. the last element of its path.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Authored shading node handle, if any.
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    /// All relationships in authored order.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Relationship by full name.
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    /// All typed inputs in authored order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }
}

/// Prim lookup on an already-loaded scene.
pub trait Stage {
    /// The prim at `path`, if it exists. Property paths never resolve.
    fn prim(&self, path: &Path) -> Option<&Prim>;
}

#[derive(Default)]
/// In-memory [Stage].
pub struct Scene {
    prims: BTreeMap<Path, Prim>,
}

impl Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("prims", &self.prims.len())
            .finish()
    }
}

impl Scene {
    /// Parse a scene from its text description, see [parsing].
    pub fn from_usda(text: &str) -> parsing::PResult<Self> {
        parsing::parse_scene(text)
    }

    /// Adds a prim to the scene.
    pub fn add_prim(&mut self, prim: Prim) -> Result<&mut Self, Error> {
        if prim.path.is_property_path() {
            return Err(Error::PropertyPath(prim.path));
        }

        if self.prims.contains_key(&prim.path) {
            return Err(Error::DuplicatePrim(prim.path));
        }

        self.prims.insert(prim.path.clone(), prim);
        Ok(self)
    }

    /// All prims, sorted by path.
    pub fn prims(&self) -> impl Iterator<Item = &Prim> {
        self.prims.values()
    }

    /// All prims of a given type, sorted by path.
    pub fn prims_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Prim> {
        self.prims().filter(move |prim| prim.type_name == type_name)
    }

    /// Number of prims.
    pub fn len(&self) -> usize {
        self.prims.len()
    }

    /// Whether the scene has no prims.
    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }
}

impl Stage for Scene {
    fn prim(&self, path: &Path) -> Option<&Prim> {
        self.prims.get(path)
    }
}
