//! Names and locations the translator reads from and writes to.

lazy_static::lazy_static! {
    /// Configuration used when none is given explicitly.
    pub static ref DEFAULT_CONFIG: TranslatorConfig = TranslatorConfig::default();
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Translator configuration.
pub struct TranslatorConfig {
    /// Attribute location holding one group per shading node handle.
    pub nodes_location: String,
    /// Child of a node group receiving its incoming connections.
    pub connections_key: String,
    /// Name prefix of the legacy per-component connection relationships.
    pub relationship_prefix: String,
    /// Namespace of shader outputs.
    pub outputs_prefix: String,
    /// Material relationship to the surface terminal.
    pub surface_relationship: String,
    /// Material relationship to the displacement terminal.
    pub displacement_relationship: String,
    /// Prim type name of materials.
    pub material_type: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            nodes_location: "material.nodes".to_owned(),
            connections_key: "connections".to_owned(),
            relationship_prefix: "connectedSourceFor:".to_owned(),
            outputs_prefix: "outputs:".to_owned(),
            surface_relationship: "ai:surface".to_owned(),
            displacement_relationship: "ai:displacement".to_owned(),
            material_type: "Material".to_owned(),
        }
    }
}

impl TranslatorConfig {
    /// Attribute location of the node with the given handle.
    pub fn node_location(&self, handle: &str) -> String {
        if self.nodes_location.is_empty() {
            handle.to_owned()
        } else {
            format!("{}.{handle}", self.nodes_location)
        }
    }

    /// Attribute location of the incoming connections of the node with the given handle.
    pub fn connections_location(&self, handle: &str) -> String {
        format!("{}.{}", self.node_location(handle), self.connections_key)
    }

    /// The material terminal relationships, surface first.
    pub fn terminal_relationships(&self) -> [&str; 2] {
        [
            self.surface_relationship.as_str(),
            self.displacement_relationship.as_str(),
        ]
    }
}
