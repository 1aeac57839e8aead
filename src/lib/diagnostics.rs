//! Skipped connections and per-translation counters.
//!
//! Nothing the translator encounters is fatal: unsupported or malformed connections are skipped
//! and reported here instead.

use crate::path::Path;

use derive_more::{Add, AddAssign, Display};

#[derive(Clone, Debug, PartialEq, Eq, Display)]
/// Why a connection or a node was skipped.
pub enum SkipReason {
    #[display(fmt = "target parameter has more than two segments")]
    /// Array element of a component, not supported.
    TooManyTargetSegments,

    #[display(fmt = "target is an array element")]
    /// Array connections are translated by the host.
    ArrayTarget,

    #[display(fmt = "source is neither a full output nor an output component")]
    /// Source parameter did not split into exactly two segments.
    UnsupportedSourceShape,

    #[display(fmt = "source is an array element")]
    /// Empty or array marker source component.
    ArraySource,

    #[display(fmt = "relationship does not target a sub-parameter")]
    /// Whole-parameter relationships are translated by the host.
    NotSubParameter,

    #[display(fmt = "relationship has an empty component")]
    /// Relationship name ending with the delimiter.
    MalformedComponent,

    #[display(fmt = "relationship has {} targets, expected one", _0)]
    /// Zero or several relationship targets.
    AmbiguousRelationship(usize),

    #[display(fmt = "relationship target is not a shader output")]
    /// Target property outside of the outputs namespace.
    NotAnOutput,

    #[display(fmt = "upstream node `{}` does not exist", _0)]
    /// Connection to a prim missing from the scene.
    MissingUpstream(Path),

    #[display(fmt = "node has no attribute data to augment")]
    /// The host never materialized this node.
    NoPriorData,

    #[display(fmt = "target overlaps the earlier connection on `{}`", _0)]
    /// An earlier connection of the same node already covers this target.
    ShadowedBy(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Display)]
#[display(fmt = "{}: {}", node, reason)]
/// A skipped connection or node.
pub struct Skip {
    /// Node the skip happened on.
    pub node: Path,
    /// Why.
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Add, AddAssign)]
/// Counters of one translation run.
pub struct Summary {
    /// Distinct node handles visited.
    pub visited: usize,
    /// Nodes whose connections attribute was written.
    pub committed: usize,
    /// Connection edges written.
    pub edges: usize,
    /// Skips reported, see [Skip].
    pub skipped: usize,
}
