//! Connection edges and their renderer-side encoding.
//!
//! A connection is stored on its target node as `<target key> = <source reference>`, where the
//! source reference reads `out@<handle>` for a full output and `out.<component>@<handle>` for one
//! of its components:
//!
//! ```text
//! kd_Color   = out@MyTexture
//! kd_Color.r = out.g@MyTexture
//! ```

use super::param::{ParameterPath, CHANNEL_SEPARATOR};
use crate::{
    attribute::{Attribute, GroupBuilder},
    diagnostics::SkipReason,
};

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

/// Canonical name of a shader's full output.
pub const OUTPUT: &str = "out";
/// Separates the output from the node handle in a [SourceRef].
pub const HANDLE_SEPARATOR: char = '@';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// [SourceRef] decoding errors.
pub enum Error {
    #[error("Source reference `{0}` has no `@<handle>` part")]
    /// No handle separator, or nothing after it.
    MissingHandle(String),

    #[error("Source reference `{0}` does not start with `out`")]
    /// Output part is neither `out` nor `out.<component>`.
    NotAnOutput(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Reference to an upstream node's output, or one component of it.
pub struct SourceRef {
    /// Output component, [None] for the full output.
    pub component: Option<String>,
    /// Handle of the upstream node.
    pub handle: String,
}

impl SourceRef {
    /// Reference to the full output of `handle`.
    pub fn output(handle: &str) -> Self {
        Self {
            component: None,
            handle: handle.to_owned(),
        }
    }

    /// Reference to one component of the output of `handle`.
    pub fn component(component: &str, handle: &str) -> Self {
        Self {
            component: Some(component.to_owned()),
            handle: handle.to_owned(),
        }
    }
}

impl Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{OUTPUT}")?;
        if let Some(component) = &self.component {
            write!(f, "{CHANNEL_SEPARATOR}{component}")?;
        }
        write!(f, "{HANDLE_SEPARATOR}{}", self.handle)
    }
}

impl FromStr for SourceRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((output, handle)) = s.split_once(HANDLE_SEPARATOR) else {
            return Err(Error::MissingHandle(s.to_owned()));
        };

        if handle.is_empty() {
            return Err(Error::MissingHandle(s.to_owned()));
        }

        let Some(rest) = output.strip_prefix(OUTPUT) else {
            return Err(Error::NotAnOutput(s.to_owned()));
        };

        let component = match rest.strip_prefix(CHANNEL_SEPARATOR) {
            None if rest.is_empty() => None,
            Some(component) if !component.is_empty() => Some(component.to_owned()),
            _ => return Err(Error::NotAnOutput(s.to_owned())),
        };

        Ok(Self {
            component,
            handle: handle.to_owned(),
        })
    }
}

/// Output component addressed by a legacy relationship target named `<outputs prefix><name>`.
/// [None] stands for the full output. An empty name addresses no output.
pub fn relationship_output(
    target_name: &str,
    outputs_prefix: &str,
) -> Result<Option<String>, SkipReason> {
    match target_name.strip_prefix(outputs_prefix) {
        None | Some("") => Err(SkipReason::NotAnOutput),
        Some(OUTPUT) => Ok(None),
        Some(name) => Ok(Some(name.to_owned())),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Incoming connection of a node.
pub struct ConnectionEdge {
    /// Connected parameter of the downstream node.
    pub target: ParameterPath,
    /// Upstream output.
    pub source: SourceRef,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Incoming connections of one node in discovery order, keyed by rendered target.
pub struct ConnectionSet {
    edges: Vec<(String, ConnectionEdge)>,
}

impl ConnectionSet {
    /// Record an edge. The first edge on a target wins: an edge whose key equals, nests under or
    /// contains the key of an earlier edge is rejected with [SkipReason::ShadowedBy].
    pub fn insert(&mut self, edge: ConnectionEdge) -> Result<(), SkipReason> {
        let key = edge.target.to_string();

        if let Some((existing, _)) = self
            .edges
            .iter()
            .find(|(existing, _)| overlaps(existing, &key))
        {
            return Err(SkipReason::ShadowedBy(existing.clone()));
        }

        self.edges.push((key, edge));
        Ok(())
    }

    /// Number of recorded edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge was recorded.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Recorded edges with their keys, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConnectionEdge)> {
        self.edges.iter().map(|(key, edge)| (key.as_str(), edge))
    }

    /// Nested attribute holding the encoded edges, [None] when there are none.
    pub fn build(&self) -> Option<Attribute> {
        let mut builder = GroupBuilder::default();
        for (key, edge) in self.edges.iter() {
            builder.set(key, edge.source.to_string());
        }
        builder.build()
    }
}

fn overlaps(lhs: &str, rhs: &str) -> bool {
    let nests_under = |inner: &str, outer: &str| {
        inner
            .strip_prefix(outer)
            .map_or(false, |rest| rest.starts_with(CHANNEL_SEPARATOR))
    };

    lhs == rhs || nests_under(lhs, rhs) || nests_under(rhs, lhs)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Which parameters of a node received full and which received component connections.
///
/// Collected while translating typed inputs. Parameters showing up on both sides are reported by
/// [collisions](Self::collisions); no precedence between the two is applied.
pub struct ConnectionBookkeeping {
    /// Parameters connected as a whole.
    pub full: BTreeSet<String>,
    /// Parameters connected per component, with the connected components.
    pub partial: BTreeMap<String, BTreeSet<String>>,
}

impl ConnectionBookkeeping {
    /// Record a connected target.
    pub fn observe(&mut self, target: &ParameterPath) {
        match target.channel_name() {
            Some(channel) => {
                self.partial
                    .entry(target.base.clone())
                    .or_default()
                    .insert(channel.to_owned());
            }
            None => {
                self.full.insert(target.base.clone());
            }
        }
    }

    /// Parameters with both a full and component connections.
    pub fn collisions(&self) -> impl Iterator<Item = &str> {
        self.partial
            .keys()
            .filter(|base| self.full.contains(*base))
            .map(String::as_str)
    }
}
