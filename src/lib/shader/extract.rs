//! The two ways a shading node declares its incoming connections.

use super::{
    connection::{
        relationship_output, ConnectionBookkeeping, ConnectionEdge, ConnectionSet, SourceRef,
        OUTPUT,
    },
    graph::Traversal,
    param::{relationship_parameter, source_component, target_parameter},
};
use crate::{diagnostics::SkipReason, scene::Prim};

impl<'t, 'a> Traversal<'t, 'a> {
    /// Legacy per-component relationships, `connectedSourceFor:<param>:<component>`, each
    /// targeting exactly one upstream output.
    ///
    /// The edge is recorded before the upstream node is visited.
    pub(super) fn relationship_connections(
        &mut self,
        node: &'a Prim,
        connections: &mut ConnectionSet,
    ) {
        let config = self.config;
        let stage = self.stage;

        for relationship in node.relationships() {
            let Some(token) = relationship
                .name
                .strip_prefix(config.relationship_prefix.as_str())
            else {
                continue;
            };

            let target = match relationship_parameter(token) {
                Ok(target) => target,
                Err(reason) => {
                    self.skip(node.path(), reason);
                    continue;
                }
            };

            let [source] = relationship.targets.as_slice() else {
                let count = relationship.targets.len();
                self.skip(node.path(), SkipReason::AmbiguousRelationship(count));
                continue;
            };

            let component = match relationship_output(source.name(), &config.outputs_prefix) {
                Ok(component) => component,
                Err(reason) => {
                    self.skip(node.path(), reason);
                    continue;
                }
            };

            let Some(upstream) = stage.prim(&source.prim_path()) else {
                self.skip(node.path(), SkipReason::MissingUpstream(source.clone()));
                continue;
            };

            let handle = self.handle(upstream);
            let edge = ConnectionEdge {
                target,
                source: SourceRef { component, handle },
            };
            self.record(node.path(), connections, edge);

            self.visit(upstream);
        }
    }

    /// Typed inputs connected to an upstream output. Only the first connection of an input is
    /// translated, and the upstream node is visited before the edge is recorded.
    pub(super) fn input_connections(
        &mut self,
        node: &'a Prim,
        connections: &mut ConnectionSet,
        bookkeeping: &mut ConnectionBookkeeping,
    ) {
        let stage = self.stage;

        for input in node.inputs() {
            let Some(source) = input.connections.first() else {
                continue;
            };

            let Some(upstream) = stage.prim(&source.prim_path()) else {
                self.skip(node.path(), SkipReason::MissingUpstream(source.clone()));
                continue;
            };

            self.visit(upstream);
            let handle = self.handle(upstream);

            let edge = target_parameter(input.base_name()).and_then(|target| {
                let component = source_component(source.name(), OUTPUT)?;
                Ok(ConnectionEdge {
                    target,
                    source: SourceRef { component, handle },
                })
            });

            match edge {
                Ok(edge) => {
                    bookkeeping.observe(&edge.target);
                    self.record(node.path(), connections, edge);
                }
                Err(reason) => self.skip(node.path(), reason),
            }
        }
    }
}
