//! Depth-first walk of a material's shading network.
//!
//! Starting from the material's terminal relationships, every reachable shading node is visited
//! once. A visit gathers the node's incoming connections and merges them into the node's
//! `connections` attribute. Only nodes the host already wrote into the attribute tree are
//! augmented, nothing is created.

use super::connection::{ConnectionBookkeeping, ConnectionEdge, ConnectionSet};
use crate::{
    attribute::{update_or_create, AttributeSink},
    config::{TranslatorConfig, DEFAULT_CONFIG},
    diagnostics::{Skip, SkipReason, Summary},
    handle::HandleResolver,
    path::Path,
    scene::{Prim, Stage},
};

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

/// Translates shading networks of a [Stage] into renderer-side connection attributes.
///
/// The translator itself is stateless between calls: every entry point allocates its own visited
/// set and handle cache, so distinct translators may run on distinct threads.
pub struct Translator<'a> {
    stage: &'a dyn Stage,
    handles: &'a dyn HandleResolver,
    config: &'a TranslatorConfig,
    observer: Option<Box<dyn FnMut(&Skip) + 'a>>,
}

impl<'a> Translator<'a> {
    /// Create a translator using the [default configuration](DEFAULT_CONFIG).
    pub fn new(stage: &'a dyn Stage, handles: &'a dyn HandleResolver) -> Self {
        Self {
            stage,
            handles,
            config: &DEFAULT_CONFIG,
            observer: None,
        }
    }

    /// Use a custom configuration.
    pub fn with_config(mut self, config: &'a TranslatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Call `observer` on every skipped connection or node, on top of the trace log.
    pub fn on_skip(mut self, observer: impl FnMut(&Skip) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Translate the prim at `path` if it is a material, do nothing otherwise.
    pub fn read_prim_location(&mut self, path: &Path, sink: &mut dyn AttributeSink) -> Summary {
        let stage = self.stage;
        let Some(prim) = stage.prim(path) else {
            debug!(%path, "no prim to read");
            return Summary::default();
        };

        if prim.type_name() != self.config.material_type {
            trace!(%path, type_name = prim.type_name(), "not a material");
            return Summary::default();
        }

        self.translate_material(prim, sink)
    }

    /// Walk the surface then the displacement network of `material`, sharing one visited set.
    pub fn translate_material(
        &mut self,
        material: &'a Prim,
        sink: &mut dyn AttributeSink,
    ) -> Summary {
        let config = self.config;
        let mut traversal = self.traversal(sink);

        for name in config.terminal_relationships() {
            let Some(relationship) = material.relationship(name) else {
                continue;
            };
            traversal.visit_targets(material.path(), &relationship.targets);
        }

        debug!(material = %material.path(), summary = ?traversal.summary, "translated material");
        traversal.summary
    }

    /// Visit a single node and everything upstream of it.
    pub fn visit_node(&mut self, node: &'a Prim, sink: &mut dyn AttributeSink) -> Summary {
        let mut traversal = self.traversal(sink);
        traversal.visit(node);
        traversal.summary
    }

    fn traversal<'t>(&'t mut self, sink: &'t mut dyn AttributeSink) -> Traversal<'t, 'a> {
        Traversal {
            stage: self.stage,
            handles: self.handles,
            config: self.config,
            observer: self.observer.as_deref_mut(),
            sink,
            visited: HashSet::new(),
            handle_cache: HashMap::new(),
            summary: Summary::default(),
        }
    }
}

/// State of one top-level translation.
pub(super) struct Traversal<'t, 'a> {
    pub(super) stage: &'a dyn Stage,
    handles: &'a dyn HandleResolver,
    pub(super) config: &'a TranslatorConfig,
    observer: Option<&'t mut (dyn FnMut(&Skip) + 'a)>,
    sink: &'t mut dyn AttributeSink,

    visited: HashSet<String>,
    handle_cache: HashMap<Path, String>,
    pub(super) summary: Summary,
}

impl<'t, 'a> Traversal<'t, 'a> {
    /// Handle of `prim`, resolved once per traversal.
    pub(super) fn handle(&mut self, prim: &Prim) -> String {
        let handles = self.handles;
        self.handle_cache
            .entry(prim.path().clone())
            .or_insert_with(|| handles.handle(prim))
            .clone()
    }

    /// Report a skip to the log and the observer.
    pub(super) fn skip(&mut self, node: &Path, reason: SkipReason) {
        trace!(%node, %reason, "skipping");
        self.summary.skipped += 1;

        if let Some(observer) = self.observer.as_mut() {
            observer(&Skip {
                node: node.clone(),
                reason,
            });
        }
    }

    /// Visit the prims owning each of `targets`.
    pub(super) fn visit_targets(&mut self, owner: &Path, targets: &[Path]) {
        let stage = self.stage;
        for target in targets {
            match stage.prim(&target.prim_path()) {
                Some(prim) => self.visit(prim),
                None => self.skip(owner, SkipReason::MissingUpstream(target.clone())),
            }
        }
    }

    /// Record an edge on the node being visited.
    pub(super) fn record(
        &mut self,
        node: &Path,
        connections: &mut ConnectionSet,
        edge: ConnectionEdge,
    ) {
        trace!(%node, target = %edge.target, source = %edge.source, "connection");

        if let Err(reason) = connections.insert(edge) {
            self.skip(node, reason);
        }
    }

    pub(super) fn visit(&mut self, node: &'a Prim) {
        let handle = self.handle(node);
        if !self.visited.insert(handle.clone()) {
            return;
        }
        self.summary.visited += 1;

        // Only nodes the host already materialized get augmented.
        if self
            .sink
            .output_attr(&self.config.node_location(&handle))
            .is_none()
        {
            self.skip(node.path(), SkipReason::NoPriorData);
            return;
        }

        let mut connections = ConnectionSet::default();
        let mut bookkeeping = ConnectionBookkeeping::default();

        self.relationship_connections(node, &mut connections);
        self.input_connections(node, &mut connections, &mut bookkeeping);

        for base in bookkeeping.collisions() {
            debug!(
                node = %node.path(),
                parameter = base,
                "full and component connections on one parameter"
            );
        }

        let edges = connections.len();
        let location = self.config.connections_location(&handle);
        if update_or_create(self.sink, &location, connections.build()) {
            debug!(node = %node.path(), %handle, edges, "committed connections");
            self.summary.committed += 1;
            self.summary.edges += edges;
        }
    }
}
