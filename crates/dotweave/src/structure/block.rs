use std::collections::HashMap;

use dotweave_core::{
    attribute::{AttrSet, EntityKind},
    identifier::NormalizedId,
};

use crate::structure::EdgeKey;

/// Addresses a block (the root or a subgraph) within its graph.
///
/// Ids are only meaningful for the graph that issued them, and stay valid
/// across [`Dot::clone`](crate::Dot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// The root block of every graph.
    pub const ROOT: BlockId = BlockId(0);

    /// Returns `true` for the root block.
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

/// The statements and defaults owned by a single block.
#[derive(Debug, Clone, Default)]
pub(crate) struct BlockData {
    graph_id: Option<NormalizedId>,
    parent: Option<BlockId>,
    graph_attrs: AttrSet,
    defaults: [AttrSet; 3],
    named_subgraphs: HashMap<NormalizedId, BlockId>,
    subgraphs: Vec<BlockId>,
    nodes: Vec<NormalizedId>,
    edges: Vec<EdgeKey>,
}

fn kind_index(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Graph => 0,
        EntityKind::Node => 1,
        EntityKind::Edge => 2,
    }
}

impl BlockData {
    pub fn graph_id(&self) -> Option<&NormalizedId> {
        self.graph_id.as_ref()
    }

    pub fn set_graph_id(&mut self, graph_id: Option<NormalizedId>) {
        self.graph_id = graph_id;
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn graph_attrs(&self) -> &AttrSet {
        &self.graph_attrs
    }

    pub fn graph_attrs_mut(&mut self) -> &mut AttrSet {
        &mut self.graph_attrs
    }

    pub fn defaults(&self, kind: EntityKind) -> &AttrSet {
        &self.defaults[kind_index(kind)]
    }

    pub fn defaults_mut(&mut self, kind: EntityKind) -> &mut AttrSet {
        &mut self.defaults[kind_index(kind)]
    }

    /// Child subgraphs in creation order.
    pub fn subgraphs(&self) -> &[BlockId] {
        &self.subgraphs
    }

    /// Nodes first written through this block, in definition order.
    pub fn nodes(&self) -> &[NormalizedId] {
        &self.nodes
    }

    /// Edges first written through this block, in definition order.
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    pub fn push_node(&mut self, node: NormalizedId) {
        self.nodes.push(node);
    }

    pub fn push_edge(&mut self, edge: EdgeKey) {
        self.edges.push(edge);
    }
}

/// Arena of blocks. Index 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct ScopeTree {
    blocks: Vec<BlockData>,
}

impl ScopeTree {
    pub fn new(graph_id: Option<NormalizedId>) -> Self {
        let mut root = BlockData::default();
        root.set_graph_id(graph_id);
        Self { blocks: vec![root] }
    }

    pub fn get(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.0]
    }

    pub fn get_mut(&mut self, id: BlockId) -> &mut BlockData {
        &mut self.blocks[id.0]
    }

    pub fn contains(&self, id: BlockId) -> bool {
        id.0 < self.blocks.len()
    }

    pub fn root(&self) -> &BlockData {
        self.get(BlockId::ROOT)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockData> {
        self.blocks.iter()
    }

    /// Returns the first block satisfying `predicate`.
    pub fn find(&self, predicate: impl Fn(&BlockData) -> bool) -> Option<BlockId> {
        self.blocks.iter().position(predicate).map(BlockId)
    }

    /// Looks up a named child of `parent`.
    pub fn find_child(&self, parent: BlockId, graph_id: &NormalizedId) -> Option<BlockId> {
        self.get(parent).named_subgraphs.get(graph_id).copied()
    }

    /// Appends a new child block to `parent`.
    ///
    /// Anonymous children are never shared, so every call with `None`
    /// creates a fresh block.
    pub fn add_child(&mut self, parent: BlockId, graph_id: Option<NormalizedId>) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BlockData {
            graph_id: graph_id.clone(),
            parent: Some(parent),
            ..BlockData::default()
        });

        let parent = self.get_mut(parent);
        if let Some(graph_id) = graph_id {
            parent.named_subgraphs.insert(graph_id, id);
        }
        parent.subgraphs.push(id);
        id
    }

    /// Returns the blocks from the root down to `id`, inclusive.
    pub fn lineage(&self, id: BlockId) -> Vec<BlockId> {
        let mut lineage = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            lineage.push(parent);
            current = parent;
        }
        lineage.reverse();
        lineage
    }
}
