//! The graph builder.
//!
//! # Overview
//!
//! - [`Dot`]: a whole graph. Owns the root block, every subgraph block, the
//!   node and edge registry, the role definitions, and an optional theme.
//! - [`DotBuilder`]: root options (directedness, strictness, multigraph,
//!   identifier, comment).
//! - [`Block`]: a mutable handle on the root or a subgraph, through which
//!   defaults, graph attributes, nodes, edges, and nested subgraphs are
//!   written.
//!
//! Writes are order-independent: an entity may be mentioned, amended, and
//! given a role before that role is defined. Problems that can only be
//! judged against the finished graph (undefined roles, malformed markup)
//! are reported when emitting.

use std::{
    fmt, io, mem,
    sync::{Arc, RwLock, RwLockReadGuard, Weak},
};

use log::{debug, info};

use dotweave_core::{
    attribute::{AttrSet, Attrs, EntityKind, RoleAttribute},
    identifier::{Id, Nonce, NormalizedId},
    port::{Endpoint, NormalizedPort},
};

use crate::{
    config::EmitConfig,
    emit,
    error::{Definition, DotError},
    structure::{BlockData, BlockId, EdgeKey, Presence, Registry, RoleTable, ScopeTree},
    theme::Mien,
};

/// Prefix of the internal discriminants given to multigraph edges defined
/// without one.
const IMPLICIT_DISCRIMINANT_PREFIX: &str = "__D";

/// A [`Dot`] that can serve as a theme.
///
/// Objects using a theme hold it weakly; once every `SharedDot` handle is
/// dropped they behave as if they had no theme.
pub type SharedDot = Arc<RwLock<Dot>>;

// =============================================================================
// Dot
// =============================================================================

/// A DOT graph under construction.
///
/// # Examples
///
/// ```
/// use dotweave::{Dot, attrs};
///
/// let mut dot = Dot::builder().with_directed(true).build()?;
/// dot.root()
///     .node("a", &attrs! { shape = "box" })?
///     .edge("a", "b", None, &attrs! {})?;
///
/// assert_eq!(dot.emit()?, "digraph {\n    a [shape=box]\n    a -> b\n}\n");
/// # Ok::<(), dotweave::DotError>(())
/// ```
#[derive(Clone)]
pub struct Dot {
    directed: bool,
    strict: bool,
    multigraph: bool,
    comment: Option<String>,
    tree: ScopeTree,
    registry: Registry,
    roles: RoleTable,
    theme: Option<Weak<RwLock<Dot>>>,
}

impl Dot {
    /// Creates an empty, anonymous, undirected graph.
    pub fn new() -> Self {
        Self::with_options(false, false, false, None, None)
    }

    /// Returns a builder for root options.
    pub fn builder() -> DotBuilder {
        DotBuilder::default()
    }

    fn with_options(
        directed: bool,
        strict: bool,
        multigraph: bool,
        graph_id: Option<NormalizedId>,
        comment: Option<String>,
    ) -> Self {
        Self {
            directed,
            strict,
            multigraph,
            comment,
            tree: ScopeTree::new(graph_id),
            registry: Registry::default(),
            roles: RoleTable::default(),
            theme: None,
        }
    }

    /// Wraps the graph so that other graphs can use it as their theme.
    pub fn into_shared(self) -> SharedDot {
        Arc::new(RwLock::new(self))
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    /// Returns the graph identifier.
    pub fn id(&self) -> Option<&NormalizedId> {
        self.tree.root().graph_id()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns a handle on the root block.
    pub fn root(&mut self) -> Block<'_> {
        Block {
            dot: self,
            id: BlockId::ROOT,
        }
    }

    /// Returns a handle on a block previously created in this graph, or
    /// `None` if `id` does not belong to it.
    pub fn block(&mut self, id: BlockId) -> Option<Block<'_>> {
        self.tree.contains(id).then_some(Block { dot: self, id })
    }

    /// Returns a deep copy with a replaced identifier and/or comment.
    ///
    /// Arguments left as `None` keep the original's value. The copy uses
    /// the same theme as the original.
    pub fn copy_with(&self, id: Option<Id>, comment: Option<String>) -> Dot {
        let mut copy = self.clone();
        if let Some(id) = id {
            copy.tree
                .get_mut(BlockId::ROOT)
                .set_graph_id(Some(id.normalize()));
        }
        if let Some(comment) = comment {
            copy.comment = Some(comment);
        }
        copy
    }

    // -------------------------------------------------------------------------
    // Roles
    // -------------------------------------------------------------------------

    /// Defines or amends a graph role.
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn graph_role(&mut self, name: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.define_role(&[EntityKind::Graph], name.into(), attrs)
    }

    /// Defines or amends a node role.
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn node_role(&mut self, name: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.define_role(&[EntityKind::Node], name.into(), attrs)
    }

    /// Defines or amends an edge role.
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn edge_role(&mut self, name: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.define_role(&[EntityKind::Edge], name.into(), attrs)
    }

    /// Defines or amends a graph, a node, and an edge role of the same name
    /// with the same attributes.
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute, in which case
    /// none of the three roles change.
    pub fn all_role(&mut self, name: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.define_role(&EntityKind::ALL, name.into(), attrs)
    }

    fn define_role(
        &mut self,
        kinds: &[EntityKind],
        name: Id,
        attrs: &Attrs,
    ) -> Result<&mut Self, DotError> {
        let name = name.normalize();
        for kind in kinds {
            self.roles.define(*kind, name.clone(), attrs)?;
        }
        debug!(role:% = name, kinds:? = kinds; "Defined role");
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Themes
    // -------------------------------------------------------------------------

    /// Inherits graph attributes, default attributes, and roles from
    /// `theme`, or stops inheriting when `theme` is `None`.
    ///
    /// The theme is consulted at every emission, so later changes to it (or
    /// to its own theme) show up in this graph's output. Themes locked for
    /// writing by another thread are waited for.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::ThemeCycle`] if this graph is already part of
    /// `theme`'s chain, and [`DotError::ThemeUnavailable`] if a theme in the
    /// chain is poisoned.
    pub fn use_theme(&mut self, theme: Option<&SharedDot>) -> Result<&mut Self, DotError> {
        if let Some(theme) = theme {
            let mut next = Some(Arc::clone(theme));
            while let Some(current) = next {
                // The lock holding this graph is already held by the caller.
                if self.is_held_by(&current) {
                    return Err(DotError::ThemeCycle);
                }
                next = Self::read_shared(&current)?.theme();
            }
        }

        self.theme = theme.map(Arc::downgrade);
        debug!(themed = self.theme.is_some(); "Theme assigned");
        Ok(self)
    }

    /// Returns the current theme, if any is assigned and still alive.
    pub fn theme(&self) -> Option<SharedDot> {
        self.theme.as_ref().and_then(Weak::upgrade)
    }

    /// Returns the theme chain, nearest theme first.
    pub(crate) fn theme_chain(&self) -> Result<Vec<SharedDot>, DotError> {
        let mut chain = Vec::new();
        let mut next = self.theme();
        while let Some(theme) = next {
            next = Self::read_shared(&theme)?.theme();
            chain.push(theme);
        }
        Ok(chain)
    }

    /// Read-locks a shared graph, waiting for writers to finish.
    pub(crate) fn read_shared(shared: &SharedDot) -> Result<RwLockReadGuard<'_, Dot>, DotError> {
        shared.read().map_err(|_| DotError::ThemeUnavailable)
    }

    /// Returns `true` if this graph lives inside `shared`.
    ///
    /// Compares addresses only, so it never touches the lock.
    fn is_held_by(&self, shared: &SharedDot) -> bool {
        let start = Arc::as_ptr(shared).addr();
        let end = start + mem::size_of::<RwLock<Dot>>();
        (start..end).contains(&(self as *const Dot).addr())
    }

    // -------------------------------------------------------------------------
    // Emission
    // -------------------------------------------------------------------------

    /// Returns the DOT text of the graph with the default [`EmitConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`DotError::UndefinedRole`] if an entity names a role that
    /// is not defined, [`DotError::Core`] for malformed markup, and
    /// [`DotError::ThemeUnavailable`] if a theme lock is poisoned. A theme
    /// being changed by another thread is waited for.
    pub fn emit(&self) -> Result<String, DotError> {
        self.emit_with(&EmitConfig::default())
    }

    /// Returns the DOT text of the graph.
    ///
    /// # Errors
    ///
    /// See [`Dot::emit`].
    pub fn emit_with(&self, config: &EmitConfig) -> Result<String, DotError> {
        emit::emit(self, config)
    }

    /// Writes the DOT text of the graph to `writer`.
    ///
    /// Nothing is written if emission fails.
    ///
    /// # Errors
    ///
    /// See [`Dot::emit`]; write failures are returned as [`DotError::Io`].
    pub fn write_to(&self, writer: &mut impl io::Write, config: &EmitConfig) -> Result<(), DotError> {
        let text = self.emit_with(config)?;
        writer.write_all(text.as_bytes())?;
        info!(bytes = text.len(); "DOT text written");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Computes the attributes a node ends up with once every layer is
    /// applied: theme and own defaults along the node's block chain, then
    /// its role, then its own attributes.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::NotDefined`] for unknown nodes and
    /// [`DotError::UndefinedRole`] if the node's role is not defined.
    pub fn resolved_node_attributes(&self, node: impl Into<Id>) -> Result<AttrSet, DotError> {
        let node = node.into().normalize();
        let attrs = self
            .registry
            .node(&node)
            .ok_or_else(|| DotError::not_defined(Definition::Node, &node))?;
        let block = self
            .tree
            .find(|block| block.nodes().contains(&node))
            .unwrap_or(BlockId::ROOT);

        self.resolve_layers(EntityKind::Node, block, attrs, || node.to_string())
    }

    /// Computes the attributes an edge ends up with once every layer is
    /// applied. See [`Dot::resolved_node_attributes`].
    ///
    /// # Errors
    ///
    /// Returns [`DotError::NotDefined`] for unknown edges,
    /// [`DotError::DiscriminantNotAllowed`] for a discriminant outside a
    /// multigraph, and [`DotError::UndefinedRole`] if the edge's role is not
    /// defined.
    pub fn resolved_edge_attributes(
        &self,
        tail: impl Into<Endpoint>,
        head: impl Into<Endpoint>,
        discriminant: Option<Id>,
    ) -> Result<AttrSet, DotError> {
        let key = self.edge_key(
            &tail.into().normalize(),
            &head.into().normalize(),
            discriminant,
        )?;
        let entry = self.registry.edge(&key).ok_or_else(|| DotError::NotDefined {
            kind: Definition::Edge,
            identity: key.to_string(),
            hint: self.missing_edge_hint(),
        })?;
        let block = self
            .tree
            .find(|block| block.edges().contains(&key))
            .unwrap_or(BlockId::ROOT);

        self.resolve_layers(EntityKind::Edge, block, entry.attrs(), || key.to_string())
    }

    fn resolve_layers(
        &self,
        kind: EntityKind,
        block: BlockId,
        attrs: &AttrSet,
        entity: impl FnOnce() -> String,
    ) -> Result<AttrSet, DotError> {
        let mien = Mien::resolve(self)?;
        let mut resolved = mien.defaults(kind).clone();
        for id in self.tree.lineage(block).into_iter().skip(1) {
            resolved.merge(self.tree.get(id).defaults(kind));
        }
        resolved.merge(&*mien.integrate_role(kind, attrs, entity)?);
        Ok(resolved)
    }

    // -------------------------------------------------------------------------
    // Internals shared with emission
    // -------------------------------------------------------------------------

    pub(crate) fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn roles(&self) -> &RoleTable {
        &self.roles
    }

    fn missing_edge_hint(&self) -> &'static str {
        if self.multigraph {
            " (missing or wrong discriminant?)"
        } else {
            ""
        }
    }

    fn edge_key(
        &self,
        tail: &NormalizedPort,
        head: &NormalizedPort,
        discriminant: Option<Id>,
    ) -> Result<EdgeKey, DotError> {
        let discriminant = match discriminant {
            Some(_) if !self.multigraph => return Err(DotError::DiscriminantNotAllowed),
            Some(discriminant) => Some(discriminant.normalize()),
            None if self.multigraph => {
                Some(Id::from(Nonce::with_prefix(IMPLICIT_DISCRIMINANT_PREFIX)).normalize())
            }
            None => None,
        };
        Ok(EdgeKey::new(
            tail.node().clone(),
            head.node().clone(),
            discriminant,
            self.directed,
        ))
    }

    fn write_node(
        &mut self,
        block: BlockId,
        node: Id,
        attrs: &Attrs,
        presence: Presence,
    ) -> Result<(), DotError> {
        let node = node.normalize();
        if self.registry.write_node(node.clone(), attrs, presence)? {
            debug!(node:% = node, block:? = block; "Node defined");
            self.tree.get_mut(block).push_node(node);
        }
        Ok(())
    }

    fn write_edge(
        &mut self,
        block: BlockId,
        tail: Endpoint,
        head: Endpoint,
        discriminant: Option<Id>,
        attrs: &Attrs,
        presence: Presence,
    ) -> Result<(), DotError> {
        let tail = tail.normalize();
        let head = head.normalize();
        let key = self.edge_key(&tail, &head, discriminant)?;
        let created = self.registry.write_edge(
            key.clone(),
            tail,
            head,
            attrs,
            presence,
            self.directed,
            self.multigraph,
        )?;
        if created {
            debug!(edge:% = key, block:? = block; "Edge defined");
            self.tree.get_mut(block).push_edge(key);
        }
        Ok(())
    }
}

impl Default for Dot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dot")
            .field("id", &self.id())
            .field("directed", &self.directed)
            .field("strict", &self.strict)
            .field("multigraph", &self.multigraph)
            .field("nodes", &self.registry.nodes().count())
            .field("edges", &self.registry.edge_count())
            .field("themed", &self.theme.is_some())
            .finish()
    }
}

// =============================================================================
// DotBuilder
// =============================================================================

/// Root options of a [`Dot`].
#[derive(Debug, Clone, Default)]
pub struct DotBuilder {
    id: Option<Id>,
    comment: Option<String>,
    directed: bool,
    strict: bool,
    multigraph: bool,
}

impl DotBuilder {
    /// Sets the graph identifier.
    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a comment emitted as `//` lines above the graph.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Emits the graph as `strict`, asking the layout engine to merge
    /// duplicate edges.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Allows several edges between the same pair of nodes, told apart by
    /// discriminants.
    pub fn with_multigraph(mut self, multigraph: bool) -> Self {
        self.multigraph = multigraph;
        self
    }

    /// Creates the graph.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::StrictMultigraph`] if both `strict` and
    /// `multigraph` are set.
    pub fn build(self) -> Result<Dot, DotError> {
        if self.strict && self.multigraph {
            return Err(DotError::StrictMultigraph);
        }
        Ok(Dot::with_options(
            self.directed,
            self.strict,
            self.multigraph,
            self.id.map(|id| id.normalize()),
            self.comment,
        ))
    }
}

// =============================================================================
// Block
// =============================================================================

/// A mutable handle on one block (the root or a subgraph) of a [`Dot`].
///
/// Every attribute-taking method applies the assignments in order; a
/// `None` value (or [`AttrValue::Delete`](dotweave_core::attribute::AttrValue))
/// removes the attribute. Methods return `&mut Self` so calls chain.
///
/// Nodes and edges are identified graph-wide: mentioning an existing node
/// through another block amends it where it is, it does not move.
#[derive(Debug)]
pub struct Block<'a> {
    dot: &'a mut Dot,
    id: BlockId,
}

impl Block<'_> {
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the enclosing block, `None` for the root.
    pub fn parent(&self) -> Option<BlockId> {
        self.data().parent()
    }

    /// Returns the block's graph identifier.
    pub fn graph_id(&self) -> Option<&NormalizedId> {
        self.data().graph_id()
    }

    pub fn is_multigraph(&self) -> bool {
        self.dot.multigraph
    }

    fn data(&self) -> &BlockData {
        self.dot.tree.get(self.id)
    }

    fn data_mut(&mut self) -> &mut BlockData {
        self.dot.tree.get_mut(self.id)
    }

    // -------------------------------------------------------------------------
    // Defaults and graph attributes
    // -------------------------------------------------------------------------

    /// Sets default graph attributes (`graph [...]`).
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn graph_default(&mut self, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.set_defaults(&[EntityKind::Graph], attrs)
    }

    /// Sets default node attributes (`node [...]`).
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn node_default(&mut self, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.set_defaults(&[EntityKind::Node], attrs)
    }

    /// Sets default edge attributes (`edge [...]`).
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute.
    pub fn edge_default(&mut self, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.set_defaults(&[EntityKind::Edge], attrs)
    }

    /// Sets the same default attributes for graphs, nodes, and edges.
    ///
    /// # Errors
    ///
    /// Fails if `attrs` assigns the reserved `role` attribute, in which case
    /// no defaults change.
    pub fn all_default(&mut self, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.set_defaults(&EntityKind::ALL, attrs)
    }

    fn set_defaults(&mut self, kinds: &[EntityKind], attrs: &Attrs) -> Result<&mut Self, DotError> {
        for kind in kinds {
            self.data_mut()
                .defaults_mut(*kind)
                .apply(attrs, RoleAttribute::Reserved)?;
        }
        Ok(self)
    }

    /// Sets graph attributes of this block (`key=value` lines). A `role`
    /// attribute names a graph role.
    pub fn graph(&mut self, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.data_mut()
            .graph_attrs_mut()
            .apply(attrs, RoleAttribute::Allowed)?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    /// Defines a node in this block, or amends it wherever it was defined.
    /// A `role` attribute names a node role.
    pub fn node(&mut self, node: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.dot
            .write_node(self.id, node.into(), attrs, Presence::Any)?;
        Ok(self)
    }

    /// Defines a node that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::AlreadyDefined`] if the node exists.
    pub fn node_define(&mut self, node: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.dot
            .write_node(self.id, node.into(), attrs, Presence::New)?;
        Ok(self)
    }

    /// Amends a node that must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::NotDefined`] if the node does not exist.
    pub fn node_update(&mut self, node: impl Into<Id>, attrs: &Attrs) -> Result<&mut Self, DotError> {
        self.dot
            .write_node(self.id, node.into(), attrs, Presence::Existing)?;
        Ok(self)
    }

    /// Returns `true` if the node exists anywhere in the graph.
    pub fn node_is_defined(&self, node: impl Into<Id>) -> bool {
        self.dot.registry.contains_node(&node.into().normalize())
    }

    // -------------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------------

    /// Defines an edge in this block, or amends it wherever it was defined.
    ///
    /// Endpoints are node identifiers or [`Port`](dotweave_core::port::Port)s.
    /// Explicit ports replace the recorded port of their side; bare
    /// identifiers keep it. In multigraphs, an edge written without a
    /// `discriminant` is always a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::DiscriminantNotAllowed`] for a discriminant
    /// outside a multigraph.
    pub fn edge(
        &mut self,
        tail: impl Into<Endpoint>,
        head: impl Into<Endpoint>,
        discriminant: Option<Id>,
        attrs: &Attrs,
    ) -> Result<&mut Self, DotError> {
        self.dot.write_edge(
            self.id,
            tail.into(),
            head.into(),
            discriminant,
            attrs,
            Presence::Any,
        )?;
        Ok(self)
    }

    /// Defines an edge that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::AlreadyDefined`] if the edge exists, and
    /// [`DotError::DiscriminantNotAllowed`] as for [`Block::edge`].
    pub fn edge_define(
        &mut self,
        tail: impl Into<Endpoint>,
        head: impl Into<Endpoint>,
        discriminant: Option<Id>,
        attrs: &Attrs,
    ) -> Result<&mut Self, DotError> {
        self.dot.write_edge(
            self.id,
            tail.into(),
            head.into(),
            discriminant,
            attrs,
            Presence::New,
        )?;
        Ok(self)
    }

    /// Amends an edge that must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::NotDefined`] if the edge does not exist (in a
    /// multigraph, that includes omitting the discriminant), and
    /// [`DotError::DiscriminantNotAllowed`] as for [`Block::edge`].
    pub fn edge_update(
        &mut self,
        tail: impl Into<Endpoint>,
        head: impl Into<Endpoint>,
        discriminant: Option<Id>,
        attrs: &Attrs,
    ) -> Result<&mut Self, DotError> {
        self.dot.write_edge(
            self.id,
            tail.into(),
            head.into(),
            discriminant,
            attrs,
            Presence::Existing,
        )?;
        Ok(self)
    }

    /// Returns `true` if the edge exists anywhere in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::DiscriminantNotAllowed`] for a discriminant
    /// outside a multigraph.
    pub fn edge_is_defined(
        &self,
        tail: impl Into<Endpoint>,
        head: impl Into<Endpoint>,
        discriminant: Option<Id>,
    ) -> Result<bool, DotError> {
        let key = self.dot.edge_key(
            &tail.into().normalize(),
            &head.into().normalize(),
            discriminant,
        )?;
        Ok(self.dot.registry.contains_edge(&key))
    }

    // -------------------------------------------------------------------------
    // Subgraphs
    // -------------------------------------------------------------------------

    /// Returns the child subgraph named `id`, creating it if needed.
    ///
    /// Names are scoped to this block. An anonymous subgraph (`None`) is
    /// created on every call.
    pub fn subgraph(&mut self, id: Option<Id>) -> Block<'_> {
        let graph_id = id.map(|id| id.normalize());
        let existing = graph_id
            .as_ref()
            .and_then(|graph_id| self.dot.tree.find_child(self.id, graph_id));
        let child = match existing {
            Some(child) => child,
            None => self.create_subgraph(graph_id),
        };
        Block {
            dot: &mut *self.dot,
            id: child,
        }
    }

    /// Creates a child subgraph that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::AlreadyDefined`] if this block already has a
    /// child named `id`.
    pub fn subgraph_define(&mut self, id: impl Into<Id>) -> Result<Block<'_>, DotError> {
        let graph_id = id.into().normalize();
        if self.dot.tree.find_child(self.id, &graph_id).is_some() {
            return Err(DotError::already_defined(Definition::Subgraph, &graph_id));
        }
        let child = self.create_subgraph(Some(graph_id));
        Ok(Block {
            dot: &mut *self.dot,
            id: child,
        })
    }

    /// Returns an existing child subgraph.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::NotDefined`] if this block has no child named
    /// `id`.
    pub fn subgraph_update(&mut self, id: impl Into<Id>) -> Result<Block<'_>, DotError> {
        let graph_id = id.into().normalize();
        let child = self
            .dot
            .tree
            .find_child(self.id, &graph_id)
            .ok_or_else(|| DotError::not_defined(Definition::Subgraph, &graph_id))?;
        Ok(Block {
            dot: &mut *self.dot,
            id: child,
        })
    }

    /// Returns `true` if this block has a child subgraph named `id`.
    pub fn subgraph_is_defined(&self, id: impl Into<Id>) -> bool {
        self.dot
            .tree
            .find_child(self.id, &id.into().normalize())
            .is_some()
    }

    fn create_subgraph(&mut self, graph_id: Option<NormalizedId>) -> BlockId {
        let child = self.dot.tree.add_child(self.id, graph_id);
        debug!(parent:? = self.id, subgraph:? = child; "Subgraph created");
        child
    }
}
