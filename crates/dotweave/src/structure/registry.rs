use std::{fmt, mem};

use indexmap::IndexMap;

use dotweave_core::{
    attribute::{AttrSet, Attrs, RoleAttribute},
    identifier::NormalizedId,
    port::NormalizedPort,
};

use crate::error::{Definition, DotError};

/// How a write treats the existence of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// Create if absent, amend if present.
    Any,
    /// Fail unless the target already exists.
    Existing,
    /// Fail if the target already exists.
    New,
}

/// The identity of an edge: both node identities plus the discriminant.
///
/// For undirected graphs the two nodes are stored in ascending order, so
/// `a -- b` and `b -- a` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EdgeKey {
    tail: NormalizedId,
    head: NormalizedId,
    discriminant: Option<NormalizedId>,
}

impl EdgeKey {
    pub fn new(
        tail: NormalizedId,
        head: NormalizedId,
        discriminant: Option<NormalizedId>,
        directed: bool,
    ) -> Self {
        let (tail, head) = if !directed && head < tail {
            (head, tail)
        } else {
            (tail, head)
        };
        Self {
            tail,
            head,
            discriminant,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}", self.tail, self.head)?;
        if let Some(discriminant) = &self.discriminant {
            write!(f, ", {discriminant}")?;
        }
        write!(f, ")")
    }
}

/// A stored edge. The ports keep the order of the latest write.
#[derive(Debug, Clone)]
pub(crate) struct EdgeEntry {
    tail: NormalizedPort,
    head: NormalizedPort,
    attrs: AttrSet,
}

impl EdgeEntry {
    pub fn tail(&self) -> &NormalizedPort {
        &self.tail
    }

    pub fn head(&self) -> &NormalizedPort {
        &self.head
    }

    pub fn attrs(&self) -> &AttrSet {
        &self.attrs
    }

    /// Replaces each side's port with the new one unless the new one is
    /// implicit.
    ///
    /// In undirected graphs the endpoints may arrive in the opposite order;
    /// the stored sides are swapped first, so the latest order is emitted.
    fn update_ports(&mut self, tail: NormalizedPort, head: NormalizedPort, directed: bool) {
        if !directed && tail.node() != self.tail.node() {
            mem::swap(&mut self.tail, &mut self.head);
        }
        if !tail.is_implicit() {
            self.tail = tail;
        }
        if !head.is_implicit() {
            self.head = head;
        }
    }
}

/// All nodes and edges of a graph keyed by identity.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    nodes: IndexMap<NormalizedId, AttrSet>,
    edges: IndexMap<EdgeKey, EdgeEntry>,
}

impl Registry {
    pub fn node(&self, id: &NormalizedId) -> Option<&AttrSet> {
        self.nodes.get(id)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeEntry> {
        self.edges.get(key)
    }

    pub fn contains_node(&self, id: &NormalizedId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NormalizedId, &AttrSet)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeEntry)> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Creates or amends a node.
    ///
    /// Returns `true` if the node was created by this call.
    pub fn write_node(
        &mut self,
        id: NormalizedId,
        attrs: &Attrs,
        presence: Presence,
    ) -> Result<bool, DotError> {
        let exists = self.nodes.contains_key(&id);
        match (presence, exists) {
            (Presence::New, true) => return Err(DotError::already_defined(Definition::Node, &id)),
            (Presence::Existing, false) => return Err(DotError::not_defined(Definition::Node, &id)),
            _ => {}
        }

        self.nodes
            .entry(id)
            .or_default()
            .apply(attrs, RoleAttribute::Allowed)?;
        Ok(!exists)
    }

    /// Creates or amends an edge.
    ///
    /// Returns `true` if the edge was created by this call.
    #[allow(clippy::too_many_arguments)]
    pub fn write_edge(
        &mut self,
        key: EdgeKey,
        tail: NormalizedPort,
        head: NormalizedPort,
        attrs: &Attrs,
        presence: Presence,
        directed: bool,
        multigraph: bool,
    ) -> Result<bool, DotError> {
        if let Some(entry) = self.edges.get_mut(&key) {
            if presence == Presence::New {
                return Err(DotError::already_defined(Definition::Edge, &key));
            }
            entry.update_ports(tail, head, directed);
            entry.attrs.apply(attrs, RoleAttribute::Allowed)?;
            return Ok(false);
        }

        if presence == Presence::Existing {
            return Err(DotError::NotDefined {
                kind: Definition::Edge,
                identity: key.to_string(),
                hint: if multigraph {
                    " (missing or wrong discriminant?)"
                } else {
                    ""
                },
            });
        }

        let mut entry = EdgeEntry {
            tail,
            head,
            attrs: AttrSet::new(),
        };
        entry.attrs.apply(attrs, RoleAttribute::Allowed)?;
        self.edges.insert(key, entry);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use dotweave_core::{
        attrs,
        port::{CompassPoint, Endpoint, Port},
    };

    use super::*;

    fn id(text: &str) -> NormalizedId {
        NormalizedId::literal(text)
    }

    fn port(endpoint: impl Into<Endpoint>) -> NormalizedPort {
        endpoint.into().normalize()
    }

    #[test]
    fn test_undirected_key_is_symmetric() {
        assert_eq!(
            EdgeKey::new(id("b"), id("a"), None, false),
            EdgeKey::new(id("a"), id("b"), None, false)
        );
        assert_ne!(
            EdgeKey::new(id("b"), id("a"), None, true),
            EdgeKey::new(id("a"), id("b"), None, true)
        );
    }

    #[test]
    fn test_node_presence() {
        let mut registry = Registry::default();

        assert!(registry.write_node(id("a"), &attrs! {}, Presence::Any).unwrap());
        assert!(!registry.write_node(id("a"), &attrs! { color = "red" }, Presence::Any).unwrap());
        assert!(matches!(
            registry.write_node(id("a"), &attrs! {}, Presence::New),
            Err(DotError::AlreadyDefined { kind: Definition::Node, .. })
        ));
        assert!(matches!(
            registry.write_node(id("b"), &attrs! {}, Presence::Existing),
            Err(DotError::NotDefined { kind: Definition::Node, .. })
        ));
        assert!(!registry.contains_node(&id("b")));
        assert_eq!(registry.node(&id("a")).unwrap().get("color"), Some(&id("red")));
    }

    #[test]
    fn test_edge_ports_follow_explicit_endpoints() {
        let mut registry = Registry::default();
        let key = EdgeKey::new(id("a"), id("b"), None, false);

        registry
            .write_edge(
                key.clone(),
                port(Port::new("a").with_compass(CompassPoint::N)),
                port("b"),
                &attrs! {},
                Presence::Any,
                false,
                false,
            )
            .unwrap();
        // Reversed order, implicit `a`, explicit `b`.
        registry
            .write_edge(
                key.clone(),
                port(Port::new("b").with_name("x")),
                port("a"),
                &attrs! {},
                Presence::Existing,
                false,
                false,
            )
            .unwrap();

        let entry = registry.edge(&key).unwrap();
        assert_eq!(entry.tail().node(), &id("b"));
        assert_eq!(entry.tail().name(), Some(&id("x")));
        assert_eq!(entry.head().node(), &id("a"));
        assert_eq!(entry.head().compass(), Some(CompassPoint::N));
        assert_eq!(registry.edge_count(), 1);
    }

    #[test]
    fn test_missing_edge_hint_in_multigraphs() {
        let mut registry = Registry::default();
        let key = EdgeKey::new(id("a"), id("b"), Some(id("x")), true);

        let err = registry
            .write_edge(key, port("a"), port("b"), &attrs! {}, Presence::Existing, true, true)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Edge (a, b, x) not defined (missing or wrong discriminant?)"
        );
    }
}
