//! Attribute assignments and ordered attribute sets.
//!
//! Every graph entity (graph, node, edge, role, and per-kind default
//! statement) owns an [`AttrSet`]: an ordered mapping from attribute name to
//! [`NormalizedId`]. Applications describe changes with [`Attrs`], an ordered
//! list of assignments in which each value is either a new [`Id`] or
//! [`AttrValue::Delete`].
//!
//! # Overview
//!
//! - [`EntityKind`]: The statement kinds that carry attributes
//! - [`AttrValue`]: A single assigned value or a deletion marker
//! - [`Attrs`]: An ordered list of assignments, usually built with
//!   [`attrs!`](crate::attrs!)
//! - [`AttrSet`]: The stored, normalized attributes of an entity
//!
//! # Naming
//!
//! A single trailing underscore is stripped from attribute names so that
//! names colliding with Rust keywords can be written as identifiers:
//! `type_` assigns `type` and `class__` assigns `class_`.
//!
//! ```
//! use dotweave_core::attrs;
//! use dotweave_core::attribute::{AttrSet, AttrValue, RoleAttribute};
//!
//! let mut set = AttrSet::new();
//! set.apply(&attrs! { shape = "box", class_ = "wide" }, RoleAttribute::Reserved)
//!     .unwrap();
//! assert_eq!(set.get("class").map(ToString::to_string).as_deref(), Some("wide"));
//!
//! set.apply(&attrs! { shape = AttrValue::Delete }, RoleAttribute::Reserved)
//!     .unwrap();
//! assert!(set.get("shape").is_none());
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::{
    error::CoreError,
    identifier::{Id, Markup, Nonce, NormalizedId},
};

/// The attribute through which graphs, nodes, and edges name their role.
pub const ROLE_ATTRIBUTE: &str = "role";

/// The statement kinds that carry attributes.
///
/// Roles and default statements are scoped by kind: a node role named `x`
/// and an edge role named `x` are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Graph,
    Node,
    Edge,
}

impl EntityKind {
    /// All kinds in emission order.
    pub const ALL: [EntityKind; 3] = [EntityKind::Graph, EntityKind::Node, EntityKind::Edge];

    /// Returns the DOT keyword introducing a default statement of this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Whether the `role` attribute may be assigned.
///
/// Graph, node, and edge statements may name a role. Default statements and
/// role definitions may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAttribute {
    Allowed,
    Reserved,
}

/// Strips a single trailing underscore from an attribute name.
pub fn attribute_name(name: &str) -> &str {
    name.strip_suffix('_').unwrap_or(name)
}

// =============================================================================
// Assignments
// =============================================================================

/// The right-hand side of an attribute assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Assign the value, overwriting any previous value.
    Set(Id),
    /// Remove the attribute if present.
    Delete,
}

macro_rules! attr_value_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for AttrValue {
                fn from(value: $source) -> Self {
                    AttrValue::Set(Id::from(value))
                }
            }
        )+
    };
}

attr_value_from!(&str, String, &String, i64, i32, u32, usize, f64, f32, bool, Markup, Nonce, &Nonce);

impl From<Id> for AttrValue {
    fn from(value: Id) -> Self {
        AttrValue::Set(value)
    }
}

impl<T: Into<Id>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => AttrValue::Set(value.into()),
            None => AttrValue::Delete,
        }
    }
}

/// An ordered list of attribute assignments.
///
/// Later assignments to the same name win. Names are stored as given and
/// stripped of a trailing underscore when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    assignments: Vec<(String, AttrValue)>,
}

impl Attrs {
    /// Creates an empty assignment list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.assignments.push((name.into(), value.into()));
    }

    /// Appends an assignment, returning the list for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Returns the assignments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.assignments
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Returns `true` if there are no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns the number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            assignments: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Builds an [`Attrs`] list from `name = value` pairs.
///
/// Values are anything convertible into an [`AttrValue`]: identifiers,
/// strings, numbers, booleans, markup, nonces, `Option`s of those (where
/// `None` deletes), or [`AttrValue::Delete`].
///
/// ```
/// use dotweave_core::attrs;
///
/// let attrs = attrs! { shape = "circle", width = 0.5, fixedsize = true };
/// assert_eq!(attrs.len(), 3);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::attribute::Attrs::new()
    };
    ($($name:ident = $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::attribute::Attrs::new();
        $( attrs.push(stringify!($name), $value); )+
        attrs
    }};
}

// =============================================================================
// Stored attribute sets
// =============================================================================

/// The normalized attributes of an entity, in first-assignment order.
///
/// Re-assigning a name keeps its position; deleting a name and assigning it
/// again moves it to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrSet {
    entries: IndexMap<String, NormalizedId>,
}

impl AttrSet {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a normalized value.
    pub fn set(&mut self, name: impl Into<String>, value: NormalizedId) {
        self.entries.insert(name.into(), value);
    }

    /// Removes an attribute; a no-op if absent.
    pub fn remove(&mut self, name: &str) {
        self.entries.shift_remove(name);
    }

    /// Returns the value of an attribute.
    pub fn get(&self, name: &str) -> Option<&NormalizedId> {
        self.entries.get(name)
    }

    /// Returns `true` if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Applies assignments in order.
    ///
    /// All names are validated before anything changes, so a rejected list
    /// leaves the set untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReservedAttribute`] if `role` is assigned while
    /// `role_attribute` is [`RoleAttribute::Reserved`].
    pub fn apply(&mut self, attrs: &Attrs, role_attribute: RoleAttribute) -> Result<(), CoreError> {
        if role_attribute == RoleAttribute::Reserved {
            if let Some((name, _)) = attrs
                .iter()
                .find(|(name, _)| attribute_name(name) == ROLE_ATTRIBUTE)
            {
                return Err(CoreError::ReservedAttribute(name.to_string()));
            }
        }

        for (name, value) in attrs.iter() {
            let name = attribute_name(name);
            match value {
                AttrValue::Set(id) => self.set(name, id.normalize()),
                AttrValue::Delete => self.remove(name),
            }
        }
        Ok(())
    }

    /// Assigns every entry of `other`, in `other`'s order.
    pub fn merge(&mut self, other: &AttrSet) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    /// Appends the entries of `other` whose names are not yet present.
    pub fn fill_missing(&mut self, other: &AttrSet) {
        for (name, value) in other.iter() {
            if !self.contains(name) {
                self.set(name, value.clone());
            }
        }
    }

    /// Returns the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedId)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the values in order.
    pub fn values(&self) -> impl Iterator<Item = &NormalizedId> {
        self.entries.values()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
