use indexmap::IndexMap;

use dotweave_core::{
    attribute::{AttrSet, Attrs, EntityKind, RoleAttribute},
    identifier::NormalizedId,
};

use crate::error::DotError;

/// Named attribute bundles, one namespace per entity kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoleTable {
    roles: IndexMap<(EntityKind, NormalizedId), AttrSet>,
}

impl RoleTable {
    /// Creates or amends a role. Defining a role with no attributes still
    /// makes it known.
    pub fn define(
        &mut self,
        kind: EntityKind,
        name: NormalizedId,
        attrs: &Attrs,
    ) -> Result<(), DotError> {
        let mut updated = self.roles.get(&(kind, name.clone())).cloned().unwrap_or_default();
        updated.apply(attrs, RoleAttribute::Reserved)?;
        self.roles.insert((kind, name), updated);
        Ok(())
    }

    pub fn get(&self, kind: EntityKind, name: &NormalizedId) -> Option<&AttrSet> {
        self.roles.get(&(kind, name.clone()))
    }

    /// Layers `other` over this table role by role, attribute by attribute.
    pub fn merge(&mut self, other: &RoleTable) {
        for (key, attrs) in &other.roles {
            self.roles.entry(key.clone()).or_default().merge(attrs);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &NormalizedId, &AttrSet)> {
        self.roles
            .iter()
            .map(|((kind, name), attrs)| (*kind, name, attrs))
    }
}

#[cfg(test)]
mod tests {
    use dotweave_core::attrs;

    use super::*;

    fn id(text: &str) -> NormalizedId {
        NormalizedId::literal(text)
    }

    #[test]
    fn test_kinds_are_separate_namespaces() {
        let mut roles = RoleTable::default();
        roles.define(EntityKind::Node, id("x"), &attrs! { color = "red" }).unwrap();

        assert!(roles.get(EntityKind::Node, &id("x")).is_some());
        assert!(roles.get(EntityKind::Edge, &id("x")).is_none());
    }

    #[test]
    fn test_empty_definition_makes_role_known() {
        let mut roles = RoleTable::default();
        roles.define(EntityKind::Graph, id("x"), &attrs! {}).unwrap();
        assert!(roles.get(EntityKind::Graph, &id("x")).unwrap().is_empty());
    }

    #[test]
    fn test_role_attribute_rejected() {
        let mut roles = RoleTable::default();
        let err = roles
            .define(EntityKind::Node, id("x"), &attrs! { role = "y" })
            .unwrap_err();
        assert!(matches!(err, DotError::Core(_)));
        assert!(roles.get(EntityKind::Node, &id("x")).is_none());
    }

    #[test]
    fn test_merge_is_per_attribute() {
        let mut base = RoleTable::default();
        base.define(EntityKind::Node, id("x"), &attrs! { color = "red", shape = "box" })
            .unwrap();
        let mut over = RoleTable::default();
        over.define(EntityKind::Node, id("x"), &attrs! { color = "blue" }).unwrap();

        base.merge(&over);
        let merged = base.get(EntityKind::Node, &id("x")).unwrap();
        assert_eq!(merged.get("color"), Some(&id("blue")));
        assert_eq!(merged.get("shape"), Some(&id("box")));
    }
}
