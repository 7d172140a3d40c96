//! Theme inheritance.
//!
//! A [`Dot`] may name another `Dot` as its theme. The theme contributes its
//! graph attributes, default attributes, and role definitions (its "heritable"
//! attributes) but never its nodes, edges, or subgraphs. Themes may use
//! themes of their own, and the whole chain is consulted every time the
//! object is emitted, so later changes to any theme are visible.
//!
//! [`Mien`] is the merged heritable view: the farthest theme is layered
//! first and the object's own values last, so nearer values win.

use std::borrow::Cow;

use dotweave_core::{
    attribute::{AttrSet, EntityKind, ROLE_ATTRIBUTE},
    identifier::NormalizedId,
};

use crate::{
    error::DotError,
    graph::Dot,
    structure::RoleTable,
};

/// The heritable attributes of a [`Dot`] merged along its theme chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mien {
    graph_attrs: AttrSet,
    graph_defaults: AttrSet,
    node_defaults: AttrSet,
    edge_defaults: AttrSet,
    roles: RoleTable,
}

impl Mien {
    /// Builds the merged view for `dot`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::ThemeUnavailable`] if a theme in the chain cannot
    /// be read.
    pub fn resolve(dot: &Dot) -> Result<Self, DotError> {
        let chain = dot.theme_chain()?;
        let mut mien = Mien::default();
        for theme in chain.iter().rev() {
            let theme = Dot::read_shared(theme)?;
            mien.layer(&theme);
        }
        mien.layer(dot);
        Ok(mien)
    }

    fn layer(&mut self, dot: &Dot) {
        let root = dot.tree().root();
        self.graph_attrs.merge(root.graph_attrs());
        self.graph_defaults.merge(root.defaults(EntityKind::Graph));
        self.node_defaults.merge(root.defaults(EntityKind::Node));
        self.edge_defaults.merge(root.defaults(EntityKind::Edge));
        self.roles.merge(dot.roles());
    }

    /// Merged graph attributes of the root block.
    pub fn graph_attrs(&self) -> &AttrSet {
        &self.graph_attrs
    }

    /// Merged default attributes of the root block.
    pub fn defaults(&self, kind: EntityKind) -> &AttrSet {
        match kind {
            EntityKind::Graph => &self.graph_defaults,
            EntityKind::Node => &self.node_defaults,
            EntityKind::Edge => &self.edge_defaults,
        }
    }

    /// Every attribute value in the merged view.
    pub fn values(&self) -> impl Iterator<Item = &NormalizedId> {
        self.graph_attrs
            .values()
            .chain(self.graph_defaults.values())
            .chain(self.node_defaults.values())
            .chain(self.edge_defaults.values())
            .chain(self.roles.iter().flat_map(|(_, _, attrs)| attrs.values()))
    }

    /// Replaces the `role` attribute of `attrs` by the attributes of the
    /// named role.
    ///
    /// The entity's own attributes keep their order and take precedence;
    /// role attributes not already present are appended. Sets without a
    /// `role` attribute are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::UndefinedRole`] if the role is not defined for
    /// `kind` anywhere in the theme chain. `entity` describes the offending
    /// entity for the message.
    pub fn integrate_role<'a>(
        &self,
        kind: EntityKind,
        attrs: &'a AttrSet,
        entity: impl FnOnce() -> String,
    ) -> Result<Cow<'a, AttrSet>, DotError> {
        let Some(role) = attrs.get(ROLE_ATTRIBUTE) else {
            return Ok(Cow::Borrowed(attrs));
        };
        let role_attrs = self
            .roles
            .get(kind, role)
            .ok_or_else(|| DotError::UndefinedRole {
                role: role.to_string(),
                kind,
                entity: entity(),
            })?;

        let mut integrated = attrs.clone();
        integrated.remove(ROLE_ATTRIBUTE);
        integrated.fill_missing(role_attrs);
        Ok(Cow::Owned(integrated))
    }
}
