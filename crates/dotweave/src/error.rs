//! Error types for dotweave operations.
//!
//! This module provides the main error type [`DotError`] which covers every
//! way building or emitting a graph can fail. Value-level failures from
//! [`dotweave_core`] are wrapped transparently.

use std::{fmt, io};

use thiserror::Error;

use dotweave_core::{attribute::EntityKind, error::CoreError};

use crate::config::ConfigError;

/// The things that can be defined, amended, or looked up by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Node,
    Edge,
    Subgraph,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "Node"),
            Self::Edge => write!(f, "Edge"),
            Self::Subgraph => write!(f, "Subgraph"),
        }
    }
}

/// The main error type for dotweave operations.
///
/// Definition errors are raised immediately by the call that violates the
/// rule. [`DotError::UndefinedRole`] and malformed markup are only detected
/// while emitting, because roles may be assigned before they are defined.
/// A failed emission leaves the graph untouched.
#[derive(Debug, Error)]
pub enum DotError {
    #[error("{kind} {identity} already defined")]
    AlreadyDefined { kind: Definition, identity: String },

    #[error("{kind} {identity} not defined{hint}")]
    NotDefined {
        kind: Definition,
        identity: String,
        hint: &'static str,
    },

    #[error("Role {role} used by {kind} {entity} not defined")]
    UndefinedRole {
        role: String,
        kind: EntityKind,
        entity: String,
    },

    #[error("Discriminants may only be given for multigraphs")]
    DiscriminantNotAllowed,

    #[error("Cannot specify both multigraph and strict")]
    StrictMultigraph,

    #[error("Using theme would create a cycle")]
    ThemeCycle,

    /// A thread panicked while holding a theme's write lock.
    #[error("Theme could not be read: a writer panicked while changing it")]
    ThemeUnavailable,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DotError {
    pub(crate) fn already_defined(kind: Definition, identity: impl fmt::Display) -> Self {
        Self::AlreadyDefined {
            kind,
            identity: identity.to_string(),
        }
    }

    pub(crate) fn not_defined(kind: Definition, identity: impl fmt::Display) -> Self {
        Self::NotDefined {
            kind,
            identity: identity.to_string(),
            hint: "",
        }
    }
}
