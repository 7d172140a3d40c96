//! Storage behind a [`Dot`](crate::Dot).
//!
//! # Overview
//!
//! - [`ScopeTree`]: the root block and its nested subgraph blocks, held in an
//!   arena and addressed by [`BlockId`].
//! - [`Registry`]: every node and edge of the graph keyed by identity, with
//!   the define/update presence rules.
//! - [`RoleTable`]: named attribute bundles per entity kind.
//!
//! Identity is global (one registry for the whole graph) while placement is
//! per block (statement lists on each [`BlockData`]).

mod block;
mod registry;
mod roles;

pub use block::BlockId;
pub(crate) use block::{BlockData, ScopeTree};
pub(crate) use registry::{EdgeKey, Presence, Registry};
pub(crate) use roles::RoleTable;
