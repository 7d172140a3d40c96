//! Dotweave Core Types and Definitions
//!
//! This crate provides the foundational value types of the dotweave DOT
//! language builder. None of them know about graphs; they describe the atoms
//! that graphs are made of:
//!
//! - **Identifiers**: The DOT `ID` value type and its normalization and
//!   quoting rules ([`identifier::Id`], [`identifier::NormalizedId`])
//! - **Attributes**: Ordered attribute sets with deletion semantics
//!   ([`attribute::AttrSet`], [`attribute::Attrs`])
//! - **Ports**: Edge endpoints with optional port names and compass points
//!   ([`port::Port`], [`port::Endpoint`])
//! - **Errors**: Failures detectable at the value level ([`error::CoreError`])

pub mod attribute;
pub mod error;
pub mod identifier;
pub mod port;
