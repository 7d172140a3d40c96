//! Dotweave - A structural builder for Graphviz DOT graphs.
//!
//! Graphs are assembled incrementally through an order-independent API and
//! turned into exact, deterministically ordered DOT text. Styling can be
//! factored into named roles and shared between graphs through themes.
//!
//! # Example
//!
//! ```
//! use dotweave::{Dot, attrs};
//!
//! let mut dot = Dot::builder().with_directed(true).build()?;
//! dot.node_role("service", &attrs! { shape = "box", style = "rounded" })?;
//! dot.root()
//!     .edge_default(&attrs! { color = "gray" })?
//!     .node("api", &attrs! { role = "service" })?
//!     .edge("api", "db", None, &attrs! {})?;
//!
//! assert_eq!(
//!     dot.emit()?,
//!     "digraph {\n    edge [color=gray]\n    api [shape=box style=rounded]\n    api -> db\n}\n"
//! );
//! # Ok::<(), dotweave::DotError>(())
//! ```

pub mod config;
pub mod render;

mod emit;
mod error;
mod graph;
mod structure;
mod theme;

pub use dotweave_core::{attribute, attrs, identifier, port};

pub use error::{Definition, DotError};
pub use graph::{Block, Dot, DotBuilder, SharedDot};
pub use structure::BlockId;
