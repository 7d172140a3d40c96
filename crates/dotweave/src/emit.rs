//! DOT text generation.
//!
//! Emission never mutates the graph. Each block is written as
//!
//! 1. default statements (`graph`, `node`, `edge`),
//! 2. graph attributes other than `label`, one `key=value` line each,
//! 3. nodes, in definition order,
//! 4. edges, in definition order,
//! 5. child subgraphs, recursively,
//! 6. the `label` graph attribute, if any.
//!
//! Non-empty groups are separated by a blank line, unless the block is small
//! (see [`EmitConfig::compact_threshold`]) or has only a single group, in
//! which case the separators are dropped.

mod nonce;

use log::{info, trace};

use dotweave_core::{
    attribute::{AttrSet, EntityKind},
    identifier::{NormalizedId, prefer_quoted},
};

use crate::{
    config::EmitConfig,
    error::DotError,
    graph::Dot,
    structure::BlockId,
    theme::Mien,
};

use nonce::NonceResolver;

/// The graph attribute that is always written last in its block.
const LABEL_ATTRIBUTE: &str = "label";

/// Returns the DOT text of `dot`.
pub(crate) fn emit(dot: &Dot, config: &EmitConfig) -> Result<String, DotError> {
    info!(directed = dot.is_directed(), strict = dot.is_strict(); "Emitting DOT text");

    let mien = Mien::resolve(dot)?;
    let mut emitter = Emitter {
        dot,
        mien: &mien,
        config,
        resolver: NonceResolver::new(dot, &mien),
        lines: Vec::new(),
    };

    if let Some(comment) = dot.comment().filter(|comment| !comment.is_empty()) {
        for line in comment_lines(comment) {
            emitter.lines.push(format!("// {line}"));
        }
        emitter.lines.push(String::new());
    }

    let mut header = String::new();
    if dot.is_strict() {
        header.push_str("strict ");
    }
    header.push_str(if dot.is_directed() { "digraph " } else { "graph " });
    if let Some(id) = dot.id() {
        header.push_str(&emitter.resolver.resolve(id)?);
        header.push(' ');
    }
    header.push('{');
    emitter.lines.push(header);

    emitter.block(BlockId::ROOT, 1)?;
    emitter.lines.push("}\n".to_string());

    let text = emitter.lines.join("\n");
    info!(bytes = text.len(); "DOT text emitted");
    Ok(text)
}

/// Splits a comment into lines, treating `\r\n`, `\n`, and `\r` alike and
/// ignoring a trailing line break.
fn comment_lines(comment: &str) -> Vec<String> {
    comment
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::to_string)
        .collect()
}

struct Emitter<'a> {
    dot: &'a Dot,
    mien: &'a Mien,
    config: &'a EmitConfig,
    resolver: NonceResolver,
    lines: Vec<String>,
}

impl<'a> Emitter<'a> {
    /// Appends the statements of one block at the given depth.
    fn block(&mut self, id: BlockId, depth: usize) -> Result<(), DotError> {
        let dot: &'a Dot = self.dot;
        let mien: &'a Mien = self.mien;
        let block = dot.tree().get(id);
        let prefix = self.config.indentation(depth);
        let base = self.lines.len();
        let mut blank_lines = 0;

        trace!(block:? = id, depth = depth; "Emitting block");

        // The root block carries the theme-merged defaults and graph
        // attributes; subgraphs only their own.
        self.blank_line(&mut blank_lines);
        for kind in EntityKind::ALL {
            let defaults = if id.is_root() {
                mien.defaults(kind)
            } else {
                block.defaults(kind)
            };
            if !defaults.is_empty() {
                self.statement(&prefix, kind.keyword(), Some(defaults))?;
            }
        }

        let graph_attrs = if id.is_root() {
            mien.graph_attrs()
        } else {
            block.graph_attrs()
        };
        let graph_attrs = mien.integrate_role(EntityKind::Graph, graph_attrs, || {
            block
                .graph_id()
                .map_or_else(|| "(anonymous)".to_string(), ToString::to_string)
        })?;

        self.blank_line(&mut blank_lines);
        for (name, value) in graph_attrs.iter() {
            if name != LABEL_ATTRIBUTE {
                let value = self.value(name, value)?;
                self.statement(&prefix, &format!("{name}={value}"), None)?;
            }
        }

        self.blank_line(&mut blank_lines);
        for node in block.nodes() {
            let Some(attrs) = dot.registry().node(node) else {
                continue;
            };
            let attrs = mien.integrate_role(EntityKind::Node, attrs, || node.to_string())?;
            let node = self.resolver.resolve(node)?;
            self.statement(&prefix, &node, Some(attrs.as_ref()))?;
        }

        self.blank_line(&mut blank_lines);
        let operator = if dot.is_directed() { " -> " } else { " -- " };
        for key in block.edges() {
            let Some(edge) = dot.registry().edge(key) else {
                continue;
            };
            let attrs = mien.integrate_role(EntityKind::Edge, edge.attrs(), || key.to_string())?;
            let tail = edge.tail().render(|id| self.resolver.resolve(id))?;
            let head = edge.head().render(|id| self.resolver.resolve(id))?;
            self.statement(&prefix, &format!("{tail}{operator}{head}"), Some(attrs.as_ref()))?;
        }

        for child in block.subgraphs() {
            self.blank_line(&mut blank_lines);
            let mut opening = format!("{prefix}subgraph ");
            if let Some(graph_id) = dot.tree().get(*child).graph_id() {
                opening.push_str(&self.resolver.resolve(graph_id)?);
                opening.push(' ');
            }
            opening.push('{');
            self.lines.push(opening);
            self.block(*child, depth + 1)?;
            self.lines.push(format!("{prefix}}}"));
        }

        if let Some(label) = graph_attrs.get(LABEL_ATTRIBUTE) {
            self.blank_line(&mut blank_lines);
            let label = self.resolver.resolve(label)?;
            self.statement(&prefix, &format!("label={}", prefer_quoted(&label)), None)?;
        }

        if self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
            blank_lines -= 1;
        }

        let statements = self.lines.len() - base - blank_lines;
        if statements <= self.config.compact_threshold() || blank_lines == 1 {
            let emitted = self.lines.split_off(base);
            self.lines
                .extend(emitted.into_iter().filter(|line| !line.is_empty()));
        }
        Ok(())
    }

    /// Appends a separator unless the previous line already is one.
    fn blank_line(&mut self, blank_lines: &mut usize) {
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(String::new());
            *blank_lines += 1;
        }
    }

    /// Appends `text`, followed by a bracketed attribute list when `attrs`
    /// is non-empty.
    fn statement(&mut self, prefix: &str, text: &str, attrs: Option<&AttrSet>) -> Result<(), DotError> {
        let mut line = format!("{prefix}{text}");
        if let Some(attrs) = attrs.filter(|attrs| !attrs.is_empty()) {
            let mut pieces = Vec::with_capacity(attrs.len());
            for (name, value) in attrs.iter() {
                pieces.push(format!("{name}={}", self.value(name, value)?));
            }
            line.push_str(" [");
            line.push_str(&pieces.join(" "));
            line.push(']');
        }
        self.lines.push(line);
        Ok(())
    }

    /// Renders an attribute value, quoting general-text attributes.
    fn value(&mut self, name: &str, value: &NormalizedId) -> Result<String, DotError> {
        let value = self.resolver.resolve(value)?;
        if self.config.is_text_attribute(name) {
            return Ok(prefer_quoted(&value).into_owned());
        }
        Ok(value)
    }
}
