use std::collections::{HashMap, HashSet};

use log::trace;

use dotweave_core::{
    attribute::EntityKind,
    identifier::{Nonce, NormalizedId, render_markup},
};

use crate::{error::DotError, graph::Dot, theme::Mien};

/// Turns normalized identifiers into their final text for one emission.
///
/// Each nonce becomes `prefix_n`, with `n` the smallest number (per prefix)
/// whose result collides with no literal identifier or attribute value of
/// the graph or its theme chain, and with no other nonce. A nonce resolves
/// to the same text every time it appears within the emission.
pub(crate) struct NonceResolver {
    avoid: HashSet<String>,
    resolved: HashMap<Nonce, String>,
    last_seqno: HashMap<String, u64>,
}

impl NonceResolver {
    pub fn new(dot: &Dot, mien: &Mien) -> Self {
        let mut ids: Vec<&NormalizedId> = Vec::new();
        ids.extend(dot.id());
        ids.extend(mien.values());

        for (node, attrs) in dot.registry().nodes() {
            ids.push(node);
            ids.extend(attrs.values());
        }
        for (_, edge) in dot.registry().edges() {
            for port in [edge.tail(), edge.head()] {
                ids.push(port.node());
                ids.extend(port.name());
            }
            ids.extend(edge.attrs().values());
        }
        for block in dot.tree().iter().skip(1) {
            ids.extend(block.graph_id());
            for kind in EntityKind::ALL {
                ids.extend(block.defaults(kind).values());
            }
            ids.extend(block.graph_attrs().values());
        }

        Self {
            avoid: ids
                .into_iter()
                .filter_map(NormalizedId::as_literal)
                .map(str::to_string)
                .collect(),
            resolved: HashMap::new(),
            last_seqno: HashMap::new(),
        }
    }

    /// Returns the final text of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DotError::Core`] for markup with unbalanced angle brackets.
    pub fn resolve(&mut self, id: &NormalizedId) -> Result<String, DotError> {
        match id {
            NormalizedId::Literal(text) => Ok(text.clone()),
            NormalizedId::Markup(content) => Ok(render_markup(content)?),
            NormalizedId::Nonce(nonce) => Ok(self.resolve_nonce(nonce)),
        }
    }

    fn resolve_nonce(&mut self, nonce: &Nonce) -> String {
        if let Some(resolved) = self.resolved.get(nonce) {
            return resolved.clone();
        }

        let prefix = nonce.prefix();
        let mut seqno = self.last_seqno.get(prefix).copied().unwrap_or(0);
        let candidate = loop {
            seqno += 1;
            let candidate = NormalizedId::literal(&format!("{prefix}_{seqno}"));
            if let Some(candidate) = candidate.as_literal() {
                if !self.avoid.contains(candidate) {
                    break candidate.to_string();
                }
            }
        };

        trace!(nonce:% = nonce, resolved = candidate.as_str(); "Nonce resolved");
        self.avoid.insert(candidate.clone());
        self.resolved.insert(nonce.clone(), candidate.clone());
        self.last_seqno.insert(prefix.to_string(), seqno);
        candidate
    }
}
