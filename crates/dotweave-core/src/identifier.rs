//! The DOT language `ID` value type and its normalization rules.
//!
//! DOT uses a single lexical category, `ID`, for graph, subgraph, and node
//! identifiers as well as for attribute values. This module provides:
//!
//! - [`Id`]: The application-facing value (text, integer, float, boolean,
//!   markup, or nonce)
//! - [`NormalizedId`]: The canonical form used for identity comparison and,
//!   apart from nonces, for emission
//! - [`Markup`]: HTML-like strings emitted between angle brackets
//! - [`Nonce`]: Placeholders resolved to unique identifiers at emission time
//!
//! # Normalization
//!
//! Text-like values (text, integers, floats, booleans) collapse to a single
//! identity space: `Id::from(100)` and `Id::from("100")` normalize to the same
//! literal, as do `Id::from(true)` and `Id::from("true")`. The normalized form
//! of a text-like value is its rendered DOT literal, quoted only when the text
//! is not lexically a simple identifier or numeral.
//!
//! ```
//! use dotweave_core::identifier::{Id, Markup, NormalizedId};
//!
//! assert_eq!(Id::from(100).normalize(), Id::from("100").normalize());
//! assert_eq!(Id::from(true).normalize(), NormalizedId::literal("true"));
//! assert_eq!(Id::from("two words").normalize().to_string(), "\"two words\"");
//!
//! // Markup never shares identity with text, even when the characters agree.
//! assert_ne!(Id::from(Markup::new("b")).normalize(), Id::from("<b>").normalize());
//! ```

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
};

use crate::error::CoreError;

/// Keywords of the DOT grammar. Identifiers spelled like a keyword (in any
/// letter case) must be quoted.
const KEYWORDS: [&str; 6] = ["strict", "graph", "digraph", "node", "edge", "subgraph"];

/// Default prefix of [`Nonce`] identifiers.
pub const DEFAULT_NONCE_PREFIX: &str = "_nonce";

// =============================================================================
// Markup
// =============================================================================

/// A DOT language markup ("HTML") string.
///
/// Graphviz accepts markup such as `<x<sub>1</sub>>` as an `ID`. Because the
/// quoted text `"<x<sub>1</sub>>"` is an ordinary identifier, markup is a
/// distinct value type. The stored content excludes the outer angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Markup(String);

impl Markup {
    /// Creates markup from content without the enclosing angle brackets.
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Returns the markup content.
    pub fn content(&self) -> &str {
        &self.0
    }
}

/// Renders markup content between angle brackets.
///
/// # Errors
///
/// Returns [`CoreError::MalformedMarkup`] if a `>` closes more brackets than
/// were opened, or if brackets remain open at the end of the content.
pub fn render_markup(content: &str) -> Result<String, CoreError> {
    let mut depth = 0usize;
    for c in content.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1).ok_or_else(|| CoreError::MalformedMarkup {
                    markup: content.to_string(),
                })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CoreError::MalformedMarkup {
            markup: content.to_string(),
        });
    }
    Ok(format!("<{content}>"))
}

// =============================================================================
// Nonce
// =============================================================================

static NEXT_NONCE_SERIAL: AtomicU64 = AtomicU64::new(1);

/// A placeholder that resolves to a unique identifier when text is emitted.
///
/// Every call to [`Nonce::new`] or [`Nonce::with_prefix`] creates a distinct
/// identity; clones share the identity of the original. During emission each
/// nonce resolves to an identifier of the form `prefix_n`, chosen so that it
/// collides neither with literal identifiers in the graph nor with other
/// nonces.
///
/// ```
/// use dotweave_core::identifier::Nonce;
///
/// let a = Nonce::new();
/// let b = Nonce::new();
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Debug, Clone)]
pub struct Nonce {
    serial: u64,
    prefix: Arc<str>,
}

impl Nonce {
    /// Creates a nonce resolving to identifiers prefixed `_nonce`.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_NONCE_PREFIX)
    }

    /// Creates a nonce resolving to identifiers of the form `prefix_n`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            serial: NEXT_NONCE_SERIAL.fetch_add(1, AtomicOrdering::Relaxed),
            prefix: Arc::from(prefix),
        }
    }

    /// Returns the prefix of generated identifiers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for Nonce {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Nonce {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for Nonce {}

impl Hash for Nonce {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

impl PartialOrd for Nonce {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Nonce {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serial.cmp(&other.serial)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.prefix, self.serial)
    }
}

// =============================================================================
// Id
// =============================================================================

/// A DOT language `ID` as supplied by applications.
///
/// Used for graph, subgraph, and node identifiers, port names, edge
/// discriminants, and attribute values.
#[derive(Debug, Clone, PartialEq)]
pub enum Id {
    /// Arbitrary text, quoted and escaped as needed.
    Text(String),
    /// An integer, equivalent to its decimal text.
    Int(i64),
    /// A float, equivalent to its shortest round-trip text (`1.5`, `2.0`,
    /// `1e+16`, `1e-05`).
    Float(f64),
    /// A boolean, equivalent to `true` or `false`.
    Bool(bool),
    /// Markup, emitted between angle brackets.
    Markup(Markup),
    /// A placeholder resolved at emission time.
    Nonce(Nonce),
}

impl Id {
    /// Returns the canonical form of this identifier.
    pub fn normalize(&self) -> NormalizedId {
        match self {
            Id::Text(text) => NormalizedId::literal(text),
            Id::Int(value) => NormalizedId::literal(&value.to_string()),
            Id::Float(value) => NormalizedId::literal(&float_literal(*value)),
            Id::Bool(true) => NormalizedId::literal("true"),
            Id::Bool(false) => NormalizedId::literal("false"),
            Id::Markup(markup) => NormalizedId::Markup(markup.content().to_string()),
            Id::Nonce(nonce) => NormalizedId::Nonce(nonce.clone()),
        }
    }
}

/// Renders a float as its shortest round-trip text.
///
/// Exponents carry a sign and at least two digits (`1e+16`, `2.5e-07`).
fn float_literal(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let text = format!("{value:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

macro_rules! id_from {
    ($($source:ty => |$value:ident| $body:expr),+ $(,)?) => {
        $(
            impl From<$source> for Id {
                fn from($value: $source) -> Self {
                    $body
                }
            }
        )+
    };
}

id_from! {
    &str => |value| Id::Text(value.to_string()),
    String => |value| Id::Text(value),
    &String => |value| Id::Text(value.clone()),
    i64 => |value| Id::Int(value),
    i32 => |value| Id::Int(i64::from(value)),
    u32 => |value| Id::Int(i64::from(value)),
    usize => |value| match i64::try_from(value) {
        Ok(value) => Id::Int(value),
        Err(_) => Id::Text(value.to_string()),
    },
    f64 => |value| Id::Float(value),
    f32 => |value| Id::Float(f64::from(value)),
    bool => |value| Id::Bool(value),
    Markup => |value| Id::Markup(value),
    Nonce => |value| Id::Nonce(value),
    &Nonce => |value| Id::Nonce(value.clone()),
}

// =============================================================================
// NormalizedId
// =============================================================================

/// The canonical form of an [`Id`].
///
/// Two identifiers denote the same entity exactly when their normalized forms
/// are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NormalizedId {
    /// A text-like value in its rendered form, quoted and escaped if needed.
    Literal(String),
    /// Markup content without the enclosing angle brackets.
    Markup(String),
    /// An unresolved placeholder.
    Nonce(Nonce),
}

impl NormalizedId {
    /// Normalizes raw text into a literal.
    pub fn literal(text: &str) -> Self {
        if requires_quoting(text) {
            NormalizedId::Literal(quote(text))
        } else {
            NormalizedId::Literal(text.to_string())
        }
    }

    /// Returns the rendered literal for text-like values.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            NormalizedId::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the nonce of an unresolved placeholder.
    pub fn as_nonce(&self) -> Option<&Nonce> {
        match self {
            NormalizedId::Nonce(nonce) => Some(nonce),
            _ => None,
        }
    }
}

impl fmt::Display for NormalizedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedId::Literal(text) => f.write_str(text),
            NormalizedId::Markup(content) => write!(f, "<{content}>"),
            NormalizedId::Nonce(nonce) => write!(f, "Nonce({nonce})"),
        }
    }
}

impl From<Id> for NormalizedId {
    fn from(id: Id) -> Self {
        id.normalize()
    }
}

// =============================================================================
// Lexical rules
// =============================================================================

/// Returns `true` unless `text` may appear unquoted in DOT.
///
/// Unquoted text is either an identifier (`[A-Za-z_][A-Za-z0-9_]*`) or a
/// numeral (`-?(.[0-9]+|[0-9]+(.[0-9]*)?)`), and is not a DOT keyword.
pub fn requires_quoting(text: &str) -> bool {
    if !(is_simple_identifier(text) || is_numeral(text)) {
        return true;
    }
    KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(text))
}

fn is_simple_identifier(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_numeral(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits.split_once('.') {
        Some((whole, fraction)) => {
            let whole_ok = whole.bytes().all(|b| b.is_ascii_digit());
            let fraction_ok = fraction.bytes().all(|b| b.is_ascii_digit());
            whole_ok && fraction_ok && (!whole.is_empty() || !fraction.is_empty())
        }
        None => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Quotes `text`, escaping backslashes, double quotes, and line ends.
///
/// Both `\r\n` and `\n` become the DOT escape `\n`.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                quoted.push_str("\\n");
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Returns the quoted form of a rendered identifier unless it is already
/// quoted or is markup.
///
/// Rendered literals need no further escaping: anything that would have
/// required escaping was quoted during normalization.
pub fn prefer_quoted(rendered: &str) -> Cow<'_, str> {
    match rendered.chars().next() {
        Some('"') | Some('<') | None => Cow::Borrowed(rendered),
        Some(_) => Cow::Owned(format!("\"{rendered}\"")),
    }
}
