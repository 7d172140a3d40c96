//! Edge endpoints.
//!
//! DOT allows an edge endpoint to name a node, optionally followed by a port
//! name and a compass point: `node:port:ne`. Only the node participates in
//! edge identity; the port and compass point affect rendering alone.
//!
//! An [`Endpoint`] is either a bare node identifier ("implicit") or an
//! explicit [`Port`]. When an existing edge is amended, an implicit endpoint
//! keeps the previously recorded port of that side while an explicit one
//! replaces it.

use std::{fmt, str::FromStr};

use crate::{
    error::CoreError,
    identifier::{Id, Markup, Nonce, NormalizedId, prefer_quoted},
};

/// A compass point of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    C,
}

impl CompassPoint {
    const ALL: [CompassPoint; 9] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
        Self::C,
    ];

    /// Returns the DOT spelling of the compass point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "n",
            Self::NE => "ne",
            Self::E => "e",
            Self::SE => "se",
            Self::S => "s",
            Self::SW => "sw",
            Self::W => "w",
            Self::NW => "nw",
            Self::C => "c",
        }
    }

    /// Parses a compass point where `_` (the grammar's "unspecified") yields
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCompassPoint`] for any other unknown text.
    pub fn parse_optional(text: &str) -> Result<Option<Self>, CoreError> {
        if text == "_" {
            return Ok(None);
        }
        text.parse().map(Some)
    }
}

impl FromStr for CompassPoint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|point| point.as_str() == s)
            .ok_or_else(|| CoreError::InvalidCompassPoint(s.to_string()))
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if `text` is spelled like a compass point.
pub fn is_compass_literal(text: &str) -> bool {
    text.parse::<CompassPoint>().is_ok()
}

/// An explicit edge endpoint: node, optional port name, optional compass
/// point.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    node: Id,
    name: Option<Id>,
    compass: Option<CompassPoint>,
}

impl Port {
    /// Creates a port naming only the node.
    pub fn new(node: impl Into<Id>) -> Self {
        Self {
            node: node.into(),
            name: None,
            compass: None,
        }
    }

    /// Sets the port name.
    pub fn with_name(mut self, name: impl Into<Id>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the compass point.
    pub fn with_compass(mut self, compass: CompassPoint) -> Self {
        self.compass = Some(compass);
        self
    }

    /// Sets the compass point from its DOT spelling; `_` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCompassPoint`] for unknown spellings.
    pub fn with_compass_str(mut self, compass: &str) -> Result<Self, CoreError> {
        self.compass = CompassPoint::parse_optional(compass)?;
        Ok(self)
    }

    /// Returns the node identifier.
    pub fn node(&self) -> &Id {
        &self.node
    }
}

/// Either side of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// A bare node identifier.
    Node(Id),
    /// An explicit port.
    Port(Port),
}

impl Endpoint {
    /// Returns the canonical form of the endpoint.
    pub fn normalize(&self) -> NormalizedPort {
        match self {
            Endpoint::Node(node) => NormalizedPort {
                node: node.normalize(),
                name: None,
                compass: None,
                implicit: true,
            },
            Endpoint::Port(port) => NormalizedPort {
                node: port.node.normalize(),
                name: port.name.as_ref().map(Id::normalize),
                compass: port.compass,
                implicit: false,
            },
        }
    }
}

impl From<Port> for Endpoint {
    fn from(port: Port) -> Self {
        Endpoint::Port(port)
    }
}

macro_rules! endpoint_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Endpoint {
                fn from(node: $source) -> Self {
                    Endpoint::Node(Id::from(node))
                }
            }
        )+
    };
}

endpoint_from!(Id, &str, String, &String, i64, i32, u32, usize, f64, bool, Markup, Nonce, &Nonce);

/// The canonical form of an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPort {
    node: NormalizedId,
    name: Option<NormalizedId>,
    compass: Option<CompassPoint>,
    implicit: bool,
}

impl NormalizedPort {
    /// Returns the node identity.
    pub fn node(&self) -> &NormalizedId {
        &self.node
    }

    /// Returns the port name.
    pub fn name(&self) -> Option<&NormalizedId> {
        self.name.as_ref()
    }

    /// Returns the compass point.
    pub fn compass(&self) -> Option<CompassPoint> {
        self.compass
    }

    /// Returns `true` if the endpoint was given as a bare node identifier.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Renders `node[:name][:compass]`, using `resolve` to render each
    /// identifier.
    ///
    /// A port name spelled like a compass point is quoted so it is not read
    /// as one.
    pub fn render<E>(
        &self,
        mut resolve: impl FnMut(&NormalizedId) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut rendered = resolve(&self.node)?;
        if let Some(name) = &self.name {
            let name = resolve(name)?;
            rendered.push(':');
            if is_compass_literal(&name) {
                rendered.push_str(&prefer_quoted(&name));
            } else {
                rendered.push_str(&name);
            }
        }
        if let Some(compass) = self.compass {
            rendered.push(':');
            rendered.push_str(compass.as_str());
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    fn render(endpoint: impl Into<Endpoint>) -> String {
        endpoint
            .into()
            .normalize()
            .render(|id| Ok::<_, Infallible>(id.to_string()))
            .unwrap()
    }

    #[test]
    fn test_compass_parse() {
        for text in ["n", "ne", "e", "se", "s", "sw", "w", "nw", "c"] {
            let point: CompassPoint = text.parse().unwrap();
            assert_eq!(point.as_str(), text);
        }
        assert_eq!(CompassPoint::parse_optional("_").unwrap(), None);
        assert_eq!(
            CompassPoint::parse_optional("x").unwrap_err(),
            CoreError::InvalidCompassPoint("x".to_string())
        );
        assert!("_".parse::<CompassPoint>().is_err());
    }

    #[test]
    fn test_render_forms() {
        assert_eq!(render("a"), "a");
        assert_eq!(render(Port::new("a")), "a");
        assert_eq!(render(Port::new("b").with_name("next")), "b:next");
        assert_eq!(
            render(Port::new("c").with_name("next").with_compass(CompassPoint::N)),
            "c:next:n"
        );
        assert_eq!(render(Port::new("d").with_compass(CompassPoint::S)), "d:s");
        assert_eq!(render(Port::new("f").with_name("n")), "f:\"n\"");
        assert_eq!(
            render(Port::new(Markup::new("c")).with_name(Markup::new("u"))),
            "<c>:<u>"
        );
    }

    #[test]
    fn test_compass_str_underscore_clears() {
        let port = Port::new("b")
            .with_compass(CompassPoint::E)
            .with_compass_str("_")
            .unwrap();
        assert_eq!(render(port), "b");
        assert!(Port::new("b").with_compass_str("up").is_err());
    }

    #[test]
    fn test_implicit_flag() {
        assert!(Endpoint::from("a").normalize().is_implicit());
        assert!(!Endpoint::from(Port::new("a")).normalize().is_implicit());
        assert_eq!(
            Endpoint::from(Port::new(5)).normalize().node(),
            Endpoint::from("5").normalize().node()
        );
    }
}
