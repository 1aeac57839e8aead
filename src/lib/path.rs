//! Scene-graph paths, addressing either a prim (`/Looks/mat/tex`) or one of its properties
//! (`/Looks/mat/tex.outputs:r`).

use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// [Path] parsing and construction errors.
pub enum Error {
    #[error("Empty path")]
    /// Nothing to parse.
    Empty,

    #[error("Path `{0}` is not absolute")]
    /// Relative paths are not supported.
    NotAbsolute(String),

    #[error("Path `{0}` contains an empty prim name")]
    /// Double or trailing slash.
    EmptyElement(String),

    #[error("Invalid prim name `{element}` in path `{path}`")]
    /// Prim names are identifiers made of `[A-Za-z0-9_]`.
    InvalidElement {
        /// Full path being parsed.
        path: String,
        /// Offending prim name.
        element: String,
    },

    #[error("Path `{0}` has an empty property name")]
    /// A `.` with nothing after it.
    EmptyProperty(String),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Absolute scene-graph path with an optional property part.
pub struct Path {
    elements: Vec<String>,
    property: Option<String>,
}

impl Path {
    /// The absolute root path `/`.
    pub fn root() -> Self {
        Self {
            elements: Vec::new(),
            property: None,
        }
    }

    /// Path of the child prim `name` below this prim path.
    pub fn append_child(&self, name: &str) -> Result<Self, Error> {
        validate_element(&self.to_string(), name)?;

        let mut elements = self.elements.clone();
        elements.push(name.to_owned());

        Ok(Self {
            elements,
            property: None,
        })
    }

    /// Path of the property `name` on this prim path.
    pub fn append_property(&self, name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::EmptyProperty(self.to_string()));
        }

        Ok(Self {
            elements: self.elements.clone(),
            property: Some(name.to_owned()),
        })
    }

    /// Whether the path addresses a property rather than a prim.
    pub fn is_property_path(&self) -> bool {
        self.property.is_some()
    }

    /// The owning prim path, i.e. the path itself without its property part.
    pub fn prim_path(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            property: None,
        }
    }

    /// Terminal name: the property name for property paths, the last prim name otherwise.
    pub fn name(&self) -> &str {
        match &self.property {
            Some(property) => property,
            None => self.elements.last().map_or("", String::as_str),
        }
    }

    /// Parent path. The parent of a property path is its prim, the root is its own parent.
    pub fn parent(&self) -> Self {
        if self.property.is_some() {
            return self.prim_path();
        }

        let mut elements = self.elements.clone();
        elements.pop();

        Self {
            elements,
            property: None,
        }
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty() && self.property.is_none()
    }
}

fn validate_element(path: &str, element: &str) -> Result<(), Error> {
    if element.is_empty() {
        return Err(Error::EmptyElement(path.to_owned()));
    }

    if !element
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::InvalidElement {
            path: path.to_owned(),
            element: element.to_owned(),
        });
    }

    Ok(())
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::Empty);
        }

        let Some(stripped) = s.strip_prefix('/') else {
            return Err(Error::NotAbsolute(s.to_owned()));
        };

        // Prim names never contain a `.`, property names may contain `:`.
        let (prims, property) = match stripped.split_once('.') {
            Some((prims, property)) => (prims, Some(property)),
            None => (stripped, None),
        };

        let elements = if prims.is_empty() {
            Vec::new()
        } else {
            prims
                .split('/')
                .map(|element| validate_element(s, element).map(|_| element.to_owned()))
                .collect::<Result<Vec<_>, _>>()?
        };

        let property = match property {
            Some("") => return Err(Error::EmptyProperty(s.to_owned())),
            Some(property) => Some(property.to_owned()),
            None => None,
        };

        Ok(Self { elements, property })
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.elements.is_empty() {
            write!(f, "/")?;
        }

        for element in &self.elements {
            write!(f, "/{element}")?;
        }

        if let Some(property) = &self.property {
            write!(f, ".{property}")?;
        }

        Ok(())
    }
}
