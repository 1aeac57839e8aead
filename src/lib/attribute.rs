//! Nested attribute tree handed to the renderer translation step.
//!
//! Children are addressed by dotted paths (`material.nodes.tex.connections`); groups hold named
//! children, every other variant is a leaf.

use std::collections::BTreeMap;

use derive_more::From;

#[derive(Clone, Debug, PartialEq, From)]
/// A single attribute, either a leaf value or a [GroupAttribute].
pub enum Attribute {
    /// Integer leaf.
    Int(i64),
    /// Floating point leaf.
    Float(f64),
    /// String leaf.
    String(String),
    /// Named children.
    Group(GroupAttribute),
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl Attribute {
    /// Whether the attribute is a [GroupAttribute].
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// The contained string, if this is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The contained group, if any.
    pub fn as_group(&self) -> Option<&GroupAttribute> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Group of named child [Attribute]s, kept sorted by name.
pub struct GroupAttribute {
    children: BTreeMap<String, Attribute>,
}

impl GroupAttribute {
    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterate over the direct children.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.children.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    /// Get the attribute at a dotted path below this group.
    pub fn get(&self, path: &str) -> Option<&Attribute> {
        let (head, tail) = match path.split_once('.') {
            Some((head, tail)) => (head, Some(tail)),
            None => (path, None),
        };

        let child = self.children.get(head)?;
        match tail {
            None => Some(child),
            Some(tail) => child.as_group()?.get(tail),
        }
    }

    /// Set the attribute at a dotted path, creating intermediate groups on the way. Leaves found
    /// where a group is needed are replaced.
    pub fn set(&mut self, path: &str, attr: Attribute) {
        match path.split_once('.') {
            None => {
                self.children.insert(path.to_owned(), attr);
            }
            Some((head, tail)) => {
                let child = self
                    .children
                    .entry(head.to_owned())
                    .or_insert_with(|| Attribute::Group(GroupAttribute::default()));

                match child {
                    Attribute::Group(group) => group.set(tail, attr),
                    leaf => {
                        let mut group = GroupAttribute::default();
                        group.set(tail, attr);
                        *leaf = Attribute::Group(group);
                    }
                }
            }
        }
    }

    /// Overlay `other` onto this group. Groups present on both sides are merged recursively,
    /// everything else is taken from `other`.
    pub fn deep_update(&mut self, other: GroupAttribute) {
        for (name, incoming) in other.children {
            match incoming {
                Attribute::Group(incoming) => match self.children.get_mut(&name) {
                    Some(Attribute::Group(existing)) => existing.deep_update(incoming),
                    _ => {
                        self.children.insert(name, Attribute::Group(incoming));
                    }
                },
                leaf => {
                    self.children.insert(name, leaf);
                }
            }
        }
    }

    /// All leaves below this group keyed by their dotted path.
    pub fn flatten(&self) -> BTreeMap<String, &Attribute> {
        let mut res = BTreeMap::new();
        self.flatten_into("", &mut res);
        res
    }

    fn flatten_into<'a>(&'a self, prefix: &str, res: &mut BTreeMap<String, &'a Attribute>) {
        for (name, attr) in self.children.iter() {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };

            match attr {
                Attribute::Group(group) => group.flatten_into(&path, res),
                leaf => {
                    res.insert(path, leaf);
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<Attribute>> FromIterator<(K, V)> for GroupAttribute {
    /// Collects `(dotted path, value)` pairs through [GroupAttribute::set].
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut group = Self::default();
        for (path, value) in iter {
            group.set(&path.into(), value.into());
        }
        group
    }
}

#[derive(Debug, Default)]
/// Accumulates `set` calls and only yields an attribute if something was set.
pub struct GroupBuilder {
    group: GroupAttribute,
}

impl GroupBuilder {
    /// Set a child at a dotted path.
    pub fn set(&mut self, path: &str, attr: impl Into<Attribute>) -> &mut Self {
        self.group.set(path, attr.into());
        self
    }

    /// The built group, or [None] when nothing was set.
    pub fn build(self) -> Option<Attribute> {
        (!self.group.is_empty()).then_some(Attribute::Group(self.group))
    }
}

/// Read/write access to the attribute tree of the location being cooked.
pub trait AttributeSink {
    /// Attribute currently stored at a dotted path.
    fn output_attr(&self, path: &str) -> Option<&Attribute>;
    /// Store an attribute at a dotted path, replacing whatever was there.
    fn set_attr(&mut self, path: &str, attr: Attribute);
}

#[derive(Clone, Debug, Default, PartialEq)]
/// In-memory [AttributeSink] backed by a root [GroupAttribute].
pub struct AttributeTree {
    /// Root group.
    pub root: GroupAttribute,
}

impl AttributeSink for AttributeTree {
    fn output_attr(&self, path: &str) -> Option<&Attribute> {
        self.root.get(path)
    }

    fn set_attr(&mut self, path: &str, attr: Attribute) {
        self.root.set(path, attr)
    }
}

/// Write `attr` at `path` without discarding existing data.
///
/// - [None] is a no-op.
/// - A group over an existing group is deep-merged, new values winning on collision.
/// - Anything else is written as is.
///
/// Returns whether anything was written.
pub fn update_or_create(sink: &mut dyn AttributeSink, path: &str, attr: Option<Attribute>) -> bool {
    let Some(attr) = attr else { return false };

    let attr = match (sink.output_attr(path), attr) {
        (Some(Attribute::Group(existing)), Attribute::Group(incoming)) => {
            let mut merged = existing.clone();
            merged.deep_update(incoming);
            Attribute::Group(merged)
        }
        (_, attr) => attr,
    };

    sink.set_attr(path, attr);
    true
}
