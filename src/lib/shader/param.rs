//! Parameter path grammar.
//!
//! Scene-side parameter names use `:` to separate a parameter from its component
//! (`kd_Color:r`) or array element (`kd_Color:i2`). Renderer-side keys use `.` for components
//! (`kd_Color.r`) and `:` followed by the bare index for array elements (`kd_Color:2`).

use crate::diagnostics::SkipReason;

use std::{convert::Infallible, fmt::Display, str::FromStr};

/// Separates the segments of a scene-side parameter name.
pub const DELIMITER: char = ':';
/// Prefix of array element components, `i0`, `i1`...
pub const ARRAY_MARKER: char = 'i';
/// Separates a parameter from its channel in renderer-side keys.
pub const CHANNEL_SEPARATOR: char = '.';

/// Split a scene-side parameter name on [DELIMITER].
///
/// A trailing delimiter does not start a new segment, so `a` and `a:` both yield one segment and
/// `a:b` yields two. Three or more segments are a valid result that callers treat as
/// unsupported.
pub fn split(name: &str) -> Vec<&str> {
    let mut res = Vec::new();
    let mut rest = name;

    loop {
        match rest.find(DELIMITER) {
            None => {
                res.push(rest);
                break;
            }
            Some(pos) => {
                res.push(&rest[..pos]);
                if pos + 1 == rest.len() {
                    break;
                }
                rest = &rest[pos + 1..];
            }
        }
    }

    res
}

/// Whether a component names an array element rather than a channel. Empty components count as
/// array elements, matching how the host handles them.
pub fn is_array_component(component: &str) -> bool {
    component.is_empty() || component.starts_with(ARRAY_MARKER)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Sub-parameter addressed by a [ParameterPath].
pub enum Component {
    /// Channel of a tuple parameter, `r`, `g`, `b`, `a`, `x`, `y`, `z`.
    Channel(String),
    /// Array element, holding the index without its [ARRAY_MARKER].
    Element(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Parameter, optionally narrowed to one of its components.
pub struct ParameterPath {
    /// Parameter name.
    pub base: String,
    /// Addressed component, [None] for the whole parameter.
    pub component: Option<Component>,
}

impl ParameterPath {
    /// The whole parameter `base`.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_owned(),
            component: None,
        }
    }

    /// Channel `channel` of `base`.
    pub fn channel(base: &str, channel: &str) -> Self {
        Self {
            base: base.to_owned(),
            component: Some(Component::Channel(channel.to_owned())),
        }
    }

    /// Array element `index` of `base`.
    pub fn element(base: &str, index: &str) -> Self {
        Self {
            base: base.to_owned(),
            component: Some(Component::Element(index.to_owned())),
        }
    }

    /// From a scene-side component: `i<n>` is an array element, anything else a channel.
    pub fn from_component(base: &str, component: &str) -> Self {
        match component.strip_prefix(ARRAY_MARKER) {
            Some(index) => Self::element(base, index),
            None => Self::channel(base, component),
        }
    }

    /// Whether only a part of the parameter is addressed.
    pub fn is_partial(&self) -> bool {
        self.component.is_some()
    }

    /// The addressed channel, if any.
    pub fn channel_name(&self) -> Option<&str> {
        match &self.component {
            Some(Component::Channel(channel)) => Some(channel),
            _ => None,
        }
    }
}

impl Display for ParameterPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.component {
            None => write!(f, "{}", self.base),
            Some(Component::Channel(channel)) => {
                write!(f, "{}{CHANNEL_SEPARATOR}{channel}", self.base)
            }
            Some(Component::Element(index)) => write!(f, "{}{DELIMITER}{index}", self.base),
        }
    }
}

impl FromStr for ParameterPath {
    type Err = Infallible;

    /// Parses the renderer-side key syntax produced by [Display].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((base, channel)) = s.split_once(CHANNEL_SEPARATOR) {
            return Ok(Self::channel(base, channel));
        }

        Ok(match s.split_once(DELIMITER) {
            Some((base, index)) => Self::element(base, index),
            None => Self::new(s),
        })
    }
}

/// Render a renderer-side key from a base name and an optional scene-side component.
pub fn render(base: &str, component: Option<&str>) -> String {
    let path = match component {
        Some(component) => ParameterPath::from_component(base, component),
        None => ParameterPath::new(base),
    };

    path.to_string()
}

/// Target parameter of a typed input connection, from the input's base name.
pub fn target_parameter(input_name: &str) -> Result<ParameterPath, SkipReason> {
    match split(input_name).as_slice() {
        [base] => Ok(ParameterPath::new(base)),
        [_, component] if is_array_component(component) => Err(SkipReason::ArrayTarget),
        [base, component] => Ok(ParameterPath::channel(base, component)),
        _ => Err(SkipReason::TooManyTargetSegments),
    }
}

/// Source output component of a typed input connection, from the source property name.
/// [None] stands for the full output.
pub fn source_component(
    source_name: &str,
    output_name: &str,
) -> Result<Option<String>, SkipReason> {
    match split(source_name).as_slice() {
        [_, component] if is_array_component(component) => Err(SkipReason::ArraySource),
        [_, component] if *component == output_name => Ok(None),
        [_, component] => Ok(Some(component.to_string())),
        _ => Err(SkipReason::UnsupportedSourceShape),
    }
}

/// Target parameter of a legacy connection relationship, from the relationship name stripped of
/// its prefix. Only sub-parameter connections are expressed this way.
pub fn relationship_parameter(token: &str) -> Result<ParameterPath, SkipReason> {
    let Some((base, component)) = token.split_once(DELIMITER) else {
        return Err(SkipReason::NotSubParameter);
    };

    if component.is_empty() {
        return Err(SkipReason::MalformedComponent);
    }

    Ok(ParameterPath::from_component(base, component))
}
