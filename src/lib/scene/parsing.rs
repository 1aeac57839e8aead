//! Text description of a [Scene], a small subset of the USD ASCII format:
//!
//! ```text
//! def Material "mat" {
//!     rel ai:surface = </mat/std>
//!     def Shader "std" {
//!         string handle = "standard"
//!         rel connectedSourceFor:kd_Color:r = </mat/tex.outputs:out>
//!         inputs:base_color.connect = </mat/tex.outputs:r>
//!         inputs:mix.connect = [</mat/a.outputs:out>, </mat/b.outputs:out>]
//!     }
//! }
//! ```

use pest::{error::LineColLocation, iterators::Pair, Parser, Span};
use pest_derive::Parser;

use super::{Prim, Scene};
use crate::path::Path;

/// Result of scene parsing.
pub type PResult<T> = Result<T, self::Error>;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} ({})", describe(.line))]
/// Scene parsing error with its location in the source text.
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong.
    pub line: LineColLocation,
}

impl Error {
    fn new(kind: ErrorKind, line: LineColLocation) -> Self {
        Self { kind, line }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
/// [Error] variants.
pub enum ErrorKind {
    #[error("syntax error: {0}")]
    /// The text does not follow the grammar.
    Syntax(Box<pest::error::Error<Rule>>),

    #[error(transparent)]
    /// Well-formed text describing an invalid scene.
    Scene(#[from] super::Error),
}

fn describe(line: &LineColLocation) -> String {
    match line {
        LineColLocation::Pos((line, col)) => format!("{line}:{col}"),
        LineColLocation::Span((line, col), (end_line, end_col)) => {
            format!("{line}:{col} to {end_line}:{end_col}")
        }
    }
}

#[derive(Parser)]
#[grammar = "lib/pest/grammar.pest"]
struct SParser;

/// Constructs a [Scene] from its text description.
pub fn parse_scene(text: &str) -> PResult<Scene> {
    let pairs = SParser::parse(Rule::scene, text).map_err(|err| {
        let line = err.line_col.clone();
        Error::new(ErrorKind::Syntax(Box::new(err)), line)
    })?;

    let mut scene = Scene::default();
    for pair in pairs.flat_map(|scene| scene.into_inner()) {
        if pair.as_rule() == Rule::prim {
            parse_prim(pair, &Path::root(), &mut scene)?;
        }
    }

    Ok(scene)
}

fn lcl_from_span(span: Span) -> LineColLocation {
    LineColLocation::Span(span.start_pos().line_col(), span.end_pos().line_col())
}

fn scene_error(err: impl Into<super::Error>, span: Span) -> Error {
    Error::new(ErrorKind::Scene(err.into()), lcl_from_span(span))
}

fn parse_prim(prim: Pair<Rule>, parent: &Path, scene: &mut Scene) -> PResult<()> {
    let span = prim.as_span();

    let mut type_name = "";
    let mut name = "";
    let mut statements = Vec::new();
    for inner in prim.into_inner() {
        match inner.as_rule() {
            Rule::type_name => type_name = inner.as_str(),
            Rule::string => name = string_value(inner),
            _ => statements.push(inner),
        }
    }

    let path = parent
        .append_child(name)
        .map_err(|err| scene_error(err, span))?;
    let mut res = Prim::new(path.clone(), type_name);

    // Children are added once their parent is known to be valid.
    let mut children = Vec::new();
    for statement in statements {
        match statement.as_rule() {
            Rule::prim => children.push(statement),
            Rule::handle => {
                let handle = statement.into_inner().next().map_or("", string_value);
                res = res.with_handle(handle);
            }
            Rule::relationship => {
                let (name, targets) = parse_property(statement)?;
                res = res.with_relationship(name, targets);
            }
            Rule::connection => {
                let (name, connections) = parse_property(statement)?;
                res = res.with_input(name, connections);
            }
            _ => {}
        }
    }

    scene.add_prim(res).map_err(|err| scene_error(err, span))?;

    for child in children {
        parse_prim(child, &path, scene)?;
    }

    Ok(())
}

fn parse_property(property: Pair<Rule>) -> PResult<(&str, Vec<Path>)> {
    let mut name = "";
    let mut targets = Vec::new();

    for inner in property.into_inner() {
        match inner.as_rule() {
            Rule::property => name = inner.as_str(),
            Rule::targets => targets = parse_targets(inner)?,
            _ => {}
        }
    }

    Ok((name, targets))
}

fn parse_targets(targets: Pair<Rule>) -> PResult<Vec<Path>> {
    targets
        .into_inner()
        .map(|target| {
            let span = target.as_span();
            let raw = target.into_inner().next().map_or("", |inner| inner.as_str());
            raw.parse::<Path>().map_err(|err| scene_error(err, span))
        })
        .collect()
}

fn string_value(string: Pair<Rule>) -> &str {
    string.into_inner().next().map_or("", |inner| inner.as_str())
}
