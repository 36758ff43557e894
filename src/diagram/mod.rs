//! Intermediate Mermaid graph model.
//!
//! Builders decide which nodes, edges and groups exist; [`render_fenced`] turns the
//! result into Mermaid text. Keeping the two apart means graph construction can
//! be tested without string matching on formatting details.

mod mermaid;

use std::collections::BTreeMap;

#[cfg(test)]
pub use mermaid::render;
pub use mermaid::render_fenced;

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// Mermaid identifiers reject most punctuation, so this is applied to every
/// id derived from free text (workflow, job, output and module names).
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Groups distinct names that sanitize to the same identifier.
///
/// Returns only ids shared by two or more names; each name list is sorted.
pub fn collisions<'a, I>(names: I) -> BTreeMap<String, Vec<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_id: BTreeMap<String, Vec<&'a str>> = BTreeMap::new();
    for name in names {
        let entry = by_id.entry(sanitize(name)).or_default();
        if !entry.contains(&name) {
            entry.push(name);
        }
    }
    by_id.retain(|_, names| {
        names.sort_unstable();
        names.len() > 1
    });
    by_id
}

/// Truncates to at most `max` characters (not bytes).
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `flowchart`, supports subgraph `direction` and class styling
    Flowchart,
    /// legacy `graph` keyword
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    TopBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// `-->`
    Solid,
    /// `-.->`
    Dotted,
    /// `==>`
    Thick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub style: String,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: style.into(),
        }
    }
}

/// Node reference. Without a label it renders as a bare id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: Option<String>,
    pub class: Option<String>,
}

impl Node {
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            class: None,
        }
    }

    pub fn labeled(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            class: None,
        }
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: Node,
    pub to: Node,
    pub style: EdgeStyle,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(from: Node, to: Node, style: EdgeStyle) -> Self {
        Self {
            from,
            to,
            style,
            label: None,
        }
    }

    /// Solid edge between two already declared ids.
    pub fn link(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Node::bare(from), Node::bare(to), EdgeStyle::Solid)
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A `subgraph ... end` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub direction: Option<Direction>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Node(Node),
    Edge(Edge),
    Group(Group),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub kind: Kind,
    pub direction: Direction,
    pub comment: Option<String>,
    pub classes: Vec<ClassDef>,
    pub statements: Vec<Statement>,
}

impl Diagram {
    pub fn new(kind: Kind, direction: Direction) -> Self {
        Self {
            kind,
            direction,
            comment: None,
            classes: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// All edges, including those nested in groups, in statement order.
    #[cfg(test)]
    pub fn edges(&self) -> Vec<&Edge> {
        fn collect<'a>(statements: &'a [Statement], out: &mut Vec<&'a Edge>) {
            for statement in statements {
                match statement {
                    Statement::Edge(edge) => out.push(edge),
                    Statement::Group(group) => collect(&group.statements, out),
                    Statement::Node(_) | Statement::Blank => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.statements, &mut out);
        out
    }

    /// Top-level groups in statement order.
    #[cfg(test)]
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Whether an edge `from --> to` exists anywhere in the diagram.
    #[cfg(test)]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges()
            .iter()
            .any(|edge| edge.from.id == from && edge.to.id == to)
    }
}
