use std::fmt::Write;

use super::{Diagram, Direction, Edge, EdgeStyle, Group, Kind, Node, Statement};

const INDENT: &str = "    ";

/// Serializes a diagram to Mermaid source, one statement per line.
pub fn render(diagram: &Diagram) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", kind_keyword(diagram.kind), direction_keyword(diagram.direction));
    if let Some(comment) = &diagram.comment {
        let _ = writeln!(out, "{INDENT}%% {comment}");
        out.push('\n');
    }

    if !diagram.classes.is_empty() {
        for class in &diagram.classes {
            let _ = writeln!(out, "{INDENT}classDef {} {}", class.name, class.style);
        }
        out.push('\n');
    }

    render_statements(&mut out, &diagram.statements, 1);

    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

/// Wraps the rendered diagram in a fenced ```` ```mermaid ```` block.
pub fn render_fenced(diagram: &Diagram) -> String {
    format!("```mermaid\n{}```", render(diagram))
}

fn render_statements(out: &mut String, statements: &[Statement], depth: usize) {
    let indent = INDENT.repeat(depth);
    for statement in statements {
        match statement {
            Statement::Node(node) => {
                let _ = writeln!(out, "{indent}{}", node_ref(node));
            }
            Statement::Edge(edge) => {
                let _ = writeln!(out, "{indent}{}", edge_line(edge));
            }
            Statement::Group(group) => render_group(out, group, depth),
            Statement::Blank => out.push('\n'),
        }
    }
}

fn render_group(out: &mut String, group: &Group, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(
        out,
        "{indent}subgraph {}[\"{}\"]",
        group.id,
        escape_label(&group.label)
    );
    if let Some(direction) = group.direction {
        let _ = writeln!(out, "{indent}{INDENT}direction {}", direction_keyword(direction));
        out.push('\n');
    }
    render_statements(out, &group.statements, depth + 1);
    let _ = writeln!(out, "{indent}end");
}

fn node_ref(node: &Node) -> String {
    let mut text = node.id.clone();
    if let Some(label) = &node.label {
        let _ = write!(text, "[\"{}\"]", escape_label(label));
    }
    if let Some(class) = &node.class {
        let _ = write!(text, ":::{class}");
    }
    text
}

fn edge_line(edge: &Edge) -> String {
    let arrow = match edge.style {
        EdgeStyle::Solid => "-->",
        EdgeStyle::Dotted => "-.->",
        EdgeStyle::Thick => "==>",
    };
    let label = edge
        .label
        .as_deref()
        .map(|label| format!("|{}|", escape_edge_label(label)))
        .unwrap_or_default();
    format!("{} {arrow}{label} {}", node_ref(&edge.from), node_ref(&edge.to))
}

fn kind_keyword(kind: Kind) -> &'static str {
    match kind {
        Kind::Flowchart => "flowchart",
        Kind::Graph => "graph",
    }
}

fn direction_keyword(direction: Direction) -> &'static str {
    match direction {
        Direction::TopDown => "TD",
        Direction::TopBottom => "TB",
    }
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

fn escape_edge_label(label: &str) -> String {
    escape_label(label).replace('|', "#124;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::ClassDef;

    #[test]
    fn test_render_header_classes_and_statements() {
        let mut diagram = Diagram::new(Kind::Flowchart, Direction::TopDown);
        diagram.comment = Some("demo".to_string());
        diagram.classes.push(ClassDef::new("job", "fill:#fff"));
        diagram
            .statements
            .push(Statement::Node(Node::labeled("a", "A").class("job")));
        diagram.statements.push(Statement::Edge(Edge::link("a", "b")));

        let text = render(&diagram);

        assert_eq!(
            text,
            "flowchart TD\n    %% demo\n\n    classDef job fill:#fff\n\n    a[\"A\"]:::job\n    a --> b\n"
        );
    }

    #[test]
    fn test_render_group_with_direction() {
        let mut diagram = Diagram::new(Kind::Flowchart, Direction::TopDown);
        diagram.statements.push(Statement::Group(Group {
            id: "CI".into(),
            label: "CI".into(),
            direction: Some(Direction::TopBottom),
            statements: vec![Statement::Node(Node::bare("CI_trigger"))],
        }));

        let text = render(&diagram);

        assert!(text.contains("    subgraph CI[\"CI\"]\n        direction TB\n\n        CI_trigger\n    end\n"));
    }

    #[test]
    fn test_edge_styles_and_labels() {
        let dotted = Edge::new(
            Node::bare("job"),
            Node::labeled("job_out", "data").class("dataFlow"),
            EdgeStyle::Dotted,
        )
        .label("out");
        let thick = Edge::new(Node::bare("a"), Node::bare("b"), EdgeStyle::Thick).label("triggers");

        assert_eq!(edge_line(&dotted), "job -.->|out| job_out[\"data\"]:::dataFlow");
        assert_eq!(edge_line(&thick), "a ==>|triggers| b");
    }

    #[test]
    fn test_labels_are_escaped() {
        let node = Node::labeled("n", "say \"hi\"");
        assert_eq!(node_ref(&node), "n[\"say #quot;hi#quot;\"]");
        assert_eq!(escape_edge_label("a|b"), "a#124;b");
    }

    #[test]
    fn test_fenced_block() {
        let mut diagram = Diagram::new(Kind::Graph, Direction::TopDown);
        diagram.statements.push(Statement::Node(Node::bare("x")));

        assert_eq!(render_fenced(&diagram), "```mermaid\ngraph TD\n    x\n```");
    }
}
