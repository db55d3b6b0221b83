//! Line-level QGL statements: `edge ...` and `<kind> <id> <label> [tail]`.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Edge, EdgeType, Node, NodeType, Value};
use super::props;

static EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^edge\s+([A-Za-z0-9_][A-Za-z0-9_-]*)\s*->\s*([A-Za-z0-9_][A-Za-z0-9_-]*)\s*:\s*(\w+)\s*$")
        .expect("valid regex")
});

static HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(goal|task|data|transform|metric|deliverable|constraint|test)\s+([A-Za-z0-9_][A-Za-z0-9_-]*)(?:\s+|$)")
        .expect("valid regex")
});

static QUOTED_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"([^"]+)"\s*(.*)$"#).expect("valid regex"));

static BARE_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_-]*)\s*(.*)$").expect("valid regex"));

/// One compiled source line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Node(Node),
    Edge(Edge),
}

/// Parse one trimmed, non-comment line. Errors are bare messages; the
/// caller attaches the line number.
pub fn parse_line(line: &str) -> Result<Statement, String> {
    let is_edge = line
        .strip_prefix("edge")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace));
    if is_edge {
        parse_edge(line).map(Statement::Edge)
    } else {
        parse_node(line).map(Statement::Node)
    }
}

fn parse_edge(line: &str) -> Result<Edge, String> {
    let caps = EDGE_RE
        .captures(line)
        .ok_or_else(|| format!("invalid edge syntax: {line}"))?;
    let edge_type: EdgeType = caps[3].parse()?;
    Ok(Edge::new(&caps[1], &caps[2], edge_type))
}

fn parse_node(line: &str) -> Result<Node, String> {
    let head = HEAD_RE
        .captures(line)
        .ok_or_else(|| format!("invalid statement: {line}"))?;
    let node_type = NodeType::from_keyword(&head[1])
        .ok_or_else(|| format!("invalid statement: {line}"))?;
    let id = head[2].to_owned();
    let rest = line[head[0].len()..].trim();

    let (label, tail) = split_label(rest).ok_or_else(|| {
        if rest.starts_with('"') {
            format!("unclosed label in: {line}")
        } else {
            format!("missing label in: {line}")
        }
    })?;

    let mut node = Node::new(id, node_type, label);
    let tail = tail.trim();
    if tail.starts_with('{') {
        node.properties = props::parse_object(tail)?;
    } else if let Some(expr) = tail.strip_prefix(":=") {
        let expr = expr.trim();
        if !expr.is_empty() {
            node.properties.insert("expr".into(), Value::from(expr));
        }
    } else if !tail.is_empty() {
        return Err(format!("unexpected trailing tokens: {tail}"));
    }
    Ok(node)
}

/// Split `rest` into (label, tail). A leading quoted string wins over a
/// bare word.
fn split_label(rest: &str) -> Option<(&str, &str)> {
    let re = if rest.starts_with('"') { &QUOTED_LABEL_RE } else { &BARE_LABEL_RE };
    let caps = re.captures(rest)?;
    let label = caps.get(1)?.as_str();
    let tail = caps.get(2).map_or("", |m| m.as_str());
    Some((label, tail))
}
