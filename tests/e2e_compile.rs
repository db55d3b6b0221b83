//! End-to-end tests for the QGL compiler.
//!
//! Each test feeds a full program through `compile` and inspects the TGIR.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use qeva::{compile, compile_with, CompileOptions, EdgeType, Error, Graph, NodeType, Value, TGIR_SCHEMA};

const PROGRAM: &str = r#"
// Launch plan
goal g1 "Ship MVP"
task t1 "Write parser" {owner: "ana", estimate: 3, tags: [core, "v1"]}
data d1 dataset
metric m1 "Latency p95" := p95(latency) < 200
deliverable r1 "Launch report"
constraint c1 "Budget cap" {required: true}
test k1 "Smoke" {pass: true}

edge t1 -> g1 : refines
edge r1 -> d1 : cites
edge k1 -> r1 : evaluates
edge t1 -> r1 : produces
"#;

// ============================================================================
// 1. A realistic program compiles in order
// ============================================================================

#[test]
fn test_full_program_structure() {
    let g = compile(PROGRAM).unwrap();

    let ids: Vec<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "t1", "d1", "m1", "r1", "c1", "k1"]);

    let types: Vec<NodeType> = g.nodes.iter().map(|n| n.node_type).collect();
    assert_eq!(
        types,
        vec![
            NodeType::Goal,
            NodeType::Task,
            NodeType::Data,
            NodeType::Metric,
            NodeType::Deliverable,
            NodeType::Constraint,
            NodeType::Test,
        ]
    );

    let edges: Vec<EdgeType> = g.edges.iter().map(|e| e.edge_type).collect();
    assert_eq!(edges, vec![EdgeType::Refines, EdgeType::Cites, EdgeType::Evaluates, EdgeType::Produces]);
    assert!(g.dangling_edges().is_empty());
    assert_eq!(g.schema.as_deref(), Some(TGIR_SCHEMA));
}

// ============================================================================
// 2. Property literals and expressions
// ============================================================================

#[test]
fn test_properties_decoded() {
    let g = compile(PROGRAM).unwrap();

    let task = g.node("t1").unwrap();
    assert_eq!(task.label, "Write parser");
    assert_eq!(task.get("owner"), Some(&Value::String("ana".into())));
    assert_eq!(task.get("estimate"), Some(&Value::Int(3)));
    assert_eq!(
        task.get("tags"),
        Some(&Value::List(vec![Value::String("core".into()), Value::String("v1".into())]))
    );

    let metric = g.node("m1").unwrap();
    assert_eq!(metric.get("expr"), Some(&Value::String("p95(latency) < 200".into())));

    assert_eq!(g.node("d1").unwrap().label, "dataset");
    assert_eq!(g.node("c1").unwrap().get("required"), Some(&Value::Bool(true)));
}

// ============================================================================
// 3. JSON wire shape
// ============================================================================

#[test]
fn test_wire_shape_round_trips() {
    let g = compile("goal g1 \"Ship MVP\"\nedge g1 -> g1 : refines").unwrap();
    let json = serde_json::to_value(&g).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "nodes": [{"id": "g1", "type": "Goal", "label": "Ship MVP"}],
            "edges": [{"from": "g1", "to": "g1", "type": "refines"}],
            "$schema": TGIR_SCHEMA
        })
    );
    let back: Graph = serde_json::from_value(json).unwrap();
    assert_eq!(back, g);
}

// ============================================================================
// 4. Errors stop at the first bad line
// ============================================================================

#[test]
fn test_errors_report_line_numbers() {
    let cases = [
        ("goal g1 \"A\"\nedge g1 -> : refines", 2, "invalid edge syntax"),
        ("goal g1 \"A\"\n\nedge g1 -> g1 : blocks", 3, "unknown edge type"),
        ("widget w1 \"A\"", 1, "invalid statement"),
        ("goal g1 \"unclosed", 1, "unclosed label"),
        ("goal g1", 1, "missing label"),
        ("goal g1 \"A\" extra", 1, "unexpected trailing tokens"),
        ("goal g1 \"A\" {broken", 1, "invalid properties object"),
        ("goal g1 \"A\"\ngoal g1 \"B\"", 2, "duplicate node id"),
    ];
    for (src, expected_line, fragment) in cases {
        match compile(src) {
            Err(Error::Parse { line_no, message, .. }) => {
                assert_eq!(line_no, expected_line, "{src}");
                assert!(message.contains(fragment), "{src}: {message}");
            }
            other => panic!("Expected parse error for {src:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_duplicate_ids_allowed_when_configured() {
    let opts = CompileOptions { allow_duplicate_ids: true };
    let g = compile_with("goal g1 \"A\"\ngoal g1 \"B\"", &opts).unwrap();
    assert_eq!(g.nodes.len(), 2);
}

// ============================================================================
// 5. Determinism
// ============================================================================

fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,7}",
        "[A-Za-z][A-Za-z0-9 ,:{}-]{0,14}".prop_map(|l| format!("\"{l}\"")),
    ]
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,4}(\\.[0-9]{1,2})?",
        "[a-z][a-z0-9_]{0,6}",
        "[a-z ,:]{0,10}".prop_map(|s| format!("\"{s}\"")),
        Just("true".to_owned()),
        Just("false".to_owned()),
        prop::collection::vec("[a-z0-9]{1,4}", 0..4).prop_map(|items| format!("[{}]", items.join(", "))),
    ]
}

/// Empty, a `{k: v, ...}` object, or a `:=` expression.
fn tail() -> impl Strategy<Value = String> {
    let object = prop::collection::vec(("[a-z][a-z_]{0,5}", literal()), 0..5).prop_map(|entries| {
        let body: Vec<String> = entries.into_iter().map(|(k, v)| format!("{k}: {v}")).collect();
        format!(" {{{}}}", body.join(", "))
    });
    prop_oneof![
        Just(String::new()),
        object,
        "[a-z0-9 ()<>+*.]{0,16}".prop_map(|e| format!(" := {e}")),
    ]
}

fn program() -> impl Strategy<Value = String> {
    let nodes = prop::collection::vec((0..NodeType::ALL.len(), label(), tail(), prop::bool::ANY), 0..10);
    let edges = prop::collection::vec((0..12usize, 0..12usize, 0..EdgeType::ALL.len()), 0..10);
    (nodes, edges).prop_map(|(nodes, edges)| {
        let mut src = String::new();
        for (i, (t, label, tail, commented)) in nodes.iter().enumerate() {
            if *commented {
                src.push_str("// next node\n\n");
            }
            src.push_str(&format!("{} n{i} {label}{tail}\n", NodeType::ALL[*t].keyword()));
        }
        for (a, b, t) in edges {
            src.push_str(&format!("edge n{a} -> n{b} : {}\n", EdgeType::ALL[t]));
        }
        src
    })
}

proptest! {
    #[test]
    fn prop_compile_deterministic(src in program()) {
        let first = compile(&src).unwrap();
        prop_assert_eq!(first.nodes.len(), src.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_lowercase()) && !l.starts_with("edge ")).count());
        let second = compile(&src).unwrap();
        prop_assert_eq!(first, second);
    }
}
