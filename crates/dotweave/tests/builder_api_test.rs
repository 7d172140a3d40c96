//! Integration tests for the Dot builder API
//!
//! These tests build graphs through the public API only and compare the
//! emitted DOT text exactly.

use dotweave::{
    Dot, DotError, attrs,
    attribute::AttrValue,
    config::EmitConfig,
    identifier::{Markup, Nonce},
    port::{CompassPoint, Port},
};

#[test]
fn test_statement_order() {
    let mut dot = Dot::new();
    dot.root().graph(&attrs! { label = "Label" }).unwrap();

    let sub = {
        let mut root = dot.root();
        let mut sub = root.subgraph(Some("Subgraph1".into()));
        sub.graph(&attrs! { label = "SubLabel1" })
            .unwrap()
            .edge("c", "d", None, &attrs! {})
            .unwrap()
            .node("c", &attrs! {})
            .unwrap()
            .graph(&attrs! { rankdir = "LTR" })
            .unwrap()
            .edge_default(&attrs! { color = "red" })
            .unwrap()
            .node_default(&attrs! { shape = "circle" })
            .unwrap()
            .graph_default(&attrs! { dpi = 300 })
            .unwrap();
        sub.subgraph(Some("Subgraph1Sub".into()));
        sub.id()
    };

    let mut root = dot.root();
    root.subgraph(Some("Subgraph2".into()));
    root.edge("a", "b", None, &attrs! {})
        .unwrap()
        .node("a", &attrs! {})
        .unwrap()
        .graph(&attrs! { labelloc = "t" })
        .unwrap()
        .edge_default(&attrs! { color = "lime" })
        .unwrap()
        .node_default(&attrs! { shape = "square" })
        .unwrap()
        .graph_default(&attrs! { dpi = 72 })
        .unwrap();

    assert_eq!(dot.block(sub).unwrap().parent(), Some(dotweave::BlockId::ROOT));

    let expected = r#"graph {

    graph [dpi=72]
    node [shape=square]
    edge [color=lime]

    labelloc=t

    a

    a -- b

    subgraph Subgraph1 {

        graph [dpi=300]
        node [shape=circle]
        edge [color=red]

        rankdir=LTR

        c

        c -- d

        subgraph Subgraph1Sub {
        }

        label="SubLabel1"
    }

    subgraph Subgraph2 {
    }

    label="Label"
}
"#;
    assert_eq!(dot.emit().unwrap(), expected);
}

#[test]
fn test_theme_role_scenario() {
    let theme = Dot::new().into_shared();
    theme
        .write()
        .unwrap()
        .node_role("x", &attrs! { color = "red" })
        .unwrap();

    let mut dot = Dot::builder().with_directed(true).build().unwrap();
    dot.use_theme(Some(&theme)).unwrap();
    dot.root()
        .node_default(&attrs! { shape = "circle" })
        .unwrap()
        .node("a", &attrs! { role = "x" })
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "digraph {\n    node [shape=circle]\n    a [color=red]\n}\n"
    );
}

#[test]
fn test_theme_changes_after_assignment() {
    let theme = Dot::new().into_shared();
    theme
        .write()
        .unwrap()
        .root()
        .node_default(&attrs! { shape = "box" })
        .unwrap()
        .node("ignored", &attrs! {})
        .unwrap();

    let mut dot = Dot::new();
    dot.use_theme(Some(&theme)).unwrap();
    dot.root().node("a", &attrs! {}).unwrap();
    assert_eq!(dot.emit().unwrap(), "graph {\n    node [shape=box]\n    a\n}\n");

    theme
        .write()
        .unwrap()
        .root()
        .node_default(&attrs! { color = "red" })
        .unwrap()
        .graph(&attrs! { label = "Themed" })
        .unwrap();
    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    node [shape=box color=red]\n    a\n    label=\"Themed\"\n}\n"
    );

    dot.use_theme(None).unwrap();
    assert_eq!(dot.emit().unwrap(), "graph {\n    a\n}\n");
}

#[test]
fn test_own_values_override_theme() {
    let theme = Dot::new().into_shared();
    {
        let mut theme = theme.write().unwrap();
        theme
            .root()
            .edge_default(&attrs! { color = "gray", arrowhead = "vee" })
            .unwrap();
        theme.edge_role("weak", &attrs! { style = "dotted", color = "gray" }).unwrap();
    }

    let mut dot = Dot::builder().with_directed(true).build().unwrap();
    dot.use_theme(Some(&theme)).unwrap();
    dot.edge_role("weak", &attrs! { color = "black" }).unwrap();
    dot.root()
        .edge_default(&attrs! { color = "blue" })
        .unwrap()
        .edge("a", "b", None, &attrs! { penwidth = 2, role = "weak" })
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "digraph {\n    edge [color=blue arrowhead=vee]\n    a -> b [penwidth=2 style=dotted color=black]\n}\n"
    );
}

#[test]
fn test_undefined_role_reported_at_emission() {
    let mut dot = Dot::builder().with_id("G").build().unwrap();
    dot.root().graph(&attrs! { role = "cluster" }).unwrap();

    match dot.emit() {
        Err(DotError::UndefinedRole { role, entity, .. }) => {
            assert_eq!(role, "cluster");
            assert_eq!(entity, "G");
        }
        other => panic!("expected an undefined role, got {other:?}"),
    }

    dot.graph_role("cluster", &attrs! { style = "filled" }).unwrap();
    assert_eq!(dot.emit().unwrap(), "graph G {\n    style=filled\n}\n");
}

#[test]
fn test_nonce_scenario() {
    let first = Nonce::new();
    let second = Nonce::new();

    let mut dot = Dot::new();
    dot.root()
        .node("_nonce_1", &attrs! {})
        .unwrap()
        .node(&first, &attrs! {})
        .unwrap()
        .node(&second, &attrs! {})
        .unwrap()
        .node("_nonce_3", &attrs! {})
        .unwrap()
        .edge(&first, &second, None, &attrs! {})
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    _nonce_1\n    _nonce_2\n    _nonce_4\n    _nonce_3\n    _nonce_2 -- _nonce_4\n}\n"
    );
}

#[test]
fn test_multigraph_edges() {
    let mut dot = Dot::builder()
        .with_directed(true)
        .with_multigraph(true)
        .build()
        .unwrap();
    let mut root = dot.root();
    assert!(root.is_multigraph());

    root.edge("a", "b", None, &attrs! {})
        .unwrap()
        .edge("a", "b", None, &attrs! {})
        .unwrap()
        .edge("a", "b", Some("x".into()), &attrs! { color = "red" })
        .unwrap()
        .edge_update("a", "b", Some("x".into()), &attrs! { color = "blue" })
        .unwrap();

    assert!(matches!(
        root.edge_update("a", "b", Some("y".into()), &attrs! {}),
        Err(DotError::NotDefined { .. })
    ));
    assert_eq!(
        dot.emit().unwrap(),
        "digraph {\n    a -> b\n    a -> b\n    a -> b [color=blue]\n}\n"
    );
}

#[test]
fn test_subgraph_scoping() {
    let mut dot = Dot::new();
    let mut root = dot.root();
    root.subgraph(Some("s".into())).node("a", &attrs! {}).unwrap();
    root.subgraph(Some("t".into()))
        .subgraph(Some("s".into()))
        .node("b", &attrs! {})
        .unwrap();
    root.subgraph(Some("s".into())).node("c", &attrs! {}).unwrap();

    let expected = "\
graph {

    subgraph s {
        a
        c
    }

    subgraph t {
        subgraph s {
            b
        }
    }
}
";
    assert_eq!(dot.emit().unwrap(), expected);
}

#[test]
fn test_identifier_forms() {
    let mut dot = Dot::new();
    dot.root()
        .node("hello world", &attrs! {})
        .unwrap()
        .node("Graph", &attrs! {})
        .unwrap()
        .node(-3, &attrs! { width = 1.5, fixedsize = true })
        .unwrap()
        .node("say \"hi\"", &attrs! { label = "two\nlines" })
        .unwrap()
        .node(Markup::new("<i>m</i>"), &attrs! {})
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    \"hello world\"\n    \"Graph\"\n    -3 [width=1.5 fixedsize=true]\n    \"say \\\"hi\\\"\" [label=\"two\\nlines\"]\n    <<i>m</i>>\n}\n"
    );
}

#[test]
fn test_identity_is_normalized() {
    let mut dot = Dot::new();
    let mut root = dot.root();
    root.node(5, &attrs! { color = "red" }).unwrap();
    root.node("5", &attrs! { shape = "box" }).unwrap();
    root.node(true, &attrs! {}).unwrap();

    assert!(root.node_is_defined("true"));
    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    5 [color=red shape=box]\n    true\n}\n"
    );
}

#[test]
fn test_attribute_deletion_and_underscore() {
    let mut dot = Dot::new();
    dot.root()
        .node("a", &attrs! { color = "red", shape = "box", class_ = "required" })
        .unwrap()
        .node("a", &attrs! { color = AttrValue::Delete })
        .unwrap()
        .node("a", &attrs! { color = "blue" })
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    a [shape=box class=required color=blue]\n}\n"
    );
}

#[test]
fn test_ports_follow_explicit_endpoints() {
    let mut dot = Dot::builder().with_directed(true).build().unwrap();
    dot.root()
        .edge(
            Port::new("a").with_name("p").with_compass(CompassPoint::N),
            "b",
            None,
            &attrs! {},
        )
        .unwrap()
        .edge("a", Port::new("b").with_compass(CompassPoint::S), None, &attrs! {})
        .unwrap()
        .edge(Port::new("c").with_name("ne"), "d", None, &attrs! {})
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "digraph {\n    a:p:n -> b:s\n    c:\"ne\" -> d\n}\n"
    );
}

#[test]
fn test_undirected_reversal_takes_latest_order() {
    let mut dot = Dot::new();
    dot.root()
        .edge("x", "y", None, &attrs! {})
        .unwrap()
        .edge(Port::new("y").with_name("q"), "x", None, &attrs! { color = "red" })
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    y:q -- x [color=red]\n}\n"
    );
}

#[test]
fn test_endpoint_swapping() {
    let mut dot = Dot::new();
    let mut root = dot.root();
    for (tail, head) in [("a", "b"), ("c", "d"), ("e", "f"), ("g", "h")] {
        root.edge(tail, head, None, &attrs! {}).unwrap();
    }
    root.edge("b", "a", None, &attrs! {})
        .unwrap()
        .edge(Port::new("d"), "c", None, &attrs! {})
        .unwrap()
        .edge("f", Port::new("e"), None, &attrs! {})
        .unwrap()
        .edge(Port::new("h"), Port::new("g"), None, &attrs! {})
        .unwrap();

    assert_eq!(
        dot.emit().unwrap(),
        "graph {\n    b -- a\n    d -- c\n    f -- e\n    h -- g\n}\n"
    );
}

#[test]
fn test_reversal_keeps_recorded_ports() {
    let mut dot = Dot::new();
    dot.root()
        .edge(Port::new("a").with_compass(CompassPoint::N), "b", None, &attrs! {})
        .unwrap()
        .edge("b", "a", None, &attrs! {})
        .unwrap();

    assert_eq!(dot.emit().unwrap(), "graph {\n    b -- a:n\n}\n");
}

#[test]
fn test_copy_is_independent() {
    let mut dot = Dot::builder()
        .with_id("G")
        .with_comment("original")
        .build()
        .unwrap();
    dot.root().node("a", &attrs! {}).unwrap();

    let mut copy = dot.copy_with(Some("H".into()), Some("copy\n".to_string()));
    copy.root().node("b", &attrs! {}).unwrap();

    assert_eq!(dot.emit().unwrap(), "// original\n\ngraph G {\n    a\n}\n");
    assert_eq!(copy.emit().unwrap(), "// copy\n\ngraph H {\n    a\n    b\n}\n");
}

#[test]
fn test_write_to_and_config() {
    let mut dot = Dot::new();
    dot.root()
        .node("a", &attrs! { tooltip = "tip", xlabel = "x" })
        .unwrap();

    let config = EmitConfig::default().with_text_attributes(["tooltip"]);
    let mut buffer = Vec::new();
    dot.write_to(&mut buffer, &config).unwrap();

    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "graph {\n    a [tooltip=\"tip\" xlabel=x]\n}\n"
    );
}
