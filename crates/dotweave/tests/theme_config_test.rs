//! Integration tests for themes loaded from configuration
//!
//! These tests verify that a theme described in TOML can be shared between
//! graphs and handed to a renderer.

use std::{
    fs,
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

use dotweave::{
    Dot, attrs,
    config::{DotConfig, ThemeConfig},
    render::{OutputFormat, RenderRequest},
};

const THEME: &str = r#"
[graph]
fontname = "Helvetica"

[defaults.node]
shape = "box"

[roles.node.db]
shape = "cylinder"

[roles.edge.async]
style = "dashed"
"#;

#[test]
fn test_theme_shared_between_graphs() {
    let theme = ThemeConfig::from_toml_str(THEME)
        .unwrap()
        .build()
        .unwrap()
        .into_shared();

    let mut first = Dot::builder().with_directed(true).build().unwrap();
    first.use_theme(Some(&theme)).unwrap();
    first
        .root()
        .node("store", &attrs! { role = "db" })
        .unwrap()
        .edge("api", "store", None, &attrs! { role = "async" })
        .unwrap();

    let mut second = first.copy_with(Some("Copy".into()), None);
    second.root().node("cache", &attrs! { role = "db" }).unwrap();

    assert_eq!(
        first.emit().unwrap(),
        "digraph {\n    node [shape=box]\n    fontname=Helvetica\n    store [shape=cylinder]\n    api -> store [style=dashed]\n}\n"
    );
    assert_eq!(
        second.emit().unwrap(),
        "digraph Copy {\n    node [shape=box]\n    fontname=Helvetica\n    store [shape=cylinder]\n    cache [shape=cylinder]\n    api -> store [style=dashed]\n}\n"
    );

    theme
        .write()
        .unwrap()
        .node_role("db", &attrs! { color = "brown" })
        .unwrap();
    assert!(second.emit().unwrap().contains("cache [shape=cylinder color=brown]"));
}

#[test]
fn test_config_file_drives_emission_and_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dotweave.toml");
    fs::write(
        &path,
        r#"
[emit]
indent = 2

[render]
program = "neato"
directory = "/usr/local/bin"
format = "SVG"
size = "5,5"
"#,
    )
    .unwrap();

    let config = DotConfig::load(&path).unwrap();
    let mut dot = Dot::new();
    dot.root().subgraph(None).node("a", &attrs! {}).unwrap();

    let request = RenderRequest::with_config(&dot, config.render(), config.emit()).unwrap();
    assert_eq!(request.input(), "graph {\n  subgraph {\n    a\n  }\n}\n");
    assert_eq!(request.arguments(), &["-Tsvg".to_string(), "-Gsize=5,5".to_string()]);
    assert_eq!(
        request.program(),
        std::path::Path::new("/usr/local/bin/neato")
    );
    assert_eq!(config.render().format(), &OutputFormat::new("svg"));
}

#[test]
fn test_missing_theme_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ThemeConfig::load(dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_emission_waits_for_theme_update() {
    let theme = ThemeConfig::from_toml_str(THEME)
        .unwrap()
        .build()
        .unwrap()
        .into_shared();
    let mut dot = Dot::new();
    dot.use_theme(Some(&theme)).unwrap();
    dot.root().node("store", &attrs! { role = "db" }).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let writer = {
        let theme = Arc::clone(&theme);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let mut theme = theme.write().unwrap();
            barrier.wait();
            thread::sleep(Duration::from_millis(100));
            theme
                .node_role("db", &attrs! { shape = "box3d" })
                .unwrap();
        })
    };

    barrier.wait();
    let text = dot.emit().unwrap();
    writer.join().unwrap();

    assert_eq!(
        text,
        "graph {\n    node [shape=box]\n    fontname=Helvetica\n    store [shape=box3d]\n}\n"
    );
}
