//! Prints the span tree, timeline, and flow graph of a trajectory file.
//!
//! Run with: cargo run --example inspect_trace -- [path/to/file.traj]
//! Defaults to demos/test-trace.traj.

use std::path::PathBuf;

use trajview::prelude::*;

fn print_node(node: &SpanNode, depth: usize) {
    let span = &node.span;
    println!(
        "{}{} [{}] {} ({})",
        "  ".repeat(depth),
        span.label(),
        span.kind(),
        span.id,
        span.duration()
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/test-trace.traj"));

    let mut session = TraceSession::new();
    let loaded = session.load_path(&path)?;
    let model = loaded.model.clone();

    let summary = model.summary();
    println!("{} ({})", summary.name, summary.id);
    println!("{} spans, {} roots\n", summary.span_count, summary.root_count);

    for root in model.roots() {
        print_node(root, 0);
    }

    println!("\nTimeline:");
    for entry in timeline(&model, None) {
        println!("  {:<24} {:>8}  {}", entry.started, entry.duration, entry.title);
        if !entry.summary.is_empty() {
            println!("  {:<24} {:>8}  {}", "", "", entry.summary);
        }
    }

    let config = LayoutConfig::default();
    let graph = project(&model, None, &config).layout_with(&RankedLayout, &config);
    println!("\nGraph:");
    for node in &graph.nodes {
        println!("  {:<16} at ({:.0}, {:.0})", node.id, node.position.x, node.position.y);
    }
    for edge in &graph.edges {
        let marker = if edge.emphasized { " (handoff)" } else { "" };
        println!("  {} -> {}{}", edge.source, edge.target, marker);
    }

    Ok(())
}
