//! Output formatting - plaintext and JSON.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::engine::CountOutcome;
use crate::tree::{CountTree, Position};

const INDENT: &str = "  ";

/// Renders totals followed by the whole tree, one position per line.
///
/// Repeated dependencies are printed at every position with the shared
/// counts.
pub fn render_plain(tree: &CountTree) -> String {
    let root = tree.root_node();
    let totals = tree.total();
    let positions = tree.positions();

    let mut out = String::new();
    let _ = write!(
        out,
        "{} TOTALS:\n Methods: {}\n  Fields: {}\n",
        root.dependency, totals.methods, totals.fields
    );

    let name_width = positions
        .iter()
        .map(|&(p, depth)| tree.node_at(p).dependency.to_string().len() + depth * INDENT.len())
        .max()
        .unwrap_or(0)
        + 2;

    let _ = write!(out, "\n{:<width$}Methods  Fields\n", "Dependency", width = name_width);

    for (position, depth) in positions {
        let node = tree.node_at(position);
        let indent = INDENT.repeat(depth);
        let _ = writeln!(
            out,
            "{}{:<width$}  {:>5}   {:>5}",
            indent,
            node.dependency.to_string(),
            node.own_methods,
            node.own_fields,
            width = name_width - indent.len()
        );
    }

    out
}

fn position_json(tree: &CountTree, position: Position) -> Value {
    let node = tree.node_at(position);
    let dependents: Vec<Value> = tree
        .children(position)
        .into_iter()
        .map(|child| position_json(tree, child))
        .collect();

    json!({
        "dependency": node.dependency.to_string(),
        "location": node.location,
        "methods": node.own_methods,
        "fields": node.own_fields,
        "failed": node.failed,
        "dependents": dependents,
    })
}

/// Renders an outcome, partial or not, as a JSON document.
pub fn render_json(outcome: &CountOutcome) -> Value {
    let tree = &outcome.tree;
    json!({
        "root": tree.root_node().dependency.to_string(),
        "complete": outcome.is_complete(),
        "failed": outcome.failed,
        "error": outcome.error.as_ref().map(|e| e.to_string()),
        "totals": tree.total(),
        "unique_dependencies": tree.unique_count(),
        "tree": position_json(tree, tree.root()),
    })
}

/// Prints the plain report to stdout.
pub fn print_plain(tree: &CountTree) {
    print!("{}", render_plain(tree));
}

/// Prints the JSON report to stdout.
///
/// Falls back to compact output if pretty printing fails.
pub fn print_json(outcome: &CountOutcome) {
    let value = render_json(outcome);
    match serde_json::to_string_pretty(&value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{}", value);
        }
    }
}
