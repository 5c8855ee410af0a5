//! Report rendering.
//!
//! Depth-first, pre-order traversal of the aggregation tree in insertion
//! order. Each node emits `<key>:` at two spaces per depth level; nodes with
//! direct samples add a sub-line with mean, margin of error (both rounded to
//! five decimal places) and the sample count. An empty tree renders as the
//! empty string.

use crate::benchmark::Node;
use crate::measurement;

const HEADER: &str = "============ Benchmark results ============";
const FOOTER: &str = "===========================================";

pub(crate) fn render(nodes: &[Node], roots: &[usize]) -> String {
    if roots.is_empty() {
        return String::new();
    }
    let mut lines = vec![HEADER.to_owned()];
    for &id in roots {
        render_node(nodes, id, 0, &mut lines);
    }
    lines.push(FOOTER.to_owned());
    lines.join("\n")
}

fn render_node(nodes: &[Node], id: usize, depth: usize, lines: &mut Vec<String>) {
    let node = &nodes[id];
    let indent = "  ".repeat(depth);
    lines.push(format!("{indent}{}:", node.key));

    if !node.durations.is_empty() {
        lines.push(format!(
            "{indent}  {:.5} ms (+/- {:.5} ms) from {} iterations",
            measurement::mean(&node.durations),
            measurement::margin_of_error(&node.durations),
            node.durations.len(),
        ));
        if !node.children.is_empty() {
            // separator between a node's own results and its children
            lines.push(String::new());
        }
    }

    for &child in &node.children {
        render_node(nodes, child, depth + 1, lines);
    }
}
