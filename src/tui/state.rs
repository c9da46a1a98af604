//! Pure state transformations for the TUI (Functional Core)
//!
//! Only pure functions live here. The imperative shell (app.rs, mod.rs)
//! handles I/O and calls into these.

use crate::filter::ALL_CATEGORIES;
use crate::node::RoadmapNode;
use std::collections::HashMap;

// =============================================================================
// Rows - the visible tree flattened for a list widget
// =============================================================================

/// One line of the outline
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub node: &'a RoadmapNode,
    pub depth: usize,
    pub expanded: bool,
}

/// Nodes are expanded at depth 0 and collapsed below unless toggled
pub fn is_expanded(expanded: &HashMap<String, bool>, id: &str, depth: usize) -> bool {
    expanded.get(id).copied().unwrap_or(depth == 0)
}

/// Pre-order rows of `nodes`, skipping children of collapsed nodes
pub fn visible_rows<'a>(nodes: &'a [RoadmapNode], expanded: &HashMap<String, bool>) -> Vec<Row<'a>> {
    fn go<'a>(
        nodes: &'a [RoadmapNode],
        depth: usize,
        expanded: &HashMap<String, bool>,
        out: &mut Vec<Row<'a>>,
    ) {
        for node in nodes {
            let open = is_expanded(expanded, &node.id, depth);
            out.push(Row {
                node,
                depth,
                expanded: open,
            });
            if open {
                go(&node.children, depth + 1, expanded, out);
            }
        }
    }
    let mut out = Vec::new();
    go(nodes, 0, expanded, &mut out);
    out
}

/// Flip the expansion state of a node shown at `depth`
pub fn toggle_expanded(
    expanded: &HashMap<String, bool>,
    id: &str,
    depth: usize,
) -> HashMap<String, bool> {
    set_expanded(expanded, id, !is_expanded(expanded, id, depth))
}

pub fn set_expanded(expanded: &HashMap<String, bool>, id: &str, open: bool) -> HashMap<String, bool> {
    let mut out = expanded.clone();
    out.insert(id.to_string(), open);
    out
}

// =============================================================================
// Filter choices
// =============================================================================

/// "all", then the palette, then any other category found in the tree
pub fn category_cycle(palette: &[String], nodes: &[RoadmapNode]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    let found = crate::tree::categories(nodes);
    for c in palette.iter().chain(found.iter()) {
        if !c.is_empty() && !out.contains(c) {
            out.push(c.clone());
        }
    }
    out
}

/// Item after `current` in `options`, wrapping; the first item when
/// `current` isn't present
pub fn next_in_cycle(options: &[String], current: &str, forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let next = match options.iter().position(|o| o == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    Some(options[next].clone())
}

// =============================================================================
// Navigation - Pure index calculations
// =============================================================================

pub fn move_selection_up(current: usize) -> usize {
    current.saturating_sub(1)
}

pub fn move_selection_down(current: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + 1).min(max - 1)
    }
}

pub fn page_down(current: usize, page_size: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + page_size).min(max - 1)
    }
}

pub fn page_up(current: usize, page_size: usize) -> usize {
    current.saturating_sub(page_size)
}

/// Scroll offset that keeps the selection on screen
pub fn calculate_scroll_offset(selected: usize, current_offset: usize, visible_items: usize) -> usize {
    if visible_items == 0 {
        return 0;
    }
    if selected < current_offset {
        selected
    } else if selected >= current_offset + visible_items {
        selected + 1 - visible_items
    } else {
        current_offset
    }
}

/// Clamp selection index to valid range
pub fn clamp_selection(selected: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        selected.min(max - 1)
    }
}
