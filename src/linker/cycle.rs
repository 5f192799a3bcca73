//! Cycle detection using depth-first search with three-colour marking
//!
//! 1. **WHITE** (unvisited): not yet reached
//! 2. **GRAY** (on the current path)
//! 3. **BLACK** (fully explored)
//!
//! Reaching a GRAY node closes a cycle; the current path from that node on is
//! the cycle's chain.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Result, link};

struct DfsContext<'a> {
    edges: &'a BTreeMap<String, BTreeSet<String>>,
    /// BLACK
    done: HashSet<&'a str>,
    /// GRAY nodes in visiting order
    path: Vec<&'a str>,
}

/// Fail with the first cycle found, visiting roots and neighbours in sorted order
pub fn detect_cycles(edges: &BTreeMap<String, BTreeSet<String>>) -> Result<()> {
    let mut ctx = DfsContext {
        edges,
        done: HashSet::new(),
        path: Vec::new(),
    };
    for node in edges.keys() {
        visit(&mut ctx, node)?;
    }
    Ok(())
}

fn visit<'a>(ctx: &mut DfsContext<'a>, node: &'a str) -> Result<()> {
    if ctx.done.contains(node) {
        return Ok(());
    }
    if let Some(start) = ctx.path.iter().position(|n| *n == node) {
        let mut chain: Vec<String> = ctx.path[start..].iter().map(|n| (*n).to_string()).collect();
        chain.push(node.to_string());
        return Err(link::cycle(chain));
    }

    ctx.path.push(node);
    let edges = ctx.edges;
    if let Some(neighbours) = edges.get(node) {
        for next in neighbours {
            visit(ctx, next)?;
        }
    }
    ctx.path.pop();
    ctx.done.insert(node);
    Ok(())
}
