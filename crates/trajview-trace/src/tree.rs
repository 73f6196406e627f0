//! Parent/child reconstruction over a flat span list.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use trajview_core::Span;

/// Span id to span. Later records with the same id replace earlier ones.
pub type SpanIndex = HashMap<String, Arc<Span>>;

/// Deepest nesting the forest keeps. Matches serde_json's default recursion
/// limit, so every derived impl on [`SpanNode`] stays within the stack.
pub const MAX_DEPTH: usize = 128;

/// A span together with its children, in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanNode {
    #[serde(flatten)]
    pub span: Arc<Span>,
    pub children: Vec<SpanNode>,
}

impl SpanNode {
    fn leaf(span: &Arc<Span>) -> Self {
        Self {
            span: Arc::clone(span),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.span.id
    }

    /// Number of spans in this subtree, including this one.
    pub fn size(&self) -> usize {
        self.walk().len()
    }

    /// Depth-first, pre-order walk of the subtree.
    pub fn walk(&self) -> Vec<&SpanNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

pub fn index_spans(spans: &[Arc<Span>]) -> SpanIndex {
    let mut index = HashMap::with_capacity(spans.len());
    for span in spans {
        if index.insert(span.id.clone(), Arc::clone(span)).is_some() {
            tracing::warn!(span_id = %span.id, "Duplicate span id, keeping the later record");
        }
    }
    index
}

/// Whether `span` is the record `index` holds for its id.
pub(crate) fn is_indexed(index: &SpanIndex, span: &Arc<Span>) -> bool {
    index.get(&span.id).is_some_and(|kept| Arc::ptr_eq(kept, span))
}

type ChildIndex<'a> = HashMap<&'a str, Vec<&'a Arc<Span>>>;

/// Builds the forest of root nodes.
///
/// Spans with no parent, or with a parent id that is not in `index`, are
/// roots. Every indexed span is placed exactly once: descent stops at spans
/// already placed and below [`MAX_DEPTH`] levels. Spans left over, either
/// inside a parent cycle or under a cut, become roots after the regular ones.
pub fn build_forest(spans: &[Arc<Span>], index: &SpanIndex) -> Vec<SpanNode> {
    let live: Vec<&Arc<Span>> = spans.iter().filter(|s| is_indexed(index, s)).collect();

    let mut children: ChildIndex = HashMap::new();
    let mut roots = Vec::new();
    for &span in &live {
        match span.parent().filter(|p| index.contains_key(*p)) {
            Some(parent) => children.entry(parent).or_default().push(span),
            None => roots.push(span),
        }
    }

    let mut builder = ForestBuilder {
        children: &children,
        visited: HashSet::with_capacity(live.len()),
        depth_cuts: 0,
    };
    let mut forest: Vec<SpanNode> = Vec::with_capacity(roots.len());
    for root in roots {
        forest.extend(builder.build(root));
    }

    let stranded: Vec<&Arc<Span>> = live
        .iter()
        .copied()
        .filter(|s| !builder.visited.contains(s.id.as_str()))
        .collect();
    if !stranded.is_empty() {
        tracing::warn!(
            count = stranded.len(),
            first = %stranded[0].id,
            "Spans unreachable from any root (parent cycle or nesting limit), promoting to roots"
        );
        for span in stranded {
            forest.extend(builder.build(span));
        }
    }

    if builder.depth_cuts > 0 {
        tracing::warn!(
            cuts = builder.depth_cuts,
            max_depth = MAX_DEPTH,
            "Span nesting exceeds the depth limit, deeper subtrees were split off"
        );
    }

    forest
}

struct ForestBuilder<'a> {
    children: &'a ChildIndex<'a>,
    visited: HashSet<&'a str>,
    depth_cuts: usize,
}

/// A node under construction and the children it has yet to descend into.
struct Frame<'a> {
    node: SpanNode,
    pending: std::slice::Iter<'a, &'a Arc<Span>>,
}

impl<'a> ForestBuilder<'a> {
    fn frame(&self, span: &'a Arc<Span>) -> Frame<'a> {
        let children: &'a ChildIndex<'a> = self.children;
        let pending = children
            .get(span.id.as_str())
            .map_or(&[][..], Vec::as_slice)
            .iter();
        Frame {
            node: SpanNode::leaf(span),
            pending,
        }
    }

    /// Places `root` and everything below it that is not placed yet.
    fn build(&mut self, root: &'a Arc<Span>) -> Option<SpanNode> {
        if !self.visited.insert(root.id.as_str()) {
            return None;
        }

        let mut stack = vec![self.frame(root)];
        loop {
            let depth = stack.len();
            let frame = stack.last_mut()?;
            let next = if depth < MAX_DEPTH {
                frame.pending.next()
            } else {
                if frame.pending.len() > 0 {
                    self.depth_cuts += 1;
                }
                None
            };

            match next {
                Some(&child) => {
                    if self.visited.insert(child.id.as_str()) {
                        stack.push(self.frame(child));
                    }
                }
                None => {
                    let done = stack.pop()?.node;
                    match stack.last_mut() {
                        Some(parent) => parent.node.children.push(done),
                        None => return Some(done),
                    }
                }
            }
        }
    }
}
