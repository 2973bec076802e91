//! Outline (bookmark) tree model and visibility editor
//!
//! The outline is loaded into an arena of nodes addressed by index, with
//! `First`/`Next` links stored as plain indices. An object reachable along
//! several paths maps to a single slot, so back references show up as cycles
//! in the arena and are caught by an index-keyed path set during the walk.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::pdf_document::PdfDocument;
use crate::types::{object_ref, WarningCollector, WarningScope};

/// Default bound on node visits per document
pub const DEFAULT_MAX_VISITS: usize = 100_000;

/// One bookmark entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub id: ObjectId,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
    /// Raw `Count` entry, if any
    pub count: Option<i64>,
}

/// Arena view of an outline tree
#[derive(Debug, Clone)]
pub struct OutlineTree {
    root: ObjectId,
    first_top_level: Option<usize>,
    nodes: Vec<OutlineNode>,
    index: HashMap<ObjectId, usize>,
}

impl OutlineTree {
    /// Load the outline tree below `root`. Malformed links are reported to
    /// `warnings` and treated as absent.
    pub fn load(document: &PdfDocument, root: ObjectId, warnings: &mut WarningCollector) -> Option<Self> {
        let root_dict = match document.document().get_object(root).and_then(Object::as_dict) {
            Ok(dict) => dict,
            Err(e) => {
                warnings.push(WarningScope::Outline, object_ref(root), format!("outline root is unreadable: {}", e));
                return None;
            }
        };

        let mut tree = Self {
            root,
            first_top_level: None,
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        let mut pending = Vec::new();

        if let Some(first) = tree.link(document, root, root_dict, b"First", warnings) {
            tree.first_top_level = Some(tree.intern(first, &mut pending));
        }

        while let Some(idx) = pending.pop() {
            let id = tree.nodes[idx].id;
            let dict = match document.document().get_object(id).and_then(Object::as_dict) {
                Ok(dict) => dict,
                Err(_) => continue,
            };

            let first = tree
                .link(document, id, dict, b"First", warnings)
                .map(|child| tree.intern(child, &mut pending));
            let next = tree
                .link(document, id, dict, b"Next", warnings)
                .map(|sibling| tree.intern(sibling, &mut pending));
            let count = match dict.get(b"Count") {
                Ok(value) => match value.as_i64() {
                    Ok(count) => Some(count),
                    Err(_) => {
                        warnings.push(WarningScope::Outline, object_ref(id), "Count is not an integer");
                        None
                    }
                },
                Err(_) => None,
            };

            let node = &mut tree.nodes[idx];
            node.first_child = first;
            node.next_sibling = next;
            node.count = count;
        }

        Some(tree)
    }

    fn intern(&mut self, id: ObjectId, pending: &mut Vec<usize>) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(OutlineNode {
            id,
            first_child: None,
            next_sibling: None,
            count: None,
        });
        self.index.insert(id, idx);
        pending.push(idx);
        idx
    }

    /// Resolve a `First`/`Next` entry to the id of an outline dictionary
    fn link(
        &self,
        document: &PdfDocument,
        owner: ObjectId,
        dict: &Dictionary,
        key: &[u8],
        warnings: &mut WarningCollector,
    ) -> Option<ObjectId> {
        let key_name = String::from_utf8_lossy(key);
        let target = match dict.get(key) {
            Ok(Object::Reference(id)) => *id,
            Ok(Object::Null) | Err(_) => return None,
            Ok(_) => {
                warnings.push(
                    WarningScope::Outline,
                    object_ref(owner),
                    format!("{} is not an indirect reference", key_name),
                );
                return None;
            }
        };

        if target == self.root {
            warnings.push(
                WarningScope::Outline,
                object_ref(owner),
                format!("{} points back at the outline root", key_name),
            );
            return None;
        }

        match document.document().get_object(target) {
            Ok(Object::Dictionary(_)) => Some(target),
            Ok(_) => {
                warnings.push(
                    WarningScope::Outline,
                    object_ref(owner),
                    format!("{} target {} is not a dictionary", key_name, object_ref(target)),
                );
                None
            }
            Err(_) => {
                warnings.push(
                    WarningScope::Outline,
                    object_ref(owner),
                    format!("{} target {} does not exist", key_name, object_ref(target)),
                );
                None
            }
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &OutlineNode {
        &self.nodes[idx]
    }

    /// Walk a sibling chain, stopping at the first repeated node.
    /// The flag reports whether the chain looped.
    fn sibling_chain(&self, start: Option<usize>) -> (Vec<usize>, bool) {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(idx) = current {
            if !seen.insert(idx) {
                return (chain, true);
            }
            chain.push(idx);
            current = self.nodes[idx].next_sibling;
        }
        (chain, false)
    }
}

/// Counters reported by [`OutlineEditor::apply_visibility`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityStats {
    pub nodes_visited: usize,
    pub expanded: usize,
    pub collapsed: usize,
    pub stale_counts_removed: usize,
    pub cycles_skipped: usize,
    pub budget_exhausted: bool,
}

/// Sets each bookmark's `Count` sign according to a depth policy.
///
/// `visible_levels == 0` expands every level; otherwise a node at depth `d`
/// (top level is depth 1) shows its children iff `d < visible_levels`.
#[derive(Debug, Clone)]
pub struct OutlineEditor {
    visible_levels: u32,
    max_visits: usize,
}

struct Frame {
    node: usize,
    depth: u32,
    children: Vec<usize>,
    next: usize,
}

impl OutlineEditor {
    pub fn new(visible_levels: u32) -> Self {
        Self {
            visible_levels,
            max_visits: DEFAULT_MAX_VISITS,
        }
    }

    pub fn with_max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }

    fn expands_at(&self, depth: u32) -> bool {
        self.visible_levels == 0 || depth < self.visible_levels
    }

    /// Apply the policy to every bookmark below `outline_root`.
    ///
    /// The outline root's own `Count` is left alone.
    #[instrument(skip(self, document, warnings), fields(visible_levels = self.visible_levels))]
    pub fn apply_visibility(
        &self,
        document: &mut PdfDocument,
        outline_root: ObjectId,
        warnings: &mut WarningCollector,
    ) -> VisibilityStats {
        let mut stats = VisibilityStats::default();
        let tree = match OutlineTree::load(document, outline_root, warnings) {
            Some(tree) => tree,
            None => return stats,
        };

        let assignments = self.plan(&tree, warnings, &mut stats);

        for (idx, count) in assignments {
            let id = tree.node(idx).id;
            let dict = match document.document_mut().get_object_mut(id).and_then(Object::as_dict_mut) {
                Ok(dict) => dict,
                Err(e) => {
                    warnings.push(WarningScope::Outline, object_ref(id), format!("could not update Count: {}", e));
                    continue;
                }
            };
            match count {
                Some(count) => dict.set("Count", Object::Integer(count)),
                None => {
                    dict.remove(b"Count");
                }
            }
        }

        debug!(
            "Outline visibility applied: {} visited, {} expanded, {} collapsed",
            stats.nodes_visited, stats.expanded, stats.collapsed
        );
        stats
    }

    /// Compute the new `Count` of every visited node (post-order).
    /// `None` means the entry must be removed.
    fn plan(
        &self,
        tree: &OutlineTree,
        warnings: &mut WarningCollector,
        stats: &mut VisibilityStats,
    ) -> Vec<(usize, Option<i64>)> {
        let mut assignments = Vec::new();
        let mut on_path = vec![false; tree.len()];
        let mut stack: Vec<Frame> = Vec::new();

        let (top_level, looped) = tree.sibling_chain(tree.first_top_level);
        if looped {
            warnings.push(WarningScope::Outline, object_ref(tree.root()), "top-level sibling chain loops");
        }

        'top: for top in top_level {
            if !self.enter(tree, top, 1, &mut stack, &mut on_path, warnings, stats) {
                break;
            }

            while let Some(frame) = stack.last_mut() {
                if frame.next < frame.children.len() {
                    let child = frame.children[frame.next];
                    let depth = frame.depth + 1;
                    let parent = frame.node;
                    frame.next += 1;

                    if on_path[child] {
                        stats.cycles_skipped += 1;
                        warnings.push(
                            WarningScope::Outline,
                            object_ref(tree.node(parent).id),
                            format!("child {} is also an ancestor; branch skipped", object_ref(tree.node(child).id)),
                        );
                        continue;
                    }
                    if !self.enter(tree, child, depth, &mut stack, &mut on_path, warnings, stats) {
                        break 'top;
                    }
                    continue;
                }

                let frame = match stack.pop() {
                    Some(frame) => frame,
                    None => break,
                };
                on_path[frame.node] = false;

                let k = frame.children.len() as i64;
                if k == 0 {
                    if tree.node(frame.node).count.map_or(false, |c| c != 0) {
                        stats.stale_counts_removed += 1;
                        assignments.push((frame.node, None));
                    }
                } else if self.expands_at(frame.depth) {
                    stats.expanded += 1;
                    assignments.push((frame.node, Some(k)));
                } else {
                    stats.collapsed += 1;
                    assignments.push((frame.node, Some(-k)));
                }
            }
        }

        assignments
    }

    /// Push a frame for `node`; returns `false` once the visit budget is spent
    #[allow(clippy::too_many_arguments)]
    fn enter(
        &self,
        tree: &OutlineTree,
        node: usize,
        depth: u32,
        stack: &mut Vec<Frame>,
        on_path: &mut [bool],
        warnings: &mut WarningCollector,
        stats: &mut VisibilityStats,
    ) -> bool {
        if stats.nodes_visited >= self.max_visits {
            stats.budget_exhausted = true;
            warnings.push(
                WarningScope::Outline,
                object_ref(tree.node(node).id),
                format!("visit budget of {} nodes exhausted; remaining bookmarks untouched", self.max_visits),
            );
            return false;
        }
        stats.nodes_visited += 1;

        let (children, looped) = tree.sibling_chain(tree.node(node).first_child);
        if looped {
            warnings.push(
                WarningScope::Outline,
                object_ref(tree.node(node).id),
                "child sibling chain loops; counted up to the repetition",
            );
        }

        on_path[node] = true;
        stack.push(Frame {
            node,
            depth,
            children,
            next: 0,
        });
        true
    }
}
