use crate::error::InsertError;
use crate::segment::{self, Segment, Segments};

use std::collections::HashMap;

/// A template stored at a terminal node, along with its value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Leaf<V> {
    /// The text of the first template that stored this value. Later
    /// templates with different variable names resolve to the same leaf.
    pub(crate) template: String,
    pub(crate) value: V,
}

// The edge followed out of a node while resolving a concrete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Literal,
    Variable,
}

// A node represents one segment position. Literal segments are keyed by
// their exact text, every variable segment at this position shares the
// single variable child, whatever its name.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    literal_children: HashMap<String, Node<V>>,
    variable_child: Option<Box<Node<V>>>,
    leaf: Option<Leaf<V>>,
    is_variable: bool,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Node::new(false)
    }
}

impl<V> Node<V> {
    fn new(is_variable: bool) -> Self {
        Node {
            literal_children: HashMap::new(),
            variable_child: None,
            leaf: None,
            is_variable,
        }
    }

    /// Stores `value` at the node for `template`.
    ///
    /// Returns `Ok(true)` if the template was newly stored and `Ok(false)` if
    /// an equal value was already present. A different value is a conflict,
    /// detected before any node is created, so the tree is left untouched.
    pub(crate) fn insert(&mut self, template: &str, value: V) -> Result<bool, InsertError>
    where
        V: PartialEq,
    {
        let existing = self
            .locate(segment::template(template))
            .and_then(|node| node.leaf.as_ref());

        if let Some(existing) = existing {
            if existing.value == value {
                return Ok(false);
            }

            return Err(InsertError::Conflict {
                with: existing.template.clone(),
            });
        }

        let mut current = self;
        for segment in segment::template(template) {
            current = match segment {
                Segment::Literal(literal) => current
                    .literal_children
                    .entry(literal.to_owned())
                    .or_insert_with(|| Node::new(false)),
                Segment::Variable(_) => &mut **current
                    .variable_child
                    .get_or_insert_with(|| Box::new(Node::new(true))),
            };

            debug_assert_eq!(current.is_variable, matches!(segment, Segment::Variable(_)));
        }

        current.leaf = Some(Leaf {
            template: template.to_owned(),
            value,
        });

        Ok(true)
    }

    /// Checks whether `template` could be inserted with `value` without a
    /// conflict, returning the conflicting leaf otherwise.
    pub(crate) fn conflict(&self, template: &str, value: &V) -> Option<&Leaf<V>>
    where
        V: PartialEq,
    {
        self.locate(segment::template(template))
            .and_then(|node| node.leaf.as_ref())
            .filter(|leaf| leaf.value != *value)
    }

    // Follows the exact structural path of a template without creating
    // anything. Variables only ever follow the variable edge.
    fn locate<'s>(&self, segments: impl Iterator<Item = Segment<'s>>) -> Option<&Self> {
        let mut current = self;
        for segment in segments {
            current = match segment {
                Segment::Literal(literal) => current.literal_children.get(literal)?,
                Segment::Variable(_) => current.variable_child.as_deref()?,
            };
        }

        Some(current)
    }

    /// Resolves a concrete path to the leaf of the most specific template.
    ///
    /// At every node the literal child is tried first. If its subtree cannot
    /// consume the remaining segments and end on a leaf, the search backtracks
    /// and tries the variable child at the same node.
    pub(crate) fn find(&self, mut segments: Segments<'_>) -> Option<&Leaf<V>> {
        let segment = match segments.next() {
            Some(segment) => segment,
            None => return self.leaf.as_ref(),
        };

        if let Some(child) = self.literal_children.get(segment) {
            if let Some(leaf) = child.find(segments.clone()) {
                return Some(leaf);
            }
        }

        self.variable_child.as_deref()?.find(segments)
    }

    /// Mutable counterpart of [`Node::find`], taking the same branches.
    ///
    /// The search runs once over shared references and records the branch
    /// taken at every level. The recorded trail is then replayed to reach
    /// the leaf mutably.
    pub(crate) fn find_mut(&mut self, segments: Segments<'_>) -> Option<&mut Leaf<V>> {
        let mut trail = Vec::new();
        if !self.trail(segments.clone(), &mut trail) {
            return None;
        }

        let mut current = self;
        for (branch, segment) in trail.into_iter().zip(segments) {
            current = match branch {
                Branch::Literal => current.literal_children.get_mut(segment)?,
                Branch::Variable => current.variable_child.as_deref_mut()?,
            };
        }

        current.leaf.as_mut()
    }

    // Same traversal as `find`, pushing each branch taken and popping it
    // again on backtrack. Returns whether a leaf was reached.
    fn trail(&self, mut segments: Segments<'_>, trail: &mut Vec<Branch>) -> bool {
        let segment = match segments.next() {
            Some(segment) => segment,
            None => return self.leaf.is_some(),
        };

        if let Some(child) = self.literal_children.get(segment) {
            trail.push(Branch::Literal);
            if child.trail(segments.clone(), trail) {
                return true;
            }
            trail.pop();
        }

        if let Some(child) = self.variable_child.as_deref() {
            trail.push(Branch::Variable);
            if child.trail(segments, trail) {
                return true;
            }
            trail.pop();
        }

        false
    }

    /// Visits every leaf depth first. Literal children are visited in sorted
    /// order, before the variable child.
    pub(crate) fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Leaf<V>)) {
        if let Some(leaf) = &self.leaf {
            f(leaf);
        }

        let mut literals = self.literal_children.iter().collect::<Vec<_>>();
        literals.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        for (_, child) in literals {
            child.visit(f);
        }

        if let Some(child) = &self.variable_child {
            child.visit(f);
        }
    }

    /// Consumes the tree, yielding every leaf.
    pub(crate) fn into_leaves(self, leaves: &mut Vec<Leaf<V>>) {
        let Node {
            literal_children,
            variable_child,
            leaf,
            ..
        } = self;

        leaves.extend(leaf);
        for (_, child) in literal_children {
            child.into_leaves(leaves);
        }

        if let Some(child) = variable_child {
            (*child).into_leaves(leaves);
        }
    }
}

#[cfg(test)]
impl<V> Node<V> {
    // Verifies the edge kinds recorded on every node, and that each leaf sits
    // at the position its own template describes.
    fn check_structure(&self) -> Result<(), String> {
        self.check_at(&mut Vec::new())
    }

    fn check_at(&self, position: &mut Vec<Option<String>>) -> Result<(), String> {
        if let Some(leaf) = &self.leaf {
            let expected = segment::template(&leaf.template)
                .map(|segment| match segment {
                    Segment::Literal(literal) => Some(literal.to_owned()),
                    Segment::Variable(_) => None,
                })
                .collect::<Vec<_>>();

            if expected != *position {
                return Err(format!("'{}' stored at {:?}", leaf.template, position));
            }
        }

        for (literal, child) in &self.literal_children {
            if child.is_variable {
                return Err(format!("literal child '{literal}' marked as variable"));
            }

            position.push(Some(literal.clone()));
            child.check_at(position)?;
            position.pop();
        }

        if let Some(child) = &self.variable_child {
            if !child.is_variable {
                return Err("variable child not marked as variable".to_owned());
            }

            position.push(None);
            child.check_at(position)?;
            position.pop();
        }

        Ok(())
    }

    fn node_count(&self) -> usize {
        1 + self
            .literal_children
            .values()
            .map(Node::node_count)
            .sum::<usize>()
            + self.variable_child.as_ref().map_or(0, |child| child.node_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(templates: &[(&str, u32)]) -> Node<u32> {
        let mut root = Node::default();
        for &(template, value) in templates {
            root.insert(template, value).unwrap();
        }
        root
    }

    #[test]
    fn variable_names_share_one_edge() {
        let root = tree(&[("/a/{x}/b", 1), ("/a/{y}/c", 2), ("/a/{z}", 3)]);

        // root, a, {}, b, c
        assert_eq!(root.node_count(), 5);
        root.check_structure().unwrap();
    }

    #[test]
    fn conflict_creates_no_nodes() {
        let mut root = tree(&[("/a/{x}", 1)]);
        let before = root.node_count();

        assert_eq!(
            root.insert("/a/{y}", 2),
            Err(InsertError::Conflict { with: "/a/{x}".into() })
        );
        assert_eq!(root.node_count(), before);
        assert_eq!(root.find(Segments::new("/a/1")).map(|l| l.value), Some(1));
    }

    #[test]
    fn reinsert_reports_existing() {
        let mut root = tree(&[("/a/{x}", 1)]);

        assert_eq!(root.insert("/a/{x}", 1), Ok(false));
        assert_eq!(root.insert("/a/{renamed}", 1), Ok(false));
        assert_eq!(root.insert("/a/b", 1), Ok(true));
        root.check_structure().unwrap();
    }

    #[test]
    fn backtracks_into_variable_branch() {
        let root = tree(&[("/a/b/c", 1), ("/a/{x}/d", 2)]);

        assert_eq!(root.find(Segments::new("/a/b/c")).map(|l| l.value), Some(1));
        // the literal `b` subtree has no `d`, the variable branch does
        assert_eq!(root.find(Segments::new("/a/b/d")).map(|l| l.value), Some(2));
        assert!(root.find(Segments::new("/a/b")).is_none());
    }

    #[test]
    fn find_mut_takes_same_branch() {
        let mut root = tree(&[("/a/b/c", 1), ("/a/{x}/d", 2), ("/a/{x}/c", 3)]);

        root.find_mut(Segments::new("/a/b/d")).unwrap().value += 10;
        root.find_mut(Segments::new("/a/b/c")).unwrap().value += 20;
        root.find_mut(Segments::new("/a/z/c")).unwrap().value += 30;

        assert_eq!(root.find(Segments::new("/a/q/d")).map(|l| l.value), Some(12));
        assert_eq!(root.find(Segments::new("/a/b/c")).map(|l| l.value), Some(21));
        assert_eq!(root.find(Segments::new("/a/q/c")).map(|l| l.value), Some(33));
    }

    #[test]
    fn trail_records_branches_after_backtracking() {
        let root = tree(&[("/a/b/c", 1), ("/a/{x}/d", 2), ("/{y}/b/d/e", 3)]);
        let mut trail = Vec::new();

        assert!(root.trail(Segments::new("/a/b/d"), &mut trail));
        assert_eq!(trail, [Branch::Literal, Branch::Variable, Branch::Literal]);

        trail.clear();
        assert!(root.trail(Segments::new("/a/b/d/e"), &mut trail));
        assert_eq!(
            trail,
            [Branch::Variable, Branch::Literal, Branch::Literal, Branch::Literal]
        );

        trail.clear();
        assert!(!root.trail(Segments::new("/a/b/e"), &mut trail));
        assert!(trail.is_empty());
    }

    #[test]
    fn find_mut_misses_like_find() {
        let mut root = tree(&[("/a/b/c", 1), ("/a/{x}", 2)]);

        assert!(root.find_mut(Segments::new("/a/b/d")).is_none());
        assert!(root.find_mut(Segments::new("/a")).is_none());
        assert_eq!(root.find_mut(Segments::new("/a/b")).map(|l| l.value), Some(2));
    }

    #[test]
    fn visit_is_ordered() {
        let root = tree(&[("/b", 1), ("/{x}", 2), ("/a", 3), ("/a/{y}", 4), ("/", 5)]);

        let mut seen = Vec::new();
        root.visit(&mut |leaf| seen.push(leaf.template.as_str()));
        assert_eq!(seen, ["/", "/a", "/a/{y}", "/b", "/{x}"]);
    }
}
