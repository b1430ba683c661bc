//! Depth restoration for rope trees.
//!
//! Edits only adjust the nodes they rebuild, so repeated insertions at the
//! same position grow a lopsided spine. Rebalancing walks the tree from the
//! top and, at the first internal node whose children differ in length by
//! more than the configured ratio, flattens that whole subtree and builds it
//! again from scratch. Subtrees that are already balanced are kept and shared.
//!
//! A rebuild costs time proportional to the size of the rebuilt subtree, so
//! rebalancing is meant to run between batches of edits rather than after
//! every edit.

use smallvec::SmallVec;

use super::ReferenceCounter;
use super::node::{Node, STACK_CAPACITY};
use crate::settings::RopeSettings;

/// Pending work of [`rebalanced`].
enum Step<'a, T> {
    /// Rebalance this subtree and push the result.
    Visit(&'a ReferenceCounter<Node<T>>),
    /// Pop the two rebalanced children of this node and push the node again.
    Join(&'a ReferenceCounter<Node<T>>),
}

/// Returns a tree with the same elements as `node` and its skewed subtrees
/// rebuilt.
///
/// On every path from the root, the first internal node whose children are
/// skewed is rebuilt from its elements; the nodes below it are not visited.
/// Nodes that are not skewed are kept as they are and their children are
/// rebalanced in turn.
///
/// Existing nodes are never modified. When nothing under `node` needed a
/// rebuild, the returned pointer is `node` itself.
pub(crate) fn rebalanced<T: Clone>(
    node: &ReferenceCounter<Node<T>>,
    settings: &RopeSettings,
) -> ReferenceCounter<Node<T>> {
    let mut steps: SmallVec<[Step<'_, T>; STACK_CAPACITY]> = SmallVec::new();
    let mut results: SmallVec<[ReferenceCounter<Node<T>>; STACK_CAPACITY]> = SmallVec::new();
    steps.push(Step::Visit(node));

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(current) => match current.as_ref() {
                Node::Leaf(_) => results.push(ReferenceCounter::clone(current)),
                Node::Internal {
                    left,
                    right,
                    length,
                } if settings.is_skewed(left.len(), right.len()) => {
                    tracing::debug!(
                        length = *length,
                        left_length = left.len(),
                        right_length = right.len(),
                        "rebuilding skewed subtree"
                    );
                    results.push(ReferenceCounter::new(Node::from_elements(
                        current.to_vec(),
                        settings,
                    )));
                }
                Node::Internal { left, right, .. } => {
                    steps.push(Step::Join(current));
                    steps.push(Step::Visit(right));
                    steps.push(Step::Visit(left));
                }
            },
            Step::Join(current) => {
                let (Some(new_right), Some(new_left)) = (results.pop(), results.pop()) else {
                    unreachable!("both children are rebalanced before their parent");
                };
                let unchanged = match current.as_ref() {
                    Node::Internal { left, right, .. } => {
                        ReferenceCounter::ptr_eq(left, &new_left)
                            && ReferenceCounter::ptr_eq(right, &new_right)
                    }
                    Node::Leaf(_) => false,
                };
                results.push(if unchanged {
                    ReferenceCounter::clone(current)
                } else {
                    ReferenceCounter::new(Node::internal(new_left, new_right))
                });
            }
        }
    }

    results.pop().unwrap_or_else(|| ReferenceCounter::clone(node))
}
