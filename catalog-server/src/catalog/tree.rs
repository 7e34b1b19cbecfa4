//! Arena-backed category forest
//!
//! Rows are loaded once and kept in a flat `Vec`; parent/child links are
//! indexes into that arena. Nesting into [`CategoryNode`] happens only when
//! the caller asks for the owned tree.

use shared::models::{Category, CategoryNode};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Flat forest of categories grouped by parent
#[derive(Debug, Default)]
pub struct CategoryForest {
    nodes: Vec<Category>,
    children: HashMap<i64, Vec<usize>>,
    roots: Vec<usize>,
}

fn sibling_order(a: &Category, b: &Category) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

impl CategoryForest {
    /// Group rows by `parent_id`.
    ///
    /// Rows whose parent is not part of `categories` (e.g. an active child
    /// under an inactive parent when only active rows were loaded) are not
    /// reachable from any root and stay out of the nested tree.
    pub fn build(categories: Vec<Category>) -> Self {
        let mut forest = Self {
            nodes: categories,
            ..Default::default()
        };

        for (idx, category) in forest.nodes.iter().enumerate() {
            match category.parent_id {
                None => forest.roots.push(idx),
                Some(parent_id) => forest.children.entry(parent_id).or_default().push(idx),
            }
        }

        let nodes = &forest.nodes;
        forest
            .roots
            .sort_by(|&a, &b| sibling_order(&nodes[a], &nodes[b]));
        for siblings in forest.children.values_mut() {
            siblings.sort_by(|&a, &b| sibling_order(&nodes[a], &nodes[b]));
        }
        forest
    }

    /// Nest the arena into owned nodes, tagging depth and active product count
    pub fn into_nodes(self, product_counts: &HashMap<i64, i64>) -> Vec<CategoryNode> {
        self.roots
            .iter()
            .map(|&idx| self.nest(idx, 0, product_counts))
            .collect()
    }

    fn nest(&self, idx: usize, level: u32, product_counts: &HashMap<i64, i64>) -> CategoryNode {
        let category = &self.nodes[idx];
        let count = product_counts.get(&category.id).copied().unwrap_or(0);
        let mut node = CategoryNode::from_category(category.clone(), level, count);
        if let Some(children) = self.children.get(&category.id) {
            node.children = children
                .iter()
                .map(|&child| self.nest(child, level + 1, product_counts))
                .collect();
        }
        node
    }
}
