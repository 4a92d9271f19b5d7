use std::collections::{HashMap, HashSet};

use common::CategoryId;

use crate::model::{Category, CategoryNode};

/// Category forest indexed by id and by parent.
///
/// Parent links are taken as given. Expansion walks the links breadth first
/// with a visited set, so a malformed forest containing a cycle still
/// terminates; the offending link is logged and not followed.
#[derive(Debug, Default, Clone)]
pub struct CategoryTree {
    categories: HashMap<CategoryId, Category>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a category, moving it under its new parent.
    pub fn insert(&mut self, category: Category) {
        let old_parent = self
            .categories
            .get(&category.id)
            .and_then(|previous| previous.parent_id);
        if let Some(siblings) = old_parent.and_then(|p| self.children.get_mut(&p)) {
            siblings.retain(|id| *id != category.id);
        }
        if let Some(parent) = category.parent_id {
            self.children.entry(parent).or_default().push(category.id);
        }
        self.categories.insert(category.id, category);
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Resolves one category, with its whole subtree when `with_descendants`.
    /// An unknown id yields `None`.
    pub fn resolve(&self, id: CategoryId, with_descendants: bool) -> Option<CategoryNode> {
        let category = self.categories.get(&id)?;
        if with_descendants {
            self.expand(id)
        } else {
            Some(CategoryNode::new(category, Vec::new()))
        }
    }

    /// All categories without a parent, ordered by name.
    pub fn list_roots(&self, with_descendants: bool) -> Vec<CategoryNode> {
        let mut roots: Vec<&Category> = self
            .categories
            .values()
            .filter(|c| c.parent_id.is_none())
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        roots
            .into_iter()
            .filter_map(|c| self.resolve(c.id, with_descendants))
            .collect()
    }

    /// The id itself plus every descendant id; empty when the id is unknown.
    pub fn subtree_ids(&self, id: CategoryId) -> Vec<CategoryId> {
        if !self.categories.contains_key(&id) {
            return Vec::new();
        }
        self.walk(id).0
    }

    /// Breadth-first walk returning the visit order and, for each visited
    /// node, the children first reached through it.
    fn walk(&self, root: CategoryId) -> (Vec<CategoryId>, HashMap<CategoryId, Vec<CategoryId>>) {
        let mut visited = HashSet::from([root]);
        let mut order = vec![root];
        let mut reached_from: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
        let mut next = 0;

        while let Some(&current) = order.get(next) {
            next += 1;
            let mut children: Vec<&Category> = self
                .children
                .get(&current)
                .into_iter()
                .flatten()
                .filter_map(|id| self.categories.get(id))
                .collect();
            children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

            for child in children {
                if visited.insert(child.id) {
                    order.push(child.id);
                    reached_from.entry(current).or_default().push(child.id);
                } else {
                    tracing::warn!(
                        category_id = %child.id,
                        parent_id = %current,
                        "category parent links form a cycle; link ignored"
                    );
                }
            }
        }

        (order, reached_from)
    }

    fn expand(&self, root: CategoryId) -> Option<CategoryNode> {
        let (order, mut reached_from) = self.walk(root);
        let mut built: HashMap<CategoryId, CategoryNode> = HashMap::with_capacity(order.len());

        // Children are always visited after their parent, so building in
        // reverse visit order finds every child already assembled.
        for id in order.into_iter().rev() {
            let sub_categories = reached_from
                .remove(&id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|child| built.remove(&child))
                .collect();
            if let Some(category) = self.categories.get(&id) {
                built.insert(id, CategoryNode::new(category, sub_categories));
            }
        }

        built.remove(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_levels() -> (CategoryTree, Category, Category, Category, Category) {
        let mut tree = CategoryTree::new();
        let grocery = Category::root("Grocery");
        let pasta = Category::child_of(grocery.id, "Pasta");
        let sauces = Category::child_of(grocery.id, "Sauces");
        let oils = Category::child_of(sauces.id, "Oils");
        // Insert a child before its parent to check the index tolerates it.
        tree.insert(oils.clone());
        tree.insert(grocery.clone());
        tree.insert(pasta.clone());
        tree.insert(sauces.clone());
        (tree, grocery, pasta, sauces, oils)
    }

    #[test]
    fn resolve_without_descendants_has_no_children() {
        let (tree, grocery, ..) = three_levels();
        let node = tree.resolve(grocery.id, false).unwrap();
        assert_eq!(node.name, "Grocery");
        assert!(node.sub_categories.is_empty());
    }

    #[test]
    fn resolve_with_descendants_reaches_grandchildren() {
        let (tree, grocery, pasta, sauces, oils) = three_levels();
        let node = tree.resolve(grocery.id, true).unwrap();

        let names: Vec<_> = node.sub_categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Pasta", "Sauces"]);
        assert_eq!(node.sub_categories[1].sub_categories[0].id, oils.id);

        let mut ids = node.flatten_ids();
        ids.sort();
        let mut expected = vec![grocery.id, pasta.id, sauces.id, oils.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        let (tree, ..) = three_levels();
        assert!(tree.resolve(CategoryId::new(), true).is_none());
        assert!(tree.subtree_ids(CategoryId::new()).is_empty());
    }

    #[test]
    fn roots_are_parentless_categories() {
        let (mut tree, ..) = three_levels();
        tree.insert(Category::root("Drinks"));
        let roots = tree.list_roots(false);
        let names: Vec<_> = roots.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Drinks", "Grocery"]);
    }

    #[test]
    fn expansion_terminates_on_cycle() {
        let (mut tree, grocery, _pasta, sauces, oils) = three_levels();
        // Re-parent the root under its own grandchild.
        let mut looped = tree.get(grocery.id).unwrap().clone();
        looped.parent_id = Some(oils.id);
        tree.insert(looped);

        let node = tree.resolve(sauces.id, true).unwrap();
        assert_eq!(node.flatten_ids().len(), 4);
        assert_eq!(tree.subtree_ids(grocery.id).len(), 4);
    }

    #[test]
    fn self_parent_terminates() {
        let mut tree = CategoryTree::new();
        let mut odd = Category::root("Odd");
        odd.parent_id = Some(odd.id);
        tree.insert(odd.clone());
        let node = tree.resolve(odd.id, true).unwrap();
        assert!(node.sub_categories.is_empty());
    }

    #[test]
    fn reinsert_moves_category_between_parents() {
        let (mut tree, grocery, pasta, sauces, _) = three_levels();
        let mut moved = pasta.clone();
        moved.parent_id = Some(sauces.id);
        tree.insert(moved);

        let node = tree.resolve(grocery.id, true).unwrap();
        assert_eq!(node.sub_categories.len(), 1);
        assert_eq!(node.sub_categories[0].sub_categories.len(), 2);
    }
}
