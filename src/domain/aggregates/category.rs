//! Category tree (root categories and their direct children)

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::{Locale, Slug};
use crate::{Category, Result, StorefrontError};

impl Category {
    pub fn display_name(&self, locale: Locale) -> &str { locale.pick(&self.name, &self.name_tr) }
    pub fn is_root(&self) -> bool { self.parent_id.is_none() }
}

/// Admin category form. The slug is derived from `name_tr`.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct CategoryDraft {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub name_tr: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// A validated category ready to be inserted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub name_tr: String,
    pub slug: Slug,
    pub parent_id: Option<Uuid>,
}

impl CategoryDraft {
    pub fn prepare(self, tree: &CategoryTree) -> Result<NewCategory> {
        self.validate()?;
        if let Some(parent_id) = self.parent_id {
            tree.check_parent(parent_id)?;
        }
        let slug = Slug::from_text(&self.name_tr)?;
        Ok(NewCategory { name: self.name, name_tr: self.name_tr, slug, parent_id: self.parent_id })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// Two-level category hierarchy. Deeper nesting is rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
}

impl CategoryTree {
    pub fn build(categories: Vec<Category>) -> Result<Self> {
        let (roots, children): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(Category::is_root);
        let mut roots: Vec<CategoryNode> = roots
            .into_iter()
            .map(|category| CategoryNode { category, children: vec![] })
            .collect();

        for child in &children {
            let Some(parent_id) = child.parent_id else { continue };
            if children.iter().any(|c| c.id == parent_id) {
                return Err(StorefrontError::CategoryTooDeep(child.id));
            }
            let node = roots
                .iter_mut()
                .find(|n| n.category.id == parent_id)
                .ok_or(StorefrontError::CategoryNotFound(parent_id))?;
            node.children.push(child.clone());
        }
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[CategoryNode] { &self.roots }

    pub fn len(&self) -> usize { self.roots.iter().map(|n| 1 + n.children.len()).sum() }
    pub fn is_empty(&self) -> bool { self.roots.is_empty() }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.roots.iter().find_map(|n| {
            if n.category.id == id { Some(&n.category) } else { n.children.iter().find(|c| c.id == id) }
        })
    }

    /// Ensures `parent_id` is a root, so a new child stays on the second level.
    pub fn check_parent(&self, parent_id: Uuid) -> Result<()> {
        match self.get(parent_id) {
            Some(parent) if parent.is_root() => Ok(()),
            Some(_) => Err(StorefrontError::CategoryTooDeep(parent_id)),
            None => Err(StorefrontError::CategoryNotFound(parent_id)),
        }
    }

    /// The category itself plus, for a root, all of its children.
    pub fn branch_ids(&self, id: Uuid) -> Option<Vec<Uuid>> {
        if let Some(node) = self.roots.iter().find(|n| n.category.id == id) {
            let mut ids = vec![node.category.id];
            ids.extend(node.children.iter().map(|c| c.id));
            return Some(ids);
        }
        self.get(id).map(|c| vec![c.id])
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&CategoryNode> {
        self.roots.iter().find(|n| n.category.slug == slug)
    }

    pub fn child_by_slug(&self, slug: &str, subslug: &str) -> Option<&Category> {
        self.find_by_slug(slug)?.children.iter().find(|c| c.slug == subslug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name_tr: &str, parent_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(), name: name_tr.into(), name_tr: name_tr.into(),
            slug: Slug::from_text(name_tr).unwrap().into_inner(), parent_id,
            created_at: now, updated_at: now,
        }
    }

    #[test]
    fn test_build_two_levels() {
        let kedi = category("Kedi", None);
        let mama = category("Kedi Maması", Some(kedi.id));
        let kum = category("Kedi Kumu", Some(kedi.id));
        let kopek = category("Köpek", None);
        let tree = CategoryTree::build(vec![mama.clone(), kedi.clone(), kum.clone(), kopek.clone()]).unwrap();

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.branch_ids(kedi.id).unwrap(), vec![kedi.id, mama.id, kum.id]);
        assert_eq!(tree.branch_ids(mama.id).unwrap(), vec![mama.id]);
        assert_eq!(tree.branch_ids(Uuid::new_v4()), None);
        assert_eq!(tree.child_by_slug("kedi", "kedi-kumu").map(|c| c.id), Some(kum.id));
        assert_eq!(tree.find_by_slug("kopek").map(|n| n.category.id), Some(kopek.id));
    }

    #[test]
    fn test_rejects_third_level() {
        let root = category("Kuş", None);
        let child = category("Kuş Yemi", Some(root.id));
        let grandchild = category("Kraker", Some(child.id));
        let err = CategoryTree::build(vec![root, child, grandchild.clone()]).unwrap_err();
        assert!(matches!(err, StorefrontError::CategoryTooDeep(id) if id == grandchild.id));
    }

    #[test]
    fn test_rejects_missing_parent() {
        let orphan = category("Akvaryum", Some(Uuid::new_v4()));
        assert!(matches!(CategoryTree::build(vec![orphan]), Err(StorefrontError::CategoryNotFound(_))));
    }

    #[test]
    fn test_draft_prepare() {
        let root = category("Balık", None);
        let child = category("Balık Yemi", Some(root.id));
        let tree = CategoryTree::build(vec![root.clone(), child.clone()]).unwrap();

        let draft = CategoryDraft { name: "Aquarium Decor".into(), name_tr: "Akvaryum Süsü".into(), parent_id: Some(root.id) };
        let new = draft.prepare(&tree).unwrap();
        assert_eq!(new.slug.as_str(), "akvaryum-susu");

        let too_deep = CategoryDraft { name: "x".into(), name_tr: "Pul Yem".into(), parent_id: Some(child.id) };
        assert!(matches!(too_deep.prepare(&tree), Err(StorefrontError::CategoryTooDeep(_))));

        let empty = CategoryDraft { name: "x".into(), name_tr: String::new(), parent_id: None };
        assert!(matches!(empty.prepare(&tree), Err(StorefrontError::Validation(_))));
    }
}
