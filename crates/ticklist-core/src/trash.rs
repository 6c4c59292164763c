//! Trash bin: soft delete, restore, permanent delete
//!
//! Soft deletes flip `is_deleted` and keep the record. Permanent deletes
//! remove records from every collection. Restoring an item requires its
//! list to exist and be visible, so no visible item ever points at a
//! trashed list through a restore.

use crate::{EntityStore, Error, Result, TodoItem, TodoList};
use serde::Serialize;

/// Named bulk-delete scopes; each matches visible items only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    /// Every item in one list
    InList(String),
    /// Every favorited item
    Favorites,
    /// Everything
    All,
}

impl ItemFilter {
    pub fn matches(&self, item: &TodoItem) -> bool {
        item.is_visible()
            && match self {
                ItemFilter::InList(list_id) => &item.list_id == list_id,
                ItemFilter::Favorites => item.is_favorited,
                ItemFilter::All => true,
            }
    }
}

/// Contents of the trash bin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trash<'a> {
    pub lists: Vec<&'a TodoList>,
    pub items: Vec<&'a TodoItem>,
}

impl Trash<'_> {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.items.is_empty()
    }
}

impl EntityStore {
    /// Soft-delete a list and every item pointing at it
    ///
    /// Returns how many items were cascaded.
    pub(crate) fn soft_delete_list(&mut self, list_id: &str) -> Result<usize> {
        let list = self
            .list_mut(list_id)
            .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
        list.is_deleted = true;

        let mut cascaded = 0;
        for item in self.items.iter_mut().filter(|i| i.list_id == list_id) {
            item.is_deleted = true;
            cascaded += 1;
        }
        Ok(cascaded)
    }

    pub(crate) fn soft_delete_item(&mut self, item_id: &str) -> Result<()> {
        let item = self
            .item_mut(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;
        item.is_deleted = true;
        Ok(())
    }

    /// Bring a list back; its items stay in the trash
    ///
    /// Returns `false` without touching anything when a visible list already
    /// uses its name. For the default list that means a newer default wins.
    pub(crate) fn restore_list(&mut self, list_id: &str) -> Result<bool> {
        let list = self
            .get_list(list_id)
            .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
        if list.is_visible() {
            return Ok(true);
        }
        if self.name_taken(&list.name, Some(list_id)) {
            return Ok(false);
        }
        if let Some(list) = self.list_mut(list_id) {
            list.is_deleted = false;
        }
        Ok(true)
    }

    /// Bring an item back if its list is present and visible
    pub(crate) fn restore_item(&mut self, item_id: &str) -> bool {
        let Some(item) = self.get_item(item_id) else {
            return false;
        };
        let parent_visible = self
            .get_list(&item.list_id)
            .is_some_and(TodoList::is_visible);
        if !parent_visible {
            return false;
        }
        if let Some(item) = self.item_mut(item_id) {
            item.is_deleted = false;
        }
        true
    }

    /// Remove a list and all of its items for good
    ///
    /// Returns how many items were removed with it.
    pub(crate) fn permanently_delete_list(&mut self, list_id: &str) -> Result<usize> {
        if self.get_list(list_id).is_none() {
            return Err(Error::ListNotFound(list_id.to_string()));
        }
        self.lists.retain(|l| l.list_id != list_id);
        let before = self.items.len();
        self.items.retain(|i| i.list_id != list_id);
        Ok(before - self.items.len())
    }

    pub(crate) fn permanently_delete_item(&mut self, item_id: &str) -> Result<()> {
        if self.get_item(item_id).is_none() {
            return Err(Error::ItemNotFound(item_id.to_string()));
        }
        self.items.retain(|i| i.item_id != item_id);
        Ok(())
    }

    /// Soft-delete every item matching `predicate`
    ///
    /// The predicate sees all items, trashed ones included. Returns how
    /// many items went from visible to deleted.
    pub(crate) fn delete_items_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&TodoItem) -> bool,
    {
        let mut changed = 0;
        for item in self.items.iter_mut() {
            if predicate(item) {
                if !item.is_deleted {
                    changed += 1;
                }
                item.is_deleted = true;
            }
        }
        changed
    }

    /// Everything currently in the trash bin
    pub fn trash(&self) -> Trash<'_> {
        Trash {
            lists: self.lists.iter().filter(|l| l.is_deleted).collect(),
            items: self.items.iter().filter(|i| i.is_deleted).collect(),
        }
    }

    /// Whether restoring this item would be refused
    pub fn is_restore_blocked(&self, item: &TodoItem) -> bool {
        !self
            .get_list(&item.list_id)
            .is_some_and(TodoList::is_visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{item, list};

    const DEFAULT: &str = "기본";

    fn store() -> EntityStore {
        let mut done = item("item-3", "list-a");
        done.is_deleted = true;
        EntityStore::from_parts(
            vec![list("list-a", "Work"), list("list-b", "Home")],
            vec![item("item-1", "list-a"), item("item-2", "list-b"), done],
        )
    }

    #[test]
    fn test_soft_delete_list_cascades() {
        let mut store = store();
        assert_eq!(store.soft_delete_list("list-a").unwrap(), 2);
        assert!(store.get_list("list-a").unwrap().is_deleted);
        assert!(store.get_item("item-1").unwrap().is_deleted);
        assert!(!store.get_item("item-2").unwrap().is_deleted);
    }

    #[test]
    fn test_restore_list_leaves_items_deleted() {
        let mut store = store();
        store.soft_delete_list("list-a").unwrap();
        assert!(store.restore_list("list-a").unwrap());
        assert!(!store.get_list("list-a").unwrap().is_deleted);
        assert!(store.get_item("item-1").unwrap().is_deleted);
    }

    #[test]
    fn test_restore_item_blocked_by_deleted_list() {
        let mut store = store();
        store.soft_delete_list("list-a").unwrap();
        let before = store.clone();

        assert!(!store.restore_item("item-1"));
        assert_eq!(store, before);

        store.restore_list("list-a").unwrap();
        assert!(store.restore_item("item-1"));
        assert!(store.get_item("item-1").unwrap().is_visible());
    }

    #[test]
    fn test_restore_item_blocked_by_missing_list() {
        let mut store = store();
        store.soft_delete_item("item-2").unwrap();
        store.lists.retain(|l| l.list_id != "list-b");
        assert!(!store.restore_item("item-2"));
        assert!(!store.restore_item("item-missing"));
    }

    #[test]
    fn test_restore_default_blocked_by_newer_default() {
        let mut store = EntityStore::from_parts(vec![list("list-1", DEFAULT)], vec![]);
        store.soft_delete_list("list-1").unwrap();
        store.push_list(list("list-2", DEFAULT));

        assert!(!store.restore_list("list-1").unwrap());
        assert!(store.get_list("list-1").unwrap().is_deleted);
    }

    #[test]
    fn test_restore_blocked_by_visible_namesake() {
        let mut store = store();
        store.soft_delete_list("list-a").unwrap();
        store.push_list(list("list-c", "Work"));

        assert!(!store.restore_list("list-a").unwrap());
        assert!(store.get_list("list-a").unwrap().is_deleted);
        assert!(!store.name_taken("Work", Some("list-c")));

        store.soft_delete_list("list-c").unwrap();
        assert!(store.restore_list("list-a").unwrap());
        assert_eq!(store.lists().iter().filter(|l| l.name == "Work").count(), 1);
    }

    #[test]
    fn test_permanent_delete_list_takes_items() {
        let mut store = store();
        assert_eq!(store.permanently_delete_list("list-a").unwrap(), 2);
        assert!(store.get_list("list-a").is_none());
        assert!(store.all_items().iter().all(|i| i.list_id != "list-a"));
        assert!(matches!(
            store.permanently_delete_list("list-a"),
            Err(Error::ListNotFound(_))
        ));
    }

    #[test]
    fn test_permanent_delete_item() {
        let mut store = store();
        store.permanently_delete_item("item-3").unwrap();
        assert_eq!(store.all_items().len(), 2);
        assert!(store.permanently_delete_item("item-3").is_err());
    }

    #[test]
    fn test_named_filters() {
        let mut store = store();
        store.items[1].is_favorited = true;

        let fav = ItemFilter::Favorites;
        assert_eq!(store.delete_items_where(|i| fav.matches(i)), 1);
        assert!(store.get_item("item-2").unwrap().is_deleted);

        let in_a = ItemFilter::InList("list-a".into());
        assert_eq!(store.delete_items_where(|i| in_a.matches(i)), 1);
        assert!(store.items().is_empty());
        assert_eq!(store.delete_items_where(|i| ItemFilter::All.matches(i)), 0);
    }

    #[test]
    fn test_trash_projection() {
        let mut store = store();
        store.soft_delete_list("list-b").unwrap();
        let trash = store.trash();
        assert_eq!(trash.lists.len(), 1);
        assert_eq!(trash.items.len(), 2);
        assert!(store.is_restore_blocked(trash.items[0]));
    }
}
