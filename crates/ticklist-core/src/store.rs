//! In-memory entity store for lists and items
//!
//! Holds every record, soft-deleted ones included, in insertion order.
//! Insertion order is what "first" means wherever a tie is broken.
//! Mutation primitives are crate-private so every change goes through
//! [`crate::Session`], which runs the default-list enforcer and writes
//! the result through to storage.

use crate::{TodoItem, TodoList};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    pub(crate) lists: Vec<TodoList>,
    pub(crate) items: Vec<TodoItem>,
}

/// Counts over the current store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub lists: usize,
    pub items: usize,
    pub completed: usize,
    pub favorites: usize,
    pub trashed_lists: usize,
    pub trashed_items: usize,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted collections
    pub fn from_parts(lists: Vec<TodoList>, items: Vec<TodoItem>) -> Self {
        Self { lists, items }
    }

    /// Visible lists
    pub fn lists(&self) -> Vec<&TodoList> {
        self.lists.iter().filter(|l| l.is_visible()).collect()
    }

    /// Visible items
    pub fn items(&self) -> Vec<&TodoItem> {
        self.items.iter().filter(|i| i.is_visible()).collect()
    }

    /// Every list, including soft-deleted ones
    pub fn all_lists(&self) -> &[TodoList] {
        &self.lists
    }

    /// Every item, including soft-deleted ones
    pub fn all_items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Get a list by ID, deleted or not
    pub fn get_list(&self, list_id: &str) -> Option<&TodoList> {
        self.lists.iter().find(|l| l.list_id == list_id)
    }

    /// Get an item by ID, deleted or not
    pub fn get_item(&self, item_id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub(crate) fn list_mut(&mut self, list_id: &str) -> Option<&mut TodoList> {
        self.lists.iter_mut().find(|l| l.list_id == list_id)
    }

    pub(crate) fn item_mut(&mut self, item_id: &str) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// The first visible list carrying the default name
    pub fn default_list(&self, default_name: &str) -> Option<&TodoList> {
        self.lists
            .iter()
            .find(|l| l.is_visible() && l.name == default_name)
    }

    /// Whether a visible list other than `except` already uses `name`
    pub fn name_taken(&self, name: &str, except: Option<&str>) -> bool {
        self.lists.iter().any(|l| {
            l.is_visible() && l.name == name && except.is_none_or(|id| l.list_id != id)
        })
    }

    /// Visible items belonging to a list
    pub fn items_in_list(&self, list_id: &str) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|i| i.is_visible() && i.list_id == list_id)
            .collect()
    }

    /// Visible favorited items across all lists
    pub fn favorite_items(&self) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|i| i.is_visible() && i.is_favorited)
            .collect()
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for list in &self.lists {
            if list.is_visible() {
                stats.lists += 1;
            } else {
                stats.trashed_lists += 1;
            }
        }
        for item in &self.items {
            if !item.is_visible() {
                stats.trashed_items += 1;
                continue;
            }
            stats.items += 1;
            if item.is_completed {
                stats.completed += 1;
            }
            if item.is_favorited {
                stats.favorites += 1;
            }
        }
        stats
    }

    pub(crate) fn push_list(&mut self, list: TodoList) {
        self.lists.push(list);
    }

    pub(crate) fn push_item(&mut self, item: TodoItem) {
        self.items.push(item);
    }

    pub(crate) fn clear(&mut self) {
        self.lists.clear();
        self.items.clear();
    }
}
