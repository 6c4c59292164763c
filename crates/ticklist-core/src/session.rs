//! Mutation API
//!
//! A [`Session`] owns the entity store, settings, navigation state and the
//! durable store for one signed-in user. Every mutation commits to memory
//! first, runs the default-list enforcer when lists changed, then writes
//! the touched collections through to storage.
//!
//! Errors split three ways:
//! - Validation failures return `Err` and change nothing.
//! - Refused restores return `false`.
//! - Storage failures ride along in [`Committed`]; memory keeps the change.

use crate::error::StorageError;
use crate::id::{ITEM_PREFIX, LIST_PREFIX, generate_id};
use crate::reconcile::enforce_default_list;
use crate::storage::{DurableStore, StorageBackend, StorageKey};
use crate::trash::{ItemFilter, Trash};
use crate::{
    EntityStore, Error, Identity, Result, Settings, SettingsPatch, Stats, TodoItem, TodoList, View,
};
use tracing::{debug, warn};

/// A mutation that has been applied in memory
///
/// `persist_error` is set when the write-through failed; the change still
/// holds for this session but may be gone after a restart.
#[must_use]
#[derive(Debug)]
pub struct Committed<T> {
    value: T,
    persist_error: Option<StorageError>,
}

impl<T> Committed<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }

    pub fn persist_error(&self) -> Option<&StorageError> {
        self.persist_error.as_ref()
    }

    /// Treat a failed write-through as an error
    pub fn into_result(self) -> Result<T> {
        match self.persist_error {
            Some(e) => Err(Error::NotPersisted(e)),
            None => Ok(self.value),
        }
    }
}

/// One user's working state
pub struct Session<B: StorageBackend> {
    store: EntityStore,
    settings: Settings,
    view: View,
    focused_list_id: Option<String>,
    user: Option<Identity>,
    storage: DurableStore<B>,
    /// Keys whose last write failed; retried with the next write-through
    unsaved: Vec<StorageKey>,
    default_list_name: String,
    /// Failure writing back lists repaired on open
    repair_error: Option<StorageError>,
}

impl<B: StorageBackend> Session<B> {
    /// Load whatever the backend holds
    ///
    /// Missing or unreadable collections start empty or at their defaults.
    /// Duplicate default lists found on disk are repaired and written back.
    pub fn open(backend: B, default_list_name: impl Into<String>) -> Self {
        let storage = DurableStore::new(backend);
        let lists: Vec<TodoList> = storage.get(StorageKey::Lists).unwrap_or_default();
        let items: Vec<TodoItem> = storage.get(StorageKey::Items).unwrap_or_default();

        let mut session = Self {
            store: EntityStore::from_parts(lists, items),
            settings: storage.get(StorageKey::Settings).unwrap_or_default(),
            view: storage.get(StorageKey::View).unwrap_or_default(),
            focused_list_id: storage.get(StorageKey::FocusedList),
            user: storage.get(StorageKey::User),
            storage,
            unsaved: Vec::new(),
            default_list_name: default_list_name.into(),
            repair_error: None,
        };

        if session.reconcile_lists() {
            session.repair_error = session.write_through(&[StorageKey::Lists]);
        }
        debug!(
            lists = session.store.all_lists().len(),
            items = session.store.all_items().len(),
            "session opened"
        );
        session
    }

    // ----- read projections -----

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn lists(&self) -> Vec<&TodoList> {
        self.store.lists()
    }

    pub fn items(&self) -> Vec<&TodoItem> {
        self.store.items()
    }

    pub fn all_lists(&self) -> &[TodoList] {
        self.store.all_lists()
    }

    pub fn all_items(&self) -> &[TodoItem] {
        self.store.all_items()
    }

    pub fn items_in_list(&self, list_id: &str) -> Vec<&TodoItem> {
        self.store.items_in_list(list_id)
    }

    pub fn favorite_items(&self) -> Vec<&TodoItem> {
        self.store.favorite_items()
    }

    pub fn default_list(&self) -> Option<&TodoList> {
        self.store.default_list(&self.default_list_name)
    }

    pub fn default_list_name(&self) -> &str {
        &self.default_list_name
    }

    pub fn trash(&self) -> Trash<'_> {
        self.store.trash()
    }

    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn focused_list_id(&self) -> Option<&str> {
        self.focused_list_id.as_deref()
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn storage(&self) -> &DurableStore<B> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut DurableStore<B> {
        &mut self.storage
    }

    /// Probe whether writes currently reach the backend
    pub fn storage_available(&mut self) -> bool {
        self.storage.is_available()
    }

    /// Why the lists repaired on open could not be written back, if they
    /// could not
    pub fn repair_error(&self) -> Option<&StorageError> {
        self.repair_error.as_ref()
    }

    /// Collections changed in memory but not yet written
    pub fn unsaved(&self) -> &[StorageKey] {
        &self.unsaved
    }

    // ----- identity -----

    /// Sign in, replacing the user scope
    ///
    /// Signing in as a different user drops the previous user's lists, items
    /// and settings. Navigation resets to the dashboard.
    pub fn login(&mut self, identity: Identity) -> Committed<()> {
        let same_user = self
            .user
            .as_ref()
            .is_some_and(|u| u.user_id == identity.user_id);
        if !same_user {
            self.store.clear();
            self.settings = Settings::default();
        }
        debug!(user = %identity.user_id, same_user, "login");
        self.user = Some(identity);
        self.view = View::Dashboard;
        self.focused_list_id = None;
        self.commit(
            (),
            &[
                StorageKey::User,
                StorageKey::Lists,
                StorageKey::Items,
                StorageKey::Settings,
                StorageKey::View,
                StorageKey::FocusedList,
            ],
        )
    }

    /// Sign out and wipe everything, in memory and on disk
    pub fn logout(&mut self) -> Committed<()> {
        self.user = None;
        self.store.clear();
        self.settings = Settings::default();
        self.view = View::Dashboard;
        self.focused_list_id = None;
        debug!("logout");
        self.unsaved.clear();
        let persist_error = self.storage.clear().err();
        if let Some(e) = &persist_error {
            warn!(error = %e, "failed to clear storage on logout");
        }
        Committed {
            value: (),
            persist_error,
        }
    }

    // ----- lists -----

    /// Create a list; names must be unique among visible lists
    pub fn add_list(&mut self, name: &str) -> Result<Committed<TodoList>> {
        let user_id = self.require_user()?;
        let name = non_empty(name, "List name")?;
        if self.store.name_taken(&name, None) {
            return Err(Error::DuplicateListName(name));
        }

        let list = TodoList::new(generate_id(LIST_PREFIX), user_id, name);
        self.store.push_list(list.clone());
        self.reconcile_lists();
        debug!(list = %list.list_id, "list added");
        Ok(self.commit(list, &[StorageKey::Lists]))
    }

    /// Rename a list; the default list keeps its name
    pub fn update_list(&mut self, list_id: &str, new_name: &str) -> Result<Committed<()>> {
        let list = self
            .store
            .get_list(list_id)
            .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
        if list.name == self.default_list_name {
            return Err(Error::DefaultListRename(list.name.clone()));
        }
        let name = non_empty(new_name, "List name")?;
        if self.store.name_taken(&name, Some(list_id)) {
            return Err(Error::DuplicateListName(name));
        }

        if let Some(list) = self.store.list_mut(list_id) {
            list.name = name;
        }
        self.reconcile_lists();
        debug!(list = %list_id, "list renamed");
        Ok(self.commit((), &[StorageKey::Lists]))
    }

    /// Move a list and all its items to the trash
    ///
    /// Returns how many items went with it.
    pub fn delete_list(&mut self, list_id: &str) -> Result<Committed<usize>> {
        let cascaded = self.store.soft_delete_list(list_id)?;
        self.reconcile_lists();
        debug!(list = %list_id, cascaded, "list trashed");
        Ok(self.commit(cascaded, &[StorageKey::Lists, StorageKey::Items]))
    }

    /// Take a list out of the trash (its items stay there)
    ///
    /// Returns `false` when a visible list already carries its name, which
    /// includes a trashed default list facing a newer default.
    pub fn restore_list(&mut self, list_id: &str) -> Result<Committed<bool>> {
        let restored = self.store.restore_list(list_id)?;
        if !restored {
            debug!(list = %list_id, "restore refused, name already in use");
            return Ok(Committed {
                value: false,
                persist_error: None,
            });
        }
        self.reconcile_lists();
        debug!(list = %list_id, "list restored");
        Ok(self.commit(true, &[StorageKey::Lists]))
    }

    /// Remove a list and every item in it for good
    pub fn permanently_delete_list(&mut self, list_id: &str) -> Result<Committed<usize>> {
        let removed = self.store.permanently_delete_list(list_id)?;
        self.reconcile_lists();
        if self.focused_list_id.as_deref() == Some(list_id) {
            self.focused_list_id = None;
        }
        debug!(list = %list_id, removed, "list purged");
        Ok(self.commit(
            removed,
            &[StorageKey::Lists, StorageKey::Items, StorageKey::FocusedList],
        ))
    }

    // ----- items -----

    /// Add an item to a visible list
    pub fn add_item(&mut self, list_id: &str, content: &str) -> Result<Committed<TodoItem>> {
        let user_id = self.require_user()?;
        let content = non_empty(content, "Item content")?;
        if !self.store.get_list(list_id).is_some_and(TodoList::is_visible) {
            return Err(Error::ListNotFound(list_id.to_string()));
        }

        let item = TodoItem::new(generate_id(ITEM_PREFIX), list_id.to_string(), user_id, content);
        self.store.push_item(item.clone());
        debug!(item = %item.item_id, list = %list_id, "item added");
        Ok(self.commit(item, &[StorageKey::Items]))
    }

    /// Add a favorited item to the default list, creating the list if needed
    ///
    /// Both happen in one state transition.
    pub fn add_favorite_item(&mut self, content: &str) -> Result<Committed<TodoItem>> {
        let user_id = self.require_user()?;
        let content = non_empty(content, "Item content")?;

        let mut keys = vec![StorageKey::Items];
        let list_id = match self.store.default_list(&self.default_list_name) {
            Some(list) => list.list_id.clone(),
            None => {
                let list = TodoList::new(
                    generate_id(LIST_PREFIX),
                    user_id.clone(),
                    self.default_list_name.clone(),
                );
                let list_id = list.list_id.clone();
                self.store.push_list(list);
                self.reconcile_lists();
                keys.push(StorageKey::Lists);
                debug!(list = %list_id, "default list created");
                list_id
            }
        };

        let mut item = TodoItem::new(generate_id(ITEM_PREFIX), list_id, user_id, content);
        item.is_favorited = true;
        self.store.push_item(item.clone());
        debug!(item = %item.item_id, "favorite added");
        Ok(self.commit(item, &keys))
    }

    pub fn update_item(&mut self, item_id: &str, content: &str) -> Result<Committed<()>> {
        let content = non_empty(content, "Item content")?;
        self.item_mut(item_id)?.content = content;
        debug!(item = %item_id, "item updated");
        Ok(self.commit((), &[StorageKey::Items]))
    }

    /// Flip completion; returns the new state
    pub fn toggle_item_completion(&mut self, item_id: &str) -> Result<Committed<bool>> {
        let item = self.item_mut(item_id)?;
        item.is_completed = !item.is_completed;
        let state = item.is_completed;
        debug!(item = %item_id, completed = state, "completion toggled");
        Ok(self.commit(state, &[StorageKey::Items]))
    }

    /// Flip favorite; returns the new state
    pub fn toggle_item_favorite(&mut self, item_id: &str) -> Result<Committed<bool>> {
        let item = self.item_mut(item_id)?;
        item.is_favorited = !item.is_favorited;
        let state = item.is_favorited;
        debug!(item = %item_id, favorited = state, "favorite toggled");
        Ok(self.commit(state, &[StorageKey::Items]))
    }

    /// Reassign an item to another list
    ///
    /// The target is not checked; callers pick it from `lists()`.
    pub fn move_item(&mut self, item_id: &str, target_list_id: &str) -> Result<Committed<()>> {
        self.item_mut(item_id)?.list_id = target_list_id.to_string();
        debug!(item = %item_id, target = %target_list_id, "item moved");
        Ok(self.commit((), &[StorageKey::Items]))
    }

    /// Move one item to the trash
    pub fn delete_item(&mut self, item_id: &str) -> Result<Committed<()>> {
        self.store.soft_delete_item(item_id)?;
        debug!(item = %item_id, "item trashed");
        Ok(self.commit((), &[StorageKey::Items]))
    }

    /// Take an item out of the trash
    ///
    /// Returns `false` and changes nothing when the item is unknown or its
    /// list is missing or trashed.
    pub fn restore_item(&mut self, item_id: &str) -> Committed<bool> {
        if !self.store.restore_item(item_id) {
            debug!(item = %item_id, "restore refused");
            return Committed {
                value: false,
                persist_error: None,
            };
        }
        debug!(item = %item_id, "item restored");
        self.commit(true, &[StorageKey::Items])
    }

    pub fn permanently_delete_item(&mut self, item_id: &str) -> Result<Committed<()>> {
        self.store.permanently_delete_item(item_id)?;
        debug!(item = %item_id, "item purged");
        Ok(self.commit((), &[StorageKey::Items]))
    }

    /// Trash every item the predicate accepts
    ///
    /// The predicate sees trashed items too. Returns how many items were
    /// newly trashed.
    pub fn delete_items_by_filter<F>(&mut self, predicate: F) -> Committed<usize>
    where
        F: Fn(&TodoItem) -> bool,
    {
        let changed = self.store.delete_items_where(predicate);
        debug!(changed, "bulk delete");
        self.commit(changed, &[StorageKey::Items])
    }

    /// Trash every visible item in a named scope
    pub fn clear_items(&mut self, filter: &ItemFilter) -> Committed<usize> {
        self.delete_items_by_filter(|item| filter.matches(item))
    }

    // ----- settings & navigation -----

    /// Shallow-merge a partial settings update
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Committed<Settings> {
        self.settings.merge(patch);
        debug!(settings = ?self.settings, "settings updated");
        self.commit(self.settings, &[StorageKey::Settings])
    }

    /// Store navigation state verbatim
    pub fn set_view(&mut self, view: View, list_id: Option<String>) -> Committed<()> {
        self.view = view;
        self.focused_list_id = list_id;
        self.commit((), &[StorageKey::View, StorageKey::FocusedList])
    }

    // ----- internals -----

    fn require_user(&self) -> Result<String> {
        self.user
            .as_ref()
            .map(|u| u.user_id.clone())
            .ok_or(Error::NotSignedIn)
    }

    fn item_mut(&mut self, item_id: &str) -> Result<&mut TodoItem> {
        self.store
            .item_mut(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))
    }

    /// Run the default-list enforcer; true if it changed anything
    fn reconcile_lists(&mut self) -> bool {
        let removed = enforce_default_list(&mut self.store.lists, &self.default_list_name);
        if !removed.is_empty() {
            warn!(lists = ?removed, "duplicate default lists moved to trash");
        }
        !removed.is_empty()
    }

    fn commit<T>(&mut self, value: T, keys: &[StorageKey]) -> Committed<T> {
        Committed {
            value,
            persist_error: self.write_through(keys),
        }
    }

    /// Write the given collections plus any left unsaved earlier
    ///
    /// Returns the first failure.
    fn write_through(&mut self, keys: &[StorageKey]) -> Option<StorageError> {
        let mut pending = std::mem::take(&mut self.unsaved);
        for &key in keys {
            if !pending.contains(&key) {
                pending.push(key);
            }
        }

        let mut first_err = None;
        for key in pending {
            let result = match key {
                StorageKey::User => self.storage.set_or_remove(key, self.user.as_ref()),
                StorageKey::Lists => self.storage.set(key, self.store.all_lists()),
                StorageKey::Items => self.storage.set(key, self.store.all_items()),
                StorageKey::Settings => self.storage.set(key, &self.settings),
                StorageKey::View => self.storage.set(key, &self.view),
                StorageKey::FocusedList => self
                    .storage
                    .set_or_remove(key, self.focused_list_id.as_ref()),
            };
            if let Err(e) = result {
                warn!(key = %key, error = %e, "write-through failed");
                self.unsaved.push(key);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        first_err
    }
}

/// Trim input and reject it when nothing is left
fn non_empty(raw: &str, what: &'static str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(Error::Empty(what))
    } else {
        Ok(trimmed.to_string())
    }
}
