//! Data model for ticklist
//!
//! Field names serialize in camelCase so persisted payloads stay readable by
//! any other client of the same key namespace.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Current time at the precision timestamps are stored with
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A named list of to-dos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    /// Unique identifier (list-xxxxxxxx)
    pub list_id: String,

    /// Owner
    pub user_id: String,

    /// Display name
    pub name: String,

    /// When the list was created (epoch millis on disk)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Soft-deleted, kept for the trash bin
    #[serde(default)]
    pub is_deleted: bool,
}

impl TodoList {
    pub fn new(list_id: String, user_id: String, name: String) -> Self {
        Self {
            list_id,
            user_id,
            name,
            created_at: now_millis(),
            is_deleted: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.is_deleted
    }
}

/// A single to-do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique identifier (item-xxxxxxxx)
    pub item_id: String,

    /// Owning list. A back-reference only: the list may be deleted while
    /// the item survives.
    pub list_id: String,

    /// Owner
    pub user_id: String,

    pub content: String,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default)]
    pub is_favorited: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub is_deleted: bool,
}

impl TodoItem {
    pub fn new(item_id: String, list_id: String, user_id: String, content: String) -> Self {
        Self {
            item_id,
            list_id,
            user_id,
            content,
            is_completed: false,
            is_favorited: false,
            created_at: now_millis(),
            is_deleted: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.is_deleted
    }
}

impl std::fmt::Display for TodoItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let done = if self.is_completed { "x" } else { " " };
        let star = if self.is_favorited { "*" } else { " " };
        write!(f, "[{}]{} {} - {}", done, star, self.item_id, self.content)
    }
}

/// Per-user display preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub show_items_in_dashboard: bool,
    pub always_show_item_actions: bool,
    /// Show the default list alongside the user's own lists
    pub show_default_list: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_items_in_dashboard: true,
            always_show_item_actions: true,
            show_default_list: false,
        }
    }
}

/// Partial update for [`Settings`]; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub show_items_in_dashboard: Option<bool>,
    pub always_show_item_actions: Option<bool>,
    pub show_default_list: Option<bool>,
}

impl Settings {
    /// Shallow-merge a patch into these settings
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.show_items_in_dashboard {
            self.show_items_in_dashboard = v;
        }
        if let Some(v) = patch.always_show_item_actions {
            self.always_show_item_actions = v;
        }
        if let Some(v) = patch.show_default_list {
            self.show_default_list = v;
        }
    }
}

/// Navigation state, stored verbatim for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Focus,
    All,
    Favorites,
    Trash,
}

impl std::str::FromStr for View {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashboard" => Ok(View::Dashboard),
            "focus" => Ok(View::Focus),
            "all" => Ok(View::All),
            "favorites" | "favourites" => Ok(View::Favorites),
            "trash" => Ok(View::Trash),
            _ => Err(crate::Error::InvalidView(s.to_string())),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Dashboard => write!(f, "dashboard"),
            View::Focus => write!(f, "focus"),
            View::All => write!(f, "all"),
            View::Favorites => write!(f, "favorites"),
            View::Trash => write!(f, "trash"),
        }
    }
}

/// Signed-in user as supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_json_shape() {
        let mut list = TodoList::new("list-1".into(), "u1".into(), "Work".into());
        list.created_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["listId"], "list-1");
        assert_eq!(json["createdAt"], 1_700_000_000_123i64);
        assert_eq!(json["isDeleted"], false);
    }

    #[test]
    fn test_new_timestamps_survive_json() {
        let item = TodoItem::new("item-1".into(), "list-1".into(), "u1".into(), "x".into());
        let back: TodoItem = serde_json::from_str(&serde_json::to_string(&item).unwrap()).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_item_missing_deleted_flag_defaults_false() {
        let raw = r#"{"itemId":"item-1","listId":"list-1","userId":"u1","content":"milk",
            "isCompleted":true,"isFavorited":false,"createdAt":1700000000000}"#;
        let item: TodoItem = serde_json::from_str(raw).unwrap();
        assert!(item.is_completed);
        assert!(!item.is_deleted);
        assert!(item.is_visible());
    }

    #[test]
    fn test_partial_settings_take_defaults() {
        let raw = r#"{"showItemsInDashboard":false,"alwaysShowItemActions":true}"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert!(!settings.show_items_in_dashboard);
        assert!(!settings.show_default_list);
    }

    #[test]
    fn test_settings_merge_is_shallow() {
        let mut settings = Settings::default();
        settings.merge(SettingsPatch {
            show_default_list: Some(true),
            ..Default::default()
        });
        assert!(settings.show_default_list);
        assert!(settings.show_items_in_dashboard);
        assert!(settings.always_show_item_actions);
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("Favorites".parse::<View>().unwrap(), View::Favorites);
        assert_eq!(View::Trash.to_string(), "trash");
        assert!("inbox".parse::<View>().is_err());
    }
}
