//! Default-list enforcement
//!
//! At most one visible list may carry the default name. The first one in
//! store order is canonical; later duplicates are soft-deleted. A visible
//! list with another name that reuses the canonical list's ID is corrupt
//! and is soft-deleted as well. Single pass, idempotent.

use crate::TodoList;

/// Restore the default-list invariant in place
///
/// Returns the IDs of the lists it soft-deleted, empty when the collection
/// already satisfied the invariant.
pub fn enforce_default_list(lists: &mut [TodoList], default_name: &str) -> Vec<String> {
    let mut removed = Vec::new();

    let Some(canonical) = lists
        .iter()
        .position(|l| l.is_visible() && l.name == default_name)
    else {
        return removed;
    };
    let canonical_id = lists[canonical].list_id.clone();

    for list in lists.iter_mut().skip(canonical + 1) {
        if list.is_visible() && list.name == default_name {
            list.is_deleted = true;
            removed.push(list.list_id.clone());
        }
    }

    // ID reuse: never rename the default, drop the impostor instead
    for list in lists.iter_mut() {
        if list.is_visible() && list.name != default_name && list.list_id == canonical_id {
            list.is_deleted = true;
            removed.push(list.list_id.clone());
        }
    }

    removed
}

/// Number of visible lists carrying the default name
pub fn visible_default_count(lists: &[TodoList], default_name: &str) -> usize {
    lists
        .iter()
        .filter(|l| l.is_visible() && l.name == default_name)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::list;

    const DEFAULT: &str = "기본";

    #[test]
    fn test_duplicate_defaults_keep_first() {
        let mut lists = vec![list("list-1", DEFAULT), list("list-2", "Work"), list("list-3", DEFAULT)];

        let removed = enforce_default_list(&mut lists, DEFAULT);

        assert_eq!(removed, vec!["list-3".to_string()]);
        assert!(!lists[0].is_deleted);
        assert!(lists[2].is_deleted);
        assert_eq!(lists.len(), 3);
        assert_eq!(visible_default_count(&lists, DEFAULT), 1);
    }

    #[test]
    fn test_deleted_default_is_not_canonical() {
        let mut lists = vec![list("list-1", DEFAULT), list("list-2", DEFAULT)];
        lists[0].is_deleted = true;

        assert!(enforce_default_list(&mut lists, DEFAULT).is_empty());
        assert!(!lists[1].is_deleted);
    }

    #[test]
    fn test_id_reuse_drops_non_default() {
        let mut lists = vec![list("list-1", DEFAULT), list("list-1", "Renamed"), list("list-2", "Home")];

        let removed = enforce_default_list(&mut lists, DEFAULT);

        assert_eq!(removed, vec!["list-1".to_string()]);
        assert_eq!(lists[0].name, DEFAULT);
        assert!(!lists[0].is_deleted);
        assert!(lists[1].is_deleted);
        assert!(!lists[2].is_deleted);
    }

    #[test]
    fn test_idempotent() {
        let mut lists = vec![
            list("list-1", "Work"),
            list("list-2", DEFAULT),
            list("list-3", DEFAULT),
            list("list-4", DEFAULT),
        ];
        enforce_default_list(&mut lists, DEFAULT);
        let once = lists.clone();

        assert!(enforce_default_list(&mut lists, DEFAULT).is_empty());
        assert_eq!(lists, once);
    }

    #[test]
    fn test_no_default_is_fine() {
        let mut lists = vec![list("list-1", "Work")];
        assert!(enforce_default_list(&mut lists, DEFAULT).is_empty());
        assert_eq!(visible_default_count(&lists, DEFAULT), 0);
        assert!(enforce_default_list(&mut [], DEFAULT).is_empty());
    }
}
