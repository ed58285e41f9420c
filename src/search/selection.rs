use url::form_urlencoded;

use crate::state::Creator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Side effect requested by a key press or click. The renderer carries it out.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    None,
    /// A creator row was chosen. The modal closes.
    SelectCreator(Creator),
    /// Leave the modal for the full search page with the raw query text.
    GlobalSearch { query: String },
    Close,
}

/// Cursor over the result rows.
///
/// `-1` is "nothing selected", `len` is the synthetic "search everywhere" row
/// after the last creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    index: isize,
}

impl Selection {
    pub const NONE: isize = -1;

    pub fn new() -> Self {
        Self { index: Self::NONE }
    }

    pub fn index(&self) -> isize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = Self::NONE;
    }

    pub fn move_down(&mut self, len: usize) {
        self.index = (self.index + 1).min(len as isize);
    }

    pub fn move_up(&mut self) {
        self.index = (self.index - 1).max(Self::NONE);
    }

    /// Moves the cursor to `index`. Returns false and leaves it unchanged when out of range.
    pub fn set(&mut self, index: isize, len: usize) -> bool {
        if (Self::NONE..=len as isize).contains(&index) {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Pulls the cursor back inside `-1..=len` after the row count shrank.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len as isize);
    }

    /// What Enter does at the current position.
    pub fn activate(&self, results: &[Creator], query: &str) -> KeyAction {
        let len = results.len() as isize;
        if (0..len).contains(&self.index) {
            return KeyAction::SelectCreator(results[self.index as usize].clone());
        }
        if self.index == len || (self.index == Self::NONE && !query.is_empty()) {
            return KeyAction::GlobalSearch {
                query: query.to_string(),
            };
        }
        KeyAction::None
    }
}

/// Site path of the full search page for `query`, e.g. `/search?q=afro+beats`.
pub fn global_search_path(query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("/search?q={}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creators(n: usize) -> Vec<Creator> {
        (0..n)
            .map(|i| Creator {
                id: i.to_string(),
                name: format!("Creator {}", i),
                description: String::new(),
                avatar: None,
                verified: None,
                follower_count: None,
            })
            .collect()
    }

    #[test]
    fn test_arrow_down_stops_at_synthetic_row() {
        let mut sel = Selection::new();
        for _ in 0..10 {
            sel.move_down(3);
        }
        assert_eq!(sel.index(), 3);
    }

    #[test]
    fn test_arrow_up_stops_at_none() {
        let mut sel = Selection::new();
        sel.move_down(3);
        sel.move_down(3);
        for _ in 0..10 {
            sel.move_up();
        }
        assert_eq!(sel.index(), Selection::NONE);
    }

    #[test]
    fn test_arrow_down_with_no_results() {
        let mut sel = Selection::new();
        sel.move_down(0);
        sel.move_down(0);
        assert_eq!(sel.index(), 0);
    }

    #[test]
    fn test_activate_creator_row() {
        let results = creators(2);
        let mut sel = Selection::new();
        sel.move_down(2);
        sel.move_down(2);
        assert_eq!(sel.activate(&results, "cre"), KeyAction::SelectCreator(results[1].clone()));
    }

    #[test]
    fn test_activate_synthetic_row() {
        let results = creators(2);
        let mut sel = Selection::new();
        assert!(sel.set(2, results.len()));
        assert_eq!(
            sel.activate(&results, "cre"),
            KeyAction::GlobalSearch { query: "cre".into() }
        );
    }

    #[test]
    fn test_activate_nothing_selected() {
        let results = creators(2);
        let sel = Selection::new();
        assert_eq!(
            sel.activate(&results, "cre"),
            KeyAction::GlobalSearch { query: "cre".into() }
        );
        assert_eq!(sel.activate(&results, ""), KeyAction::None);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut sel = Selection::new();
        assert!(!sel.set(4, 3));
        assert!(!sel.set(-2, 3));
        assert_eq!(sel.index(), Selection::NONE);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut sel = Selection::new();
        sel.set(5, 5);
        sel.clamp(2);
        assert_eq!(sel.index(), 2);
    }

    #[test]
    fn test_global_search_path_encoding() {
        assert_eq!(global_search_path("art"), "/search?q=art");
        assert_eq!(global_search_path("afro beats & co"), "/search?q=afro+beats+%26+co");
        assert_eq!(global_search_path("café/bar"), "/search?q=caf%C3%A9%2Fbar");
    }
}
