#![forbid(unsafe_code)]

//! Optional caller callbacks of a [`DataSource`](crate::DataSource).
//!
//! Every slot is optional. When a slot is empty the data source falls back
//! to a fixed default:
//!
//! | Slot                   | Default when absent                 |
//! |------------------------|-------------------------------------|
//! | `did_select`           | nothing                             |
//! | `can_move`             | `false`                             |
//! | `target_moved_item`    | proposed destination is kept        |
//! | `can_edit`             | `false`                             |
//! | `will_delete`          | nothing                             |
//! | `did_delete`           | nothing                             |
//! | `section_header_title` | no title                            |
//! | `section_footer_title` | no title                            |
//! | `did_change_sections`  | nothing                             |

use std::fmt;

use rowsync_core::{AffectedGroups, Key, Location, LocationWithOptionalItem, MoveTargetResolver};

pub type LocationHandler<T> = Box<dyn Fn(&Location<T>)>;
pub type LocationPredicate<T> = Box<dyn Fn(&Location<T>) -> bool>;
pub type TitleProvider = Box<dyn Fn(&Key) -> Option<String>>;

pub struct Hooks<T> {
    pub did_select: Option<LocationHandler<T>>,
    pub can_move: Option<LocationPredicate<T>>,
    pub target_moved_item: Option<Box<MoveTargetResolver<T>>>,
    pub can_edit: Option<LocationPredicate<T>>,
    pub will_delete: Option<LocationHandler<T>>,
    pub did_delete: Option<Box<dyn Fn(&T)>>,
    pub section_header_title: Option<TitleProvider>,
    pub section_footer_title: Option<TitleProvider>,
    pub did_change_sections: Option<Box<dyn Fn(&AffectedGroups<T>)>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            did_select: None,
            can_move: None,
            target_moved_item: None,
            can_edit: None,
            will_delete: None,
            did_delete: None,
            section_header_title: None,
            section_footer_title: None,
            did_change_sections: None,
        }
    }
}

impl<T> fmt::Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("did_select", &self.did_select.is_some())
            .field("can_move", &self.can_move.is_some())
            .field("target_moved_item", &self.target_moved_item.is_some())
            .field("can_edit", &self.can_edit.is_some())
            .field("will_delete", &self.will_delete.is_some())
            .field("did_delete", &self.did_delete.is_some())
            .field("section_header_title", &self.section_header_title.is_some())
            .field("section_footer_title", &self.section_footer_title.is_some())
            .field("did_change_sections", &self.did_change_sections.is_some())
            .finish()
    }
}

impl<T> Hooks<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_select(mut self, f: impl Fn(&Location<T>) + 'static) -> Self {
        self.did_select = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn can_move_when(mut self, f: impl Fn(&Location<T>) -> bool + 'static) -> Self {
        self.can_move = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn resolve_move_target_with(
        mut self,
        f: impl Fn(&Location<T>, &LocationWithOptionalItem<T>) -> LocationWithOptionalItem<T> + 'static,
    ) -> Self {
        self.target_moved_item = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn can_edit_when(mut self, f: impl Fn(&Location<T>) -> bool + 'static) -> Self {
        self.can_edit = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_will_delete(mut self, f: impl Fn(&Location<T>) + 'static) -> Self {
        self.will_delete = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_did_delete(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.did_delete = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn header_titles(mut self, f: impl Fn(&Key) -> Option<String> + 'static) -> Self {
        self.section_header_title = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn footer_titles(mut self, f: impl Fn(&Key) -> Option<String> + 'static) -> Self {
        self.section_footer_title = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_sections_changed(mut self, f: impl Fn(&AffectedGroups<T>) + 'static) -> Self {
        self.did_change_sections = Some(Box::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_slots() {
        let hooks: Hooks<String> = Hooks::new();
        let debug = format!("{hooks:?}");
        assert!(!debug.contains("true"));
    }

    #[test]
    fn builders_fill_slots() {
        let hooks: Hooks<String> = Hooks::new()
            .can_move_when(|loc| loc.item == "2")
            .header_titles(|key| Some(format!("Section {key}")));
        let loc = Location::new(Key::from("a"), "2".to_string());
        assert!(hooks.can_move.as_ref().is_some_and(|f| f(&loc)));
        let title = hooks.section_header_title.as_ref().and_then(|f| f(&Key::from("a")));
        assert_eq!(title.as_deref(), Some("Section a"));
        assert!(hooks.did_select.is_none());
    }
}
