use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::host::RecyclerHost;
use crate::source::ExpandableSource;
use crate::widget::ExpandableListView;

/// Widget operations a key can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListAction {
    SelectPrev,
    SelectNext,
    SelectFirst,
    SelectLast,
    Activate,
    CollapseAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    #[default]
    Default,
    Vim,
    Arrows,
}

#[derive(Clone, Copy, Debug)]
pub struct ListKeyBindings {
    profile: KeymapProfile,
}

impl Default for ListKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl ListKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve(&self, key: KeyEvent) -> Option<ListAction> {
        let nav_action = match self.profile {
            KeymapProfile::Default => Self::resolve_default_nav(key),
            KeymapProfile::Vim => Self::resolve_vim_nav(key),
            KeymapProfile::Arrows => Self::resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }
        Self::resolve_common(key)
    }

    const fn resolve_default_nav(key: KeyEvent) -> Option<ListAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(ListAction::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(ListAction::SelectNext),
            _ => None,
        }
    }

    const fn resolve_vim_nav(key: KeyEvent) -> Option<ListAction> {
        match key.code {
            KeyCode::Char('k') => Some(ListAction::SelectPrev),
            KeyCode::Char('j') => Some(ListAction::SelectNext),
            _ => None,
        }
    }

    const fn resolve_arrow_nav(key: KeyEvent) -> Option<ListAction> {
        match key.code {
            KeyCode::Up => Some(ListAction::SelectPrev),
            KeyCode::Down => Some(ListAction::SelectNext),
            _ => None,
        }
    }

    const fn resolve_common(key: KeyEvent) -> Option<ListAction> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(ListAction::Activate),
            KeyCode::Esc => Some(ListAction::CollapseAll),
            KeyCode::Home => Some(ListAction::SelectFirst),
            KeyCode::End => Some(ListAction::SelectLast),
            _ => None,
        }
    }
}

impl<S: ExpandableSource> ExpandableListView<S> {
    pub const fn keymap(&self) -> &ListKeyBindings {
        &self.keymap
    }

    pub const fn keymap_mut(&mut self) -> &mut ListKeyBindings {
        &mut self.keymap
    }

    /// Applies the action to the current selection. Returns `false` when the
    /// action had nothing to act on.
    pub fn apply_action<H>(&mut self, host: &mut H, action: ListAction, now: Instant) -> bool
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let count = self.source().group_count();
        match action {
            ListAction::SelectPrev | ListAction::SelectNext | ListAction::SelectFirst
            | ListAction::SelectLast
                if count == 0 =>
            {
                false
            }
            ListAction::SelectPrev => {
                let group = self
                    .selected_group()
                    .map_or(0, |group| group.saturating_sub(1));
                self.set_selected_group(host, Some(group), now);
                true
            }
            ListAction::SelectNext => {
                let group = self
                    .selected_group()
                    .map_or(0, |group| (group + 1).min(count - 1));
                self.set_selected_group(host, Some(group), now);
                true
            }
            ListAction::SelectFirst => {
                self.set_selected_group(host, Some(0), now);
                true
            }
            ListAction::SelectLast => {
                self.set_selected_group(host, Some(count - 1), now);
                true
            }
            ListAction::Activate => {
                if let Some(group) = self.selected_group() {
                    self.activate_group(host, group, now);
                    true
                } else {
                    false
                }
            }
            ListAction::CollapseAll => {
                self.collapse_all(host, now);
                true
            }
        }
    }

    /// Translates a key event through the bindings and applies it.
    pub fn handle_key<H>(&mut self, host: &mut H, key: KeyEvent, now: Instant) -> bool
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let Some(action) = self.keymap.resolve(key) else {
            return false;
        };
        self.apply_action(host, action, now)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn default_profile_accepts_arrows_and_vim_keys() {
        let bindings = ListKeyBindings::new();
        assert_eq!(bindings.resolve(key(KeyCode::Up)), Some(ListAction::SelectPrev));
        assert_eq!(
            bindings.resolve(key(KeyCode::Char('j'))),
            Some(ListAction::SelectNext)
        );
        assert_eq!(
            bindings.resolve(key(KeyCode::Enter)),
            Some(ListAction::Activate)
        );
        assert_eq!(
            bindings.resolve(key(KeyCode::Esc)),
            Some(ListAction::CollapseAll)
        );
        assert_eq!(bindings.resolve(key(KeyCode::Tab)), None);
    }

    #[test]
    fn arrows_profile_ignores_vim_keys() {
        let bindings = ListKeyBindings::with_profile(KeymapProfile::Arrows);
        assert_eq!(bindings.resolve(key(KeyCode::Char('j'))), None);
        assert_eq!(
            bindings.resolve(key(KeyCode::Down)),
            Some(ListAction::SelectNext)
        );
    }

    #[test]
    fn vim_profile_ignores_arrows() {
        let bindings = ListKeyBindings::with_profile(KeymapProfile::Vim);
        assert_eq!(bindings.resolve(key(KeyCode::Up)), None);
        assert_eq!(
            bindings.resolve(key(KeyCode::Char('k'))),
            Some(ListAction::SelectPrev)
        );
    }
}
