use super::{filter_commands, is_command_mode};

/// Key classes the completion menu reacts to; anything else belongs to the
/// input editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Tab,
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKeyAction {
    /// Key not consumed; forward it to the editor.
    NotHandled,
    Moved,
    /// Accept the command at this index of the filtered list.
    Select(usize),
    Closed,
}

/// Completion-menu state for slash-command entry.
///
/// Pure transitions over (input text, key) pairs, decoupled from any UI
/// event object; the caller owns rendering and command acceptance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandMenu {
    visible: bool,
    filter: String,
    selected: usize,
}

impl CommandMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Track the input buffer. The menu shows while the input could still
    /// become a command; the selection clamps to the filtered list so it
    /// never points past the end as the user keeps typing.
    pub fn on_input_change(&mut self, input: &str) {
        if is_command_mode(input) {
            self.visible = true;
            self.filter = input.to_string();
            let filtered_len = filter_commands(input).len();
            self.selected = self.selected.min(filtered_len.saturating_sub(1));
        } else {
            self.visible = false;
            self.filter.clear();
            self.selected = 0;
        }
    }

    pub fn on_key(&mut self, key: MenuKey, filtered_len: usize) -> MenuKeyAction {
        if !self.visible || filtered_len == 0 {
            return MenuKeyAction::NotHandled;
        }

        match key {
            MenuKey::Down => {
                self.selected = (self.selected + 1) % filtered_len;
                MenuKeyAction::Moved
            }
            MenuKey::Up => {
                self.selected = (self.selected + filtered_len - 1) % filtered_len;
                MenuKeyAction::Moved
            }
            MenuKey::Tab | MenuKey::Enter => {
                if self.selected < filtered_len {
                    MenuKeyAction::Select(self.selected)
                } else {
                    MenuKeyAction::NotHandled
                }
            }
            MenuKey::Escape => {
                self.visible = false;
                MenuKeyAction::Closed
            }
            MenuKey::Other => MenuKeyAction::NotHandled,
        }
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.filter.clear();
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_menu(input: &str) -> CommandMenu {
        let mut menu = CommandMenu::new();
        menu.on_input_change(input);
        assert!(menu.is_visible());
        menu
    }

    #[test]
    fn test_menu_opens_only_in_command_mode() {
        let mut menu = CommandMenu::new();

        menu.on_input_change("/co");
        assert!(menu.is_visible());
        assert_eq!(menu.filter(), "/co");

        menu.on_input_change("/code hello");
        assert!(!menu.is_visible());
        assert_eq!(menu.filter(), "");
        assert_eq!(menu.selected(), 0);
    }

    #[test]
    fn test_selection_wraps_in_both_directions() {
        let mut menu = open_menu("/");

        assert_eq!(menu.on_key(MenuKey::Up, 4), MenuKeyAction::Moved);
        assert_eq!(menu.selected(), 3);

        assert_eq!(menu.on_key(MenuKey::Down, 4), MenuKeyAction::Moved);
        assert_eq!(menu.selected(), 0);
        menu.on_key(MenuKey::Down, 4);
        assert_eq!(menu.selected(), 1);
    }

    #[test]
    fn test_selection_clamps_when_filter_narrows() {
        let mut menu = open_menu("/");
        menu.on_key(MenuKey::Down, 4);
        menu.on_key(MenuKey::Down, 4);
        menu.on_key(MenuKey::Down, 4);
        assert_eq!(menu.selected(), 3);

        menu.on_input_change("/ex");
        assert_eq!(menu.selected(), 0);
    }

    #[test]
    fn test_enter_and_tab_select_current_entry() {
        let mut menu = open_menu("/");
        menu.on_key(MenuKey::Down, 4);

        assert_eq!(menu.on_key(MenuKey::Enter, 4), MenuKeyAction::Select(1));
        assert_eq!(menu.on_key(MenuKey::Tab, 4), MenuKeyAction::Select(1));
    }

    #[test]
    fn test_escape_closes_the_menu() {
        let mut menu = open_menu("/");
        assert_eq!(menu.on_key(MenuKey::Escape, 4), MenuKeyAction::Closed);
        assert!(!menu.is_visible());
        assert_eq!(menu.on_key(MenuKey::Down, 4), MenuKeyAction::NotHandled);
    }

    #[test]
    fn test_hidden_or_empty_menu_handles_nothing() {
        let mut menu = CommandMenu::new();
        assert_eq!(menu.on_key(MenuKey::Enter, 4), MenuKeyAction::NotHandled);

        let mut menu = open_menu("/");
        assert_eq!(menu.on_key(MenuKey::Down, 0), MenuKeyAction::NotHandled);
        assert_eq!(menu.on_key(MenuKey::Other, 4), MenuKeyAction::NotHandled);
    }
}
