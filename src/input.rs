use crate::app::Screen;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    Back,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Select,
    ToggleDetail,
    OpenEditor,
    None,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone)]
pub struct InputContext {
    pub screen: Screen,
    pub has_error: bool,
    pub is_loading: bool,
}

impl Default for InputContext {
    fn default() -> Self {
        Self {
            screen: Screen::Commits,
            has_error: false,
            is_loading: false,
        }
    }
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let on_tree = matches!(ctx.screen, Screen::Logs | Screen::Tests);

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Back
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Action::Top,
        KeyCode::End | KeyCode::Char('G') => Action::Bottom,
        KeyCode::Enter | KeyCode::Char(' ') if on_tree || !ctx.is_loading => Action::Select,
        KeyCode::Char('d') if on_tree => Action::ToggleDetail,
        KeyCode::Tab if on_tree => Action::OpenEditor,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn ctx(screen: Screen) -> InputContext {
        InputContext {
            screen,
            ..InputContext::default()
        }
    }

    #[test]
    fn quit_on_q() {
        assert_eq!(map_key(press(KeyCode::Char('q')), &ctx(Screen::Logs)), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits() {
        let key = press_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, &ctx(Screen::Tests)), Action::Quit);
    }

    #[test]
    fn esc_goes_back() {
        assert_eq!(map_key(press(KeyCode::Esc), &ctx(Screen::Checks)), Action::Back);
    }

    #[test]
    fn esc_dismisses_error_first() {
        let c = InputContext {
            has_error: true,
            ..ctx(Screen::Logs)
        };
        assert_eq!(map_key(press(KeyCode::Esc), &c), Action::DismissError);
    }

    #[test]
    fn vertical_movement() {
        let c = ctx(Screen::Commits);
        assert_eq!(map_key(press(KeyCode::Up), &c), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Char('k')), &c), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Down), &c), Action::MoveDown);
        assert_eq!(map_key(press(KeyCode::Char('j')), &c), Action::MoveDown);
        assert_eq!(map_key(press(KeyCode::PageDown), &c), Action::PageDown);
        assert_eq!(map_key(press(KeyCode::PageUp), &c), Action::PageUp);
        assert_eq!(map_key(press(KeyCode::Char('g')), &c), Action::Top);
        assert_eq!(map_key(press(KeyCode::Char('G')), &c), Action::Bottom);
    }

    #[test]
    fn enter_and_space_select() {
        let c = ctx(Screen::Logs);
        assert_eq!(map_key(press(KeyCode::Enter), &c), Action::Select);
        assert_eq!(map_key(press(KeyCode::Char(' ')), &c), Action::Select);
    }

    #[test]
    fn select_blocked_while_loading_lists() {
        let c = InputContext {
            is_loading: true,
            ..ctx(Screen::Checks)
        };
        assert_eq!(map_key(press(KeyCode::Enter), &c), Action::None);
    }

    #[test]
    fn tree_toggles_work_while_loading() {
        let c = InputContext {
            is_loading: true,
            ..ctx(Screen::Tests)
        };
        assert_eq!(map_key(press(KeyCode::Enter), &c), Action::Select);
    }

    #[test]
    fn tab_opens_editor_on_tree_screens_only() {
        assert_eq!(map_key(press(KeyCode::Tab), &ctx(Screen::Tests)), Action::OpenEditor);
        assert_eq!(map_key(press(KeyCode::Tab), &ctx(Screen::Logs)), Action::OpenEditor);
        assert_eq!(map_key(press(KeyCode::Tab), &ctx(Screen::Commits)), Action::None);
    }

    #[test]
    fn detail_toggle_on_tree_screens_only() {
        assert_eq!(map_key(press(KeyCode::Char('d')), &ctx(Screen::Logs)), Action::ToggleDetail);
        assert_eq!(map_key(press(KeyCode::Char('d')), &ctx(Screen::Checks)), Action::None);
    }

    #[test]
    fn unbound_key_returns_none() {
        assert_eq!(map_key(press(KeyCode::Char('z')), &ctx(Screen::Logs)), Action::None);
    }

    #[test]
    fn non_press_event_filtered() {
        assert_eq!(map_key(release(KeyCode::Char('q')), &ctx(Screen::Logs)), Action::None);
    }
}
