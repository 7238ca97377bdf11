use crossterm::event::{KeyCode, KeyEvent};

/// Screen-independent input actions; the app decides what each one means on
/// the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    MoveUp,
    MoveDown,
    NextFocus,
    Primary,
    AddPack,
    RemovePack,
    RandomFill,
    StartDraft,
    ClearSelection,
    Advance,
    AddAssociated,
    MoveCard,
    Accept,
    Export,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Esc => InputAction::ClearSelection,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::Char(' ') => InputAction::Primary,
        KeyCode::Char('a') => InputAction::AddPack,
        KeyCode::Char('d') => InputAction::RemovePack,
        KeyCode::Char('r') => InputAction::RandomFill,
        KeyCode::Char('s') => InputAction::StartDraft,
        KeyCode::Char('c') => InputAction::ClearSelection,
        KeyCode::Char('n') => InputAction::Advance,
        KeyCode::Char('x') => InputAction::AddAssociated,
        KeyCode::Char('m') => InputAction::MoveCard,
        KeyCode::Enter => InputAction::Accept,
        KeyCode::Char('e') => InputAction::Export,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn maps_basic_actions() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            InputAction::Quit
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)),
            InputAction::Primary
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)),
            InputAction::Advance
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            InputAction::Accept
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)),
            InputAction::None
        );
    }
}
