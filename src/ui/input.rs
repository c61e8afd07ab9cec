use crate::ui::message::AppMessage;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key(key: KeyEvent) -> Option<AppMessage> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(AppMessage::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppMessage::Quit),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(AppMessage::SelectNext),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(AppMessage::SelectPrevious),
            (KeyCode::Enter, _) => Some(AppMessage::PlaySelected),
            (KeyCode::Char(' '), _) => Some(AppMessage::TogglePlayPause),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(AppMessage::SeekForward),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(AppMessage::SeekBackward),
            (KeyCode::Char(']'), _) => Some(AppMessage::FasterRate),
            (KeyCode::Char('['), _) => Some(AppMessage::SlowerRate),
            (KeyCode::Char('s'), _) => Some(AppMessage::Stop),
            (KeyCode::Char(digit @ '0'..='9'), _) => {
                digit.to_digit(10).map(|tenth| AppMessage::SeekToTenth(tenth as u8))
            }
            _ => None,
        }
    }
}
