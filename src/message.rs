//! Input messages
//!
//! A [`Message`] is a decoded input event handed out by a backend. It is an
//! owned value with no reference back into the renderer.

use bitflags::bitflags;
use crossterm::event::{
    Event, KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton as CtMouseButton, MouseEvent as CtMouseEvent, MouseEventKind,
};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Logical key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Tab,
    BackTab,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Plain key press without modifiers
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

/// Mouse event in 0-based cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub column: u16,
    pub row: u16,
    pub modifiers: Modifiers,
}

/// A discrete input event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal was resized to the given cell dimensions
    Resize { cols: u16, rows: u16 },
    /// Bracketed paste content
    Paste(String),
    FocusGained,
    FocusLost,
}

impl Message {
    /// Convert a crossterm event.
    ///
    /// Key releases and keys with no logical equivalent map to `None`.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => map_key(&key).map(Message::Key),
            Event::Mouse(mouse) => map_mouse(&mouse).map(Message::Mouse),
            Event::Resize(cols, rows) => Some(Message::Resize { cols, rows }),
            Event::Paste(text) => Some(Message::Paste(text)),
            Event::FocusGained => Some(Message::FocusGained),
            Event::FocusLost => Some(Message::FocusLost),
        }
    }
}

fn map_key(event: &CtKeyEvent) -> Option<KeyEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let code = match event.code {
        CtKeyCode::Char(ch) => KeyCode::Char(ch),
        CtKeyCode::Enter => KeyCode::Enter,
        CtKeyCode::Backspace => KeyCode::Backspace,
        CtKeyCode::Tab => KeyCode::Tab,
        CtKeyCode::BackTab => KeyCode::BackTab,
        CtKeyCode::Esc => KeyCode::Esc,
        CtKeyCode::Up => KeyCode::Up,
        CtKeyCode::Down => KeyCode::Down,
        CtKeyCode::Left => KeyCode::Left,
        CtKeyCode::Right => KeyCode::Right,
        CtKeyCode::Home => KeyCode::Home,
        CtKeyCode::End => KeyCode::End,
        CtKeyCode::PageUp => KeyCode::PageUp,
        CtKeyCode::PageDown => KeyCode::PageDown,
        CtKeyCode::Insert => KeyCode::Insert,
        CtKeyCode::Delete => KeyCode::Delete,
        CtKeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };

    Some(KeyEvent::new(code, Modifiers::from(event.modifiers)))
}

fn map_button(button: CtMouseButton) -> MouseButton {
    match button {
        CtMouseButton::Left => MouseButton::Left,
        CtMouseButton::Right => MouseButton::Right,
        CtMouseButton::Middle => MouseButton::Middle,
    }
}

fn map_mouse(event: &CtMouseEvent) -> Option<MouseEvent> {
    let kind = match event.kind {
        MouseEventKind::Down(b) => MouseKind::Down(map_button(b)),
        MouseEventKind::Up(b) => MouseKind::Up(map_button(b)),
        MouseEventKind::Drag(b) => MouseKind::Drag(map_button(b)),
        MouseEventKind::Moved => MouseKind::Moved,
        MouseEventKind::ScrollUp => MouseKind::ScrollUp,
        MouseEventKind::ScrollDown => MouseKind::ScrollDown,
        // Horizontal scrolling is not surfaced
        _ => return None,
    };

    Some(MouseEvent {
        kind,
        column: event.column,
        row: event.row,
        modifiers: Modifiers::from(event.modifiers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key_event(code: CtKeyCode, mods: KeyModifiers) -> Event {
        Event::Key(CtKeyEvent::new(code, mods))
    }

    #[test]
    fn test_char_keys() {
        let msg = Message::from_crossterm(key_event(CtKeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(msg, Some(Message::Key(KeyEvent::plain(KeyCode::Char('a')))));

        let msg = Message::from_crossterm(key_event(CtKeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(
            msg,
            Some(Message::Key(KeyEvent::new(KeyCode::Char('c'), Modifiers::CTRL)))
        );
    }

    #[test]
    fn test_modifier_combination() {
        let mods = Modifiers::from(KeyModifiers::SHIFT | KeyModifiers::ALT);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(Modifiers::from(KeyModifiers::NONE), Modifiers::empty());
    }

    #[test]
    fn test_key_release_dropped() {
        let release = CtKeyEvent {
            code: CtKeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(Message::from_crossterm(Event::Key(release)), None);
    }

    #[test]
    fn test_unmapped_key_dropped() {
        let msg = Message::from_crossterm(key_event(CtKeyCode::CapsLock, KeyModifiers::NONE));
        assert_eq!(msg, None);
    }

    #[test]
    fn test_function_and_arrow_keys() {
        let msg = Message::from_crossterm(key_event(CtKeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(msg, Some(Message::Key(KeyEvent::plain(KeyCode::F(5)))));

        let msg = Message::from_crossterm(key_event(CtKeyCode::Up, KeyModifiers::CONTROL));
        assert_eq!(
            msg,
            Some(Message::Key(KeyEvent::new(KeyCode::Up, Modifiers::CTRL)))
        );
    }

    #[test]
    fn test_mouse_events() {
        let event = CtMouseEvent {
            kind: MouseEventKind::Down(CtMouseButton::Right),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            Message::from_crossterm(Event::Mouse(event)),
            Some(Message::Mouse(MouseEvent {
                kind: MouseKind::Down(MouseButton::Right),
                column: 10,
                row: 5,
                modifiers: Modifiers::empty(),
            }))
        );

        let event = CtMouseEvent {
            kind: MouseEventKind::ScrollLeft,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(Message::from_crossterm(Event::Mouse(event)), None);
    }

    #[test]
    fn test_other_events() {
        assert_eq!(
            Message::from_crossterm(Event::Resize(120, 40)),
            Some(Message::Resize { cols: 120, rows: 40 })
        );
        assert_eq!(
            Message::from_crossterm(Event::Paste("hi".to_string())),
            Some(Message::Paste("hi".to_string()))
        );
        assert_eq!(Message::from_crossterm(Event::FocusLost), Some(Message::FocusLost));
    }
}
