//! Terminal backend using crossterm
//!
//! Drives the process's controlling terminal. crossterm saves the original
//! termios (or console mode) when raw mode is enabled and reinstates it when
//! raw mode is disabled, so restoring cooked mode returns the device to its
//! exact prior settings.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Instant;

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableBracketedPaste, DisableFocusChange, DisableMouseCapture,
        EnableBracketedPaste, EnableFocusChange, EnableMouseCapture,
    },
    queue,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::{Backend, InputPolicy, LineDiscipline};
use crate::config::ScreenConfig;
use crate::message::Message;

/// Terminal backend
pub struct CrosstermBackend {
    out: BufWriter<Stdout>,
    policy: InputPolicy,
}

impl CrosstermBackend {
    pub fn new(policy: InputPolicy) -> Self {
        Self {
            out: BufWriter::with_capacity(65536, io::stdout()),
            policy,
        }
    }

    /// Read one event and convert it; events with no message map to `None`
    fn read_one() -> io::Result<Option<Message>> {
        Ok(Message::from_crossterm(event::read()?))
    }
}

impl Backend for CrosstermBackend {
    /// crossterm exposes only whether raw mode is on, so this reports one of
    /// two canonical values.
    fn line_discipline(&mut self) -> io::Result<LineDiscipline> {
        if terminal::is_raw_mode_enabled()? {
            Ok(LineDiscipline::COOKED.raw())
        } else {
            Ok(LineDiscipline::COOKED)
        }
    }

    fn set_line_discipline(&mut self, settings: LineDiscipline) -> io::Result<()> {
        if settings.is_raw() {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        }
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn poll_message(&mut self) -> io::Result<Option<Message>> {
        match self.policy {
            InputPolicy::Blocking => loop {
                if let Some(message) = Self::read_one()? {
                    return Ok(Some(message));
                }
            },
            InputPolicy::NonBlocking => {
                while event::poll(std::time::Duration::ZERO)? {
                    if let Some(message) = Self::read_one()? {
                        return Ok(Some(message));
                    }
                }
                Ok(None)
            }
            InputPolicy::Timeout(wait) => {
                let deadline = Instant::now() + wait;
                loop {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    // poll() only reports readiness; nothing is consumed on timeout
                    if !event::poll(remaining)? {
                        return Ok(None);
                    }
                    if let Some(message) = Self::read_one()? {
                        return Ok(Some(message));
                    }
                }
            }
        }
    }

    fn input_policy(&self) -> InputPolicy {
        self.policy
    }

    fn open(&mut self, screen: &ScreenConfig) -> io::Result<()> {
        if screen.alternate_screen {
            queue!(self.out, EnterAlternateScreen)?;
        }
        if screen.hide_cursor {
            queue!(self.out, Hide)?;
        }
        if screen.mouse_capture {
            queue!(self.out, EnableMouseCapture)?;
        }
        if screen.bracketed_paste {
            queue!(self.out, EnableBracketedPaste)?;
        }
        if screen.focus_reporting {
            queue!(self.out, EnableFocusChange)?;
        }
        self.out.flush()
    }

    fn close(&mut self, screen: &ScreenConfig) -> io::Result<()> {
        if screen.focus_reporting {
            queue!(self.out, DisableFocusChange)?;
        }
        if screen.bracketed_paste {
            queue!(self.out, DisableBracketedPaste)?;
        }
        if screen.mouse_capture {
            queue!(self.out, DisableMouseCapture)?;
        }
        queue!(self.out, ResetColor, SetAttribute(Attribute::Reset))?;
        if screen.hide_cursor {
            queue!(self.out, Show)?;
        }
        if screen.alternate_screen {
            queue!(self.out, LeaveAlternateScreen)?;
        }
        self.out.flush()
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }
}
