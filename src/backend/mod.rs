//! Terminal device backends.
//!
//! A [`Backend`] is the device the renderer drives. It can:
//!
//! - read and apply line-discipline/echo settings
//! - write text
//! - yield decoded input events
//!
//! The renderer owns the lifecycle and the backend only does the I/O.
//!
//! - **terminal**: real tty / Windows console through crossterm
//! - **memory**: in-memory device with fault injection, for tests

pub mod memory;
pub mod terminal;

use std::io;
use std::time::Duration;

use bitflags::bitflags;

use crate::config::{RendererConfig, ScreenConfig};
use crate::message::Message;

pub use memory::{Fault, MemoryBackend, MemoryHandle};
pub use terminal::CrosstermBackend;

bitflags! {
    /// Line-discipline and echo settings of a terminal device
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LineDiscipline: u8 {
        /// Echo typed characters
        const ECHO              = 0b00_0001;
        /// Line-buffered input with editing
        const CANONICAL         = 0b00_0010;
        /// Ctrl+C / Ctrl+Z generate signals
        const SIGNALS           = 0b00_0100;
        /// Implementation-defined input processing (Ctrl+V)
        const EXTENDED          = 0b00_1000;
        /// XON/XOFF flow control
        const FLOW_CONTROL      = 0b01_0000;
        /// Output post-processing (`\n` to `\r\n`)
        const OUTPUT_PROCESSING = 0b10_0000;

        /// Typical settings of a fresh interactive terminal
        const COOKED = Self::ECHO.bits()
            | Self::CANONICAL.bits()
            | Self::SIGNALS.bits()
            | Self::EXTENDED.bits()
            | Self::FLOW_CONTROL.bits()
            | Self::OUTPUT_PROCESSING.bits();
    }
}

impl Default for LineDiscipline {
    fn default() -> Self {
        Self::COOKED
    }
}

impl LineDiscipline {
    /// Input-side flags cleared by raw mode
    const RAW_CLEARED: Self = Self::ECHO
        .union(Self::CANONICAL)
        .union(Self::SIGNALS)
        .union(Self::EXTENDED)
        .union(Self::FLOW_CONTROL);

    /// Raw variant of these settings
    pub fn raw(self) -> Self {
        self.difference(Self::RAW_CLEARED)
    }

    /// No line buffering and no echo
    pub fn is_raw(self) -> bool {
        !self.intersects(Self::ECHO | Self::CANONICAL)
    }
}

/// How [`Backend::poll_message`] waits for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPolicy {
    /// Wait until an event arrives
    Blocking,
    /// Return `None` immediately when nothing is queued
    NonBlocking,
    /// Wait up to the given duration, then return `None`
    Timeout(Duration),
}

/// Device collaborator driven by a [`Renderer`](crate::renderer::Renderer)
pub trait Backend {
    /// Read the current line-discipline settings
    fn line_discipline(&mut self) -> io::Result<LineDiscipline>;

    /// Apply line-discipline settings
    fn set_line_discipline(&mut self, settings: LineDiscipline) -> io::Result<()>;

    /// Queue text for the device
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Next decoded input event, waiting per [`input_policy`](Self::input_policy).
    ///
    /// A timed-out or empty poll consumes nothing.
    fn poll_message(&mut self) -> io::Result<Option<Message>>;

    fn input_policy(&self) -> InputPolicy;

    /// Screen setup when a session opens
    fn open(&mut self, screen: &ScreenConfig) -> io::Result<()>;

    /// Undo what [`open`](Self::open) did for the same `screen`
    fn close(&mut self, screen: &ScreenConfig) -> io::Result<()>;

    /// Device size as `(cols, rows)`
    fn size(&self) -> io::Result<(u16, u16)>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn line_discipline(&mut self) -> io::Result<LineDiscipline> {
        (**self).line_discipline()
    }

    fn set_line_discipline(&mut self, settings: LineDiscipline) -> io::Result<()> {
        (**self).set_line_discipline(settings)
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn poll_message(&mut self) -> io::Result<Option<Message>> {
        (**self).poll_message()
    }

    fn input_policy(&self) -> InputPolicy {
        (**self).input_policy()
    }

    fn open(&mut self, screen: &ScreenConfig) -> io::Result<()> {
        (**self).open(screen)
    }

    fn close(&mut self, screen: &ScreenConfig) -> io::Result<()> {
        (**self).close(screen)
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }
}

/// Backend variant chosen at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The process's controlling terminal
    Terminal,
    /// Detached in-memory device
    Memory,
}

/// Construct a backend of the given kind
pub fn open_backend(kind: BackendKind, config: &RendererConfig) -> Box<dyn Backend> {
    match kind {
        BackendKind::Terminal => Box::new(CrosstermBackend::new(config.input.policy())),
        BackendKind::Memory => Box::new(MemoryBackend::new().0),
    }
}
