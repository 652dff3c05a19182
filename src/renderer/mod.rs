//! Renderer lifecycle
//!
//! [`Renderer`] wraps a [`Backend`] with the state machine every terminal
//! session goes through:
//!
//! ```text
//! Idle ──open──▶ Cooked ◀──enter_raw / leave_raw──▶ Raw
//!   ▲              │
//!   └────close─────┘          (drop from any state) ──▶ Closed
//! ```
//!
//! The scoped API is the normal way in: [`Renderer::session`] returns a
//! [`Session`] guard that closes on drop, and [`Renderer::into_raw_mode`]
//! returns a [`RawMode`] guard that restores the captured line discipline on
//! drop. Both release exactly once on every exit path, including unwinding.
//! Dropping the renderer itself restores cooked mode and closes the device
//! if a guard was leaked.

mod frame;

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::backend::{open_backend, Backend, BackendKind, LineDiscipline};
use crate::config::{PaintStrategy, RendererConfig};
use crate::error::{DeviceOp, Error, ModeOp, Result, UsageError};
use crate::message::Message;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Constructed, device cooked, no session open
    Idle,
    /// Session open, device cooked
    Cooked,
    /// Session open, device raw
    Raw,
    /// Torn down; no further use
    Closed,
}

/// A live connection to an interactive terminal
pub struct Renderer<B: Backend> {
    backend: B,
    state: State,
    /// Settings captured at raw-mode entry
    saved: Option<LineDiscipline>,
    /// Last frame successfully written, for diff painting
    last_frame: Option<String>,
    config: RendererConfig,
}

impl Renderer<Box<dyn Backend>> {
    /// Renderer over a backend chosen at runtime
    pub fn from_kind(kind: BackendKind, config: RendererConfig) -> Self {
        let backend = open_backend(kind, &config);
        Self::with_config(backend, config)
    }
}

impl<B: Backend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RendererConfig::default())
    }

    pub fn with_config(backend: B, config: RendererConfig) -> Self {
        Self {
            backend,
            state: State::Idle,
            saved: None,
            last_frame: None,
            config,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// True iff the device is currently in raw mode
    pub fn is_raw(&self) -> bool {
        self.state == State::Raw
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Cooked | State::Raw)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Last frame written to the device, if it is known to be on screen
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    /// Device size as `(cols, rows)`
    pub fn size(&self) -> Result<(u16, u16)> {
        self.backend.size().map_err(Error::device(DeviceOp::Size))
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Cooked | State::Raw => Ok(()),
            State::Idle => Err(UsageError::NotOpen.into()),
            State::Closed => Err(UsageError::Closed.into()),
        }
    }

    /// Open a session: `Idle → Cooked`
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {}
            State::Cooked | State::Raw => return Err(UsageError::AlreadyOpen.into()),
            State::Closed => return Err(UsageError::Closed.into()),
        }

        self.backend
            .open(&self.config.screen)
            .map_err(Error::mode(ModeOp::Open))?;
        self.last_frame = None;
        self.state = State::Cooked;
        debug!("renderer opened");
        Ok(())
    }

    /// Close the session: `Cooked → Idle`
    ///
    /// Raw mode must be left first.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            State::Cooked => {}
            State::Raw => return Err(UsageError::RawModeActive.into()),
            State::Idle => return Err(UsageError::NotOpen.into()),
            State::Closed => return Err(UsageError::Closed.into()),
        }

        self.backend
            .close(&self.config.screen)
            .map_err(Error::mode(ModeOp::Close))?;
        self.last_frame = None;
        self.state = State::Idle;
        debug!("renderer closed");
        Ok(())
    }

    /// Capture the current settings and switch to raw: `Cooked → Raw`
    ///
    /// Requesting raw mode while already raw is a usage error and leaves the
    /// captured settings untouched.
    pub fn enter_raw(&mut self) -> Result<()> {
        match self.state {
            State::Cooked => {}
            State::Raw => return Err(UsageError::AlreadyRaw.into()),
            State::Idle => return Err(UsageError::NotOpen.into()),
            State::Closed => return Err(UsageError::Closed.into()),
        }

        let original = self
            .backend
            .line_discipline()
            .map_err(Error::mode(ModeOp::Capture))?;
        self.backend
            .set_line_discipline(original.raw())
            .map_err(Error::mode(ModeOp::EnterRaw))?;

        self.saved = Some(original);
        self.state = State::Raw;
        debug!("entered raw mode (saved {:?})", original);
        Ok(())
    }

    /// Reapply the settings captured at entry: `Raw → Cooked`
    ///
    /// On failure the renderer stays raw with the captured settings kept,
    /// so a later attempt (or drop) can still restore them.
    pub fn leave_raw(&mut self) -> Result<()> {
        match self.state {
            State::Raw => {}
            State::Cooked | State::Idle => return Err(UsageError::NotRaw.into()),
            State::Closed => return Err(UsageError::Closed.into()),
        }
        let Some(original) = self.saved else {
            return Err(UsageError::NotRaw.into());
        };

        self.backend
            .set_line_discipline(original)
            .map_err(Error::mode(ModeOp::Restore))?;

        self.saved = None;
        self.state = State::Cooked;
        debug!("left raw mode");
        Ok(())
    }

    /// Open a session scoped to the returned guard
    pub fn session(&mut self) -> Result<Session<'_, B>> {
        self.open()?;
        Ok(Session {
            renderer: self,
            released: false,
        })
    }

    /// Enter raw mode scoped to the returned guard
    pub fn into_raw_mode(&mut self) -> Result<RawMode<'_, B>> {
        self.enter_raw()?;
        Ok(RawMode {
            renderer: self,
            released: false,
        })
    }

    /// Write a full frame to the device
    ///
    /// A failed write leaves the mode untouched. It also forgets the last
    /// frame, since the screen contents are then unknown and the next call
    /// must repaint in full.
    pub fn render(&mut self, screen: &str) -> Result<()> {
        self.ensure_open()?;

        let synchronized = self.config.paint.synchronized_output;
        let output = match (self.config.paint.strategy, self.last_frame.as_deref()) {
            (PaintStrategy::Diff, Some(previous)) => frame::paint_diff(previous, screen, synchronized),
            _ => frame::paint_full(screen, synchronized),
        };

        if output.is_empty() {
            return Ok(());
        }

        self.last_frame = None;
        self.backend
            .write(&output)
            .map_err(Error::device(DeviceOp::Write))?;
        self.backend
            .flush()
            .map_err(Error::device(DeviceOp::Flush))?;
        self.last_frame = Some(screen.to_owned());
        Ok(())
    }

    /// Next input event, waiting as the backend's
    /// [`InputPolicy`](crate::backend::InputPolicy) says
    pub fn next_message(&mut self) -> Result<Option<Message>> {
        self.ensure_open()?;

        let message = self
            .backend
            .poll_message()
            .map_err(Error::device(DeviceOp::Read))?;

        if let Some(Message::Resize { cols, rows }) = message {
            debug!("resize to {}x{}, next frame repaints in full", cols, rows);
            self.last_frame = None;
        }
        Ok(message)
    }

    /// Return the device to cooked mode and close it, whatever state it is in
    fn teardown(&mut self) {
        if self.state == State::Raw {
            if let Err(e) = self.leave_raw() {
                warn!(
                    "failed to restore line discipline on teardown, device left raw: {}",
                    e
                );
            }
        }
        if self.is_open() {
            if let Err(e) = self.backend.close(&self.config.screen) {
                warn!("failed to close terminal on teardown: {}", e);
            }
        }
        self.state = State::Closed;
    }
}

impl<B: Backend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Open session; closes on drop
pub struct Session<'r, B: Backend> {
    renderer: &'r mut Renderer<B>,
    released: bool,
}

impl<B: Backend> Session<'_, B> {
    /// Close now and report the result
    pub fn finish(mut self) -> Result<()> {
        self.release()
    }

    /// A device still raw here means an inner restore failed; it gets one
    /// more attempt before closing, and the close is skipped if that fails.
    fn release(&mut self) -> Result<()> {
        self.released = true;
        match self.renderer.state {
            State::Raw => {
                self.renderer.leave_raw()?;
                self.renderer.close()
            }
            State::Cooked => self.renderer.close(),
            // Already closed through the renderer directly
            State::Idle | State::Closed => Ok(()),
        }
    }
}

impl<B: Backend> Deref for Session<'_, B> {
    type Target = Renderer<B>;

    fn deref(&self) -> &Renderer<B> {
        &*self.renderer
    }
}

impl<B: Backend> DerefMut for Session<'_, B> {
    fn deref_mut(&mut self) -> &mut Renderer<B> {
        &mut *self.renderer
    }
}

impl<B: Backend> Drop for Session<'_, B> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release() {
                warn!("failed to close session: {}", e);
            }
        }
    }
}

/// Raw-mode scope; restores the captured line discipline on drop
pub struct RawMode<'r, B: Backend> {
    renderer: &'r mut Renderer<B>,
    released: bool,
}

impl<B: Backend> RawMode<'_, B> {
    /// Leave raw mode now and report the result
    pub fn finish(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        if self.renderer.state == State::Raw {
            self.renderer.leave_raw()
        } else {
            Ok(())
        }
    }
}

impl<B: Backend> Deref for RawMode<'_, B> {
    type Target = Renderer<B>;

    fn deref(&self) -> &Renderer<B> {
        &*self.renderer
    }
}

impl<B: Backend> DerefMut for RawMode<'_, B> {
    fn deref_mut(&mut self) -> &mut Renderer<B> {
        &mut *self.renderer
    }
}

impl<B: Backend> Drop for RawMode<'_, B> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release() {
                warn!("failed to leave raw mode: {}", e);
            }
        }
    }
}
