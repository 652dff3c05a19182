//! termcore - terminal I/O core for text user interfaces
//!
//! Two independent pieces that every terminal backend builds on:
//!
//! - **ansi**: splits an output stream into literal text and CSI escape
//!   sequences, lazily and without allocating per token
//! - **renderer**: the lifecycle every backend goes through (scoped session,
//!   scoped raw mode, frame painting, input polling), with the guarantee
//!   that the terminal is never left raw
//!
//! # Example
//!
//! ```no_run
//! use termcore::backend::BackendKind;
//! use termcore::{Message, Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::from_kind(BackendKind::Terminal, RendererConfig::load());
//! let mut session = renderer.session()?;
//! let mut raw = session.into_raw_mode()?;
//! raw.render("hello")?;
//! while let Some(message) = raw.next_message()? {
//!     if matches!(message, Message::Key(_)) {
//!         break;
//!     }
//! }
//! # Ok::<(), termcore::Error>(())
//! ```

pub mod ansi;
pub mod backend;
pub mod config;
pub mod error;
pub mod message;
pub mod renderer;

pub use ansi::{split, Split, Token};
pub use backend::{Backend, InputPolicy, LineDiscipline};
pub use config::RendererConfig;
pub use error::{Error, Result, UsageError};
pub use message::{KeyCode, KeyEvent, Message, Modifiers};
pub use renderer::{RawMode, Renderer, Session, State};
