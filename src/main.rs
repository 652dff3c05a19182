//! termcore-demo - drives a terminal through the termcore renderer
//!
//! Paints a small status frame and echoes the last input event. Press `q`
//! or `Esc` to quit.
//!
//! ```text
//! termcore-demo              # terminal backend, config from ~/.termcore/config.toml
//! termcore-demo --memory     # in-memory backend, prints what would be written
//! ```
//!
//! Logs go to `~/.termcore/termcore.log`; set `RUST_LOG` to adjust.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use termcore::backend::{Backend, BackendKind, MemoryBackend};
use termcore::{ansi, KeyCode, Message, Renderer, RendererConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    let log_path = env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .map(|h| PathBuf::from(h).join(".termcore").join("termcore.log"))
        .unwrap_or_else(|| PathBuf::from("termcore.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    // stdout is the terminal being driven, so logs only go to the file
    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn frame(size: (u16, u16), last: Option<&Message>, count: usize) -> String {
    let title = format!("\x1b[1m\x1b[32mtermcore {}\x1b[0m", VERSION);
    let last = match last {
        Some(message) => format!("{:?}", message),
        None => "(none yet)".to_string(),
    };
    let status = format!(" size {}x{} | events {}", size.0, size.1, count);
    let pad = usize::from(size.0).saturating_sub(ansi::display_width(&status));
    let lines = [
        title,
        String::new(),
        format!("last event: \x1b[33m{}\x1b[0m", last),
        String::new(),
        "press q or Esc to quit".to_string(),
        format!("\x1b[7m{}{}\x1b[0m", status, " ".repeat(pad)),
    ];
    lines.join("\n")
}

fn run<B: Backend>(renderer: &mut Renderer<B>) -> anyhow::Result<()> {
    let mut session = renderer.session().context("failed to open terminal")?;
    let mut raw = session.into_raw_mode().context("failed to enter raw mode")?;

    let mut last = None;
    let mut count = 0;
    loop {
        let size = raw.size()?;
        raw.render(&frame(size, last.as_ref(), count))?;

        match raw.next_message()? {
            Some(Message::Key(key)) if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) => {
                info!("quit requested");
                break;
            }
            Some(message) => {
                count += 1;
                last = Some(message);
            }
            None => {}
        }
    }

    raw.finish().context("failed to restore terminal")?;
    session.finish()?;
    Ok(())
}

fn run_memory(config: RendererConfig) -> anyhow::Result<()> {
    let (backend, handle) = MemoryBackend::new();
    handle.push_message(Message::Paste("hello".to_string()));
    handle.push_message(Message::Key(termcore::KeyEvent::plain(KeyCode::Char('q'))));

    let mut renderer = Renderer::with_config(backend, config);
    run(&mut renderer)?;

    for token in ansi::tokens(&handle.output()) {
        println!("{:?}", token);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-v" || a == "--version") {
        eprintln!("termcore-demo {}", VERSION);
        return Ok(());
    }

    init_logging();
    info!("termcore-demo starting...");

    let config = RendererConfig::load();
    if args.iter().any(|a| a == "--memory") {
        return run_memory(config);
    }

    let mut renderer = Renderer::from_kind(BackendKind::Terminal, config);
    run(&mut renderer)
}
