use std::io;
use std::panic::{self, AssertUnwindSafe};

use proptest::prelude::*;

use termcore::backend::{BackendKind, Fault, MemoryBackend};
use termcore::error::{DeviceOp, ModeOp};
use termcore::{
    Error, KeyCode, KeyEvent, LineDiscipline, Message, Renderer, RendererConfig, State, UsageError,
};

#[test]
fn raw_mode_restored_after_failures_inside_scope() {
    let original = LineDiscipline::ECHO | LineDiscipline::CANONICAL | LineDiscipline::OUTPUT_PROCESSING;
    let (backend, handle) = MemoryBackend::with_discipline(original);
    let mut renderer = Renderer::new(backend);

    let mut session = renderer.session().unwrap();
    {
        let mut raw = session.into_raw_mode().unwrap();
        assert_eq!(handle.discipline(), LineDiscipline::OUTPUT_PROCESSING);

        handle.fail_next(Fault::Write, io::ErrorKind::BrokenPipe);
        assert!(raw.render("frame").is_err());
        handle.fail_next(Fault::Poll, io::ErrorKind::Other);
        assert!(raw.next_message().is_err());
        assert!(raw.is_raw());
    }
    assert_eq!(handle.discipline(), original);
    assert_eq!(session.state(), State::Cooked);
}

#[test]
fn render_failure_isolation() {
    let (backend, handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);
    let mut session = renderer.session().unwrap();
    let mut raw = session.into_raw_mode().unwrap();

    handle.fail_next(Fault::Flush, io::ErrorKind::Other);
    let err = raw.render("x").unwrap_err();
    assert!(matches!(err, Error::Device { op: DeviceOp::Flush, .. }));

    raw.finish().unwrap();
    assert_eq!(handle.discipline(), LineDiscipline::COOKED);
    session.finish().unwrap();
    assert!(!handle.is_open());
}

#[test]
fn raw_mode_restored_on_panic() {
    let (backend, handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut session = renderer.session().unwrap();
        let mut raw = session.into_raw_mode().unwrap();
        raw.render("about to fail").unwrap();
        panic!("application bug");
    }));

    assert!(result.is_err());
    assert_eq!(handle.discipline(), LineDiscipline::COOKED);
    assert!(!handle.is_open());
    assert_eq!(renderer.state(), State::Idle);
}

#[test]
fn early_return_releases_scopes() {
    fn run(renderer: &mut Renderer<MemoryBackend>) -> termcore::Result<()> {
        let mut session = renderer.session()?;
        let mut raw = session.into_raw_mode()?;
        while let Some(message) = raw.next_message()? {
            if message == Message::Key(KeyEvent::plain(KeyCode::Esc)) {
                return Ok(());
            }
        }
        Ok(())
    }

    let (backend, handle) = MemoryBackend::new();
    handle.push_message(Message::FocusGained);
    handle.push_message(Message::Key(KeyEvent::plain(KeyCode::Esc)));
    handle.push_message(Message::FocusLost);

    let mut renderer = Renderer::new(backend);
    run(&mut renderer).unwrap();

    assert_eq!(renderer.state(), State::Idle);
    assert_eq!(handle.discipline(), LineDiscipline::COOKED);
    assert_eq!(handle.pending_messages(), 1);
}

#[test]
fn session_can_reopen_after_close() {
    let (backend, handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);

    renderer.session().unwrap().finish().unwrap();
    renderer.session().unwrap().finish().unwrap();
    assert_eq!(handle.closes(), 2);
}

#[test]
fn dropped_renderer_restores_raw_device() {
    let (backend, handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);
    renderer.open().unwrap();
    renderer.enter_raw().unwrap();
    renderer.render("left behind").unwrap();
    drop(renderer);

    assert_eq!(handle.discipline(), LineDiscipline::COOKED);
    assert!(!handle.is_open());
}

#[test]
fn usage_errors_are_immediate() {
    let (backend, _handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);

    assert_eq!(renderer.close().unwrap_err().usage(), Some(UsageError::NotOpen));
    assert_eq!(renderer.leave_raw().unwrap_err().usage(), Some(UsageError::NotRaw));
    assert_eq!(renderer.next_message().unwrap_err().usage(), Some(UsageError::NotOpen));

    renderer.open().unwrap();
    assert_eq!(renderer.open().unwrap_err().usage(), Some(UsageError::AlreadyOpen));
    renderer.enter_raw().unwrap();
    assert_eq!(renderer.enter_raw().unwrap_err().usage(), Some(UsageError::AlreadyRaw));
    assert_eq!(renderer.close().unwrap_err().usage(), Some(UsageError::RawModeActive));
}

#[test]
fn restore_failure_retried_on_drop() {
    let (backend, handle) = MemoryBackend::new();
    let mut renderer = Renderer::new(backend);
    renderer.open().unwrap();
    renderer.enter_raw().unwrap();

    handle.fail_next(Fault::SetDiscipline, io::ErrorKind::Other);
    let err = renderer.leave_raw().unwrap_err();
    assert!(matches!(err, Error::ModeTransition { op: ModeOp::Restore, .. }));
    assert!(handle.discipline().is_raw());

    drop(renderer);
    assert_eq!(handle.discipline(), LineDiscipline::COOKED);
}

#[test]
fn factory_builds_memory_renderer() {
    let mut renderer = Renderer::from_kind(BackendKind::Memory, RendererConfig::default());
    let mut session = renderer.session().unwrap();
    let mut raw = session.into_raw_mode().unwrap();
    raw.render("hi").unwrap();
    assert_eq!(raw.next_message().unwrap(), None);
    assert_eq!(raw.last_frame(), Some("hi"));
}

#[derive(Debug, Clone)]
enum Op {
    Render(String),
    Poll,
    FailWrite,
    FailPoll,
    LeaveRaw,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z\n]{0,8}".prop_map(Op::Render),
        Just(Op::Poll),
        Just(Op::FailWrite),
        Just(Op::FailPoll),
        Just(Op::LeaveRaw),
    ]
}

fn discipline() -> impl Strategy<Value = LineDiscipline> {
    (0u8..64).prop_map(LineDiscipline::from_bits_truncate)
}

proptest! {
    #[test]
    fn raw_scope_exit_restores_captured_settings(
        original in discipline(),
        ops in prop::collection::vec(op(), 0..12),
    ) {
        let (backend, handle) = MemoryBackend::with_discipline(original);
        let mut renderer = Renderer::new(backend);
        let mut session = renderer.session().unwrap();
        {
            let mut raw = session.into_raw_mode().unwrap();
            for op in ops {
                let _ = match op {
                    Op::Render(frame) => raw.render(&frame),
                    Op::Poll => raw.next_message().map(|_| ()),
                    Op::FailWrite => {
                        handle.fail_next(Fault::Write, io::ErrorKind::BrokenPipe);
                        Ok(())
                    }
                    Op::FailPoll => {
                        handle.fail_next(Fault::Poll, io::ErrorKind::Other);
                        Ok(())
                    }
                    Op::LeaveRaw => raw.leave_raw().and_then(|_| raw.enter_raw()),
                };
            }
        }
        prop_assert_eq!(handle.discipline(), original);
        prop_assert!(!session.is_raw());
    }
}
