//! In-memory device
//!
//! Stands in for a terminal in tests: output is captured as a string, input
//! is a queue the test fills, and any device operation can be made to fail
//! once. [`MemoryHandle`] stays usable after the backend has been dropped,
//! so teardown effects can be inspected.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Backend, InputPolicy, LineDiscipline};
use crate::config::ScreenConfig;
use crate::message::Message;

/// Device operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    ReadDiscipline,
    SetDiscipline,
    Write,
    Flush,
    Poll,
    Open,
    Close,
}

#[derive(Debug)]
struct Device {
    discipline: LineDiscipline,
    /// Every settings value applied, in order
    applied: Vec<LineDiscipline>,
    output: String,
    input: VecDeque<Message>,
    size: (u16, u16),
    open: bool,
    closes: usize,
    faults: Vec<(Fault, io::ErrorKind)>,
}

impl Device {
    fn check(&mut self, fault: Fault) -> io::Result<()> {
        match self.faults.iter().position(|(f, _)| *f == fault) {
            Some(idx) => {
                let (_, kind) = self.faults.remove(idx);
                Err(io::Error::new(kind, format!("injected {:?} fault", fault)))
            }
            None => Ok(()),
        }
    }
}

fn lock(device: &Mutex<Device>) -> MutexGuard<'_, Device> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend half of an in-memory device
pub struct MemoryBackend {
    device: Arc<Mutex<Device>>,
}

/// Test-side view of an in-memory device
#[derive(Clone)]
pub struct MemoryHandle {
    device: Arc<Mutex<Device>>,
}

impl MemoryBackend {
    /// New 80x24 cooked device
    pub fn new() -> (Self, MemoryHandle) {
        Self::with_discipline(LineDiscipline::COOKED)
    }

    /// New device starting with the given settings
    pub fn with_discipline(discipline: LineDiscipline) -> (Self, MemoryHandle) {
        let device = Arc::new(Mutex::new(Device {
            discipline,
            applied: Vec::new(),
            output: String::new(),
            input: VecDeque::new(),
            size: (80, 24),
            open: false,
            closes: 0,
            faults: Vec::new(),
        }));
        (
            Self {
                device: Arc::clone(&device),
            },
            MemoryHandle { device },
        )
    }
}

impl Backend for MemoryBackend {
    fn line_discipline(&mut self) -> io::Result<LineDiscipline> {
        let mut device = lock(&self.device);
        device.check(Fault::ReadDiscipline)?;
        Ok(device.discipline)
    }

    fn set_line_discipline(&mut self, settings: LineDiscipline) -> io::Result<()> {
        let mut device = lock(&self.device);
        device.check(Fault::SetDiscipline)?;
        device.discipline = settings;
        device.applied.push(settings);
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut device = lock(&self.device);
        device.check(Fault::Write)?;
        device.output.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        lock(&self.device).check(Fault::Flush)
    }

    fn poll_message(&mut self) -> io::Result<Option<Message>> {
        let mut device = lock(&self.device);
        device.check(Fault::Poll)?;
        Ok(device.input.pop_front())
    }

    fn input_policy(&self) -> InputPolicy {
        InputPolicy::NonBlocking
    }

    fn open(&mut self, _screen: &ScreenConfig) -> io::Result<()> {
        let mut device = lock(&self.device);
        device.check(Fault::Open)?;
        device.open = true;
        Ok(())
    }

    fn close(&mut self, _screen: &ScreenConfig) -> io::Result<()> {
        let mut device = lock(&self.device);
        device.check(Fault::Close)?;
        device.open = false;
        device.closes += 1;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(lock(&self.device).size)
    }
}

impl MemoryHandle {
    /// Queue an input event
    pub fn push_message(&self, message: Message) {
        lock(&self.device).input.push_back(message);
    }

    pub fn pending_messages(&self) -> usize {
        lock(&self.device).input.len()
    }

    /// Everything written so far
    pub fn output(&self) -> String {
        lock(&self.device).output.clone()
    }

    /// Drain the captured output
    pub fn take_output(&self) -> String {
        std::mem::take(&mut lock(&self.device).output)
    }

    /// Current device settings
    pub fn discipline(&self) -> LineDiscipline {
        lock(&self.device).discipline
    }

    /// Settings applied through the backend, in order
    pub fn applied(&self) -> Vec<LineDiscipline> {
        lock(&self.device).applied.clone()
    }

    pub fn is_open(&self) -> bool {
        lock(&self.device).open
    }

    /// Number of completed closes
    pub fn closes(&self) -> usize {
        lock(&self.device).closes
    }

    pub fn set_size(&self, cols: u16, rows: u16) {
        lock(&self.device).size = (cols, rows);
    }

    /// Make the next `fault` operation fail with `kind`
    pub fn fail_next(&self, fault: Fault, kind: io::ErrorKind) {
        lock(&self.device).faults.push((fault, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{KeyCode, KeyEvent};

    #[test]
    fn test_output_capture() {
        let (mut backend, handle) = MemoryBackend::new();
        backend.write("abc").unwrap();
        backend.write("def").unwrap();
        assert_eq!(handle.take_output(), "abcdef");
        assert_eq!(handle.output(), "");
    }

    #[test]
    fn test_fault_fires_once() {
        let (mut backend, handle) = MemoryBackend::new();
        handle.fail_next(Fault::Write, io::ErrorKind::BrokenPipe);

        let err = backend.write("lost").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        backend.write("kept").unwrap();
        assert_eq!(handle.output(), "kept");
    }

    #[test]
    fn test_messages_fifo() {
        let (mut backend, handle) = MemoryBackend::new();
        let a = Message::Key(KeyEvent::plain(KeyCode::Char('a')));
        let b = Message::Resize { cols: 10, rows: 5 };
        handle.push_message(a.clone());
        handle.push_message(b.clone());

        assert_eq!(backend.poll_message().unwrap(), Some(a));
        assert_eq!(backend.poll_message().unwrap(), Some(b));
        assert_eq!(backend.poll_message().unwrap(), None);
    }

    #[test]
    fn test_failed_poll_consumes_nothing() {
        let (mut backend, handle) = MemoryBackend::new();
        handle.push_message(Message::FocusGained);
        handle.fail_next(Fault::Poll, io::ErrorKind::Interrupted);

        assert!(backend.poll_message().is_err());
        assert_eq!(handle.pending_messages(), 1);
        assert_eq!(backend.poll_message().unwrap(), Some(Message::FocusGained));
    }

    #[test]
    fn test_handle_outlives_backend() {
        let (mut backend, handle) = MemoryBackend::new();
        backend.set_line_discipline(LineDiscipline::empty()).unwrap();
        drop(backend);
        assert_eq!(handle.discipline(), LineDiscipline::empty());
        assert_eq!(handle.applied(), vec![LineDiscipline::empty()]);
    }
}
