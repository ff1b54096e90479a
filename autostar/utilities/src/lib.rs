use autostar::{LinkError, Transport};
use mockall::mock;
use parking_lot::{Condvar, Mutex};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    thread,
    time::Duration,
};

mock! {
    pub Link {}
    impl Transport for Link {
        fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError>;
        fn read_byte(&mut self, timeout: Duration) -> Result<u8, LinkError>;
        fn discard_input(&mut self) -> Result<(), LinkError>;
    }
}

/// What the mount saw, in order
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Event {
    Write(Vec<u8>),
    Read(u8),
}

#[derive(Default)]
struct MountState {
    replies: HashMap<Vec<u8>, Vec<u8>>,
    ignore: usize,
    latency: Duration,
    pending: VecDeque<u8>,
    events: Vec<Event>,
}

#[derive(Default)]
struct Gate {
    closed: bool,
    waiting: usize,
}

/// Fake mount answering known frames with canned bytes.
///
/// Clones share state, so a test can keep one handle while a session owns another.
#[derive(Clone, Default)]
pub struct ScriptedMount {
    state: Arc<Mutex<MountState>>,
    gate: Arc<(Mutex<Gate>, Condvar)>,
}

/// Keeps writes to the mount blocked until dropped
pub struct Stall {
    gate: Arc<(Mutex<Gate>, Condvar)>,
}

impl Drop for Stall {
    fn drop(&mut self) {
        let (lock, cv) = &*self.gate;
        lock.lock().closed = false;
        cv.notify_all();
    }
}

impl ScriptedMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every `frame` with `reply`
    pub fn reply(self, frame: &[u8], reply: &[u8]) -> Self {
        self.state
            .lock()
            .replies
            .insert(frame.to_vec(), reply.to_vec());
        self
    }

    /// Drops the next `n` frames without answering
    pub fn ignore_next(self, n: usize) -> Self {
        self.state.lock().ignore = n;
        self
    }

    /// Time every byte takes to go out, widens race windows
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.lock().latency = latency;
        self
    }

    /// Blocks every following write until the returned handle is dropped
    pub fn stall(&self) -> Stall {
        self.gate.0.lock().closed = true;
        Stall {
            gate: self.gate.clone(),
        }
    }

    /// Returns once some writer is held by a stall
    pub fn wait_for_blocked_writer(&self) {
        let (lock, cv) = &*self.gate;
        let mut gate = lock.lock();
        while gate.waiting == 0 {
            cv.wait(&mut gate);
        }
    }

    fn pass_gate(&self) {
        let (lock, cv) = &*self.gate;
        let mut gate = lock.lock();
        if !gate.closed {
            return;
        }
        gate.waiting += 1;
        cv.notify_all();
        while gate.closed {
            cv.wait(&mut gate);
        }
        gate.waiting -= 1;
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(frame) => Some(frame),
                Event::Read(_) => None,
            })
            .collect()
    }

    pub fn bytes_read(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Read(_)))
            .count()
    }
}

impl Transport for ScriptedMount {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError> {
        self.pass_gate();
        let latency = self.state.lock().latency;
        if !latency.is_zero() {
            thread::sleep(latency * buf.len() as u32);
        }
        let mut state = self.state.lock();
        state.events.push(Event::Write(buf.to_vec()));
        if state.ignore > 0 {
            state.ignore -= 1;
        } else if let Some(reply) = state.replies.get(buf).cloned() {
            state.pending.extend(reply);
        }
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> Result<u8, LinkError> {
        let mut state = self.state.lock();
        let b = state.pending.pop_front().ok_or(LinkError::TimedOut)?;
        state.events.push(Event::Read(b));
        Ok(b)
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        self.state.lock().pending.clear();
        Ok(())
    }
}
