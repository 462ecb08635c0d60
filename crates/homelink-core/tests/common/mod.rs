//! Scripted in-memory board for driving a session without hardware.
//!
//! The mock answers like the firmware does: a GET byte arms the next
//! scripted reply (optionally after a delay), SET bytes produce nothing.
//! Every byte crossing the fake wire is recorded for assertions.

// Each test binary uses its own subset of this helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use homelink_core::protocol::Channel;

/// One observed wire event, in order of occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    /// Host wrote this byte
    Write(u8),
    /// Host read this reply byte
    Read(u8),
}

#[derive(Default)]
struct BoardState {
    replies: VecDeque<u8>,
    armed: VecDeque<(Instant, u8)>,
    events: Vec<(Instant, WireEvent)>,
}

/// Test-side handle to the fake board
#[derive(Clone)]
pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
    reply_delay: Duration,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::with_reply_delay(Duration::ZERO)
    }

    /// A board that takes `delay` to produce each reply byte
    pub fn with_reply_delay(delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::default())),
            reply_delay: delay,
        }
    }

    /// Queue reply bytes, consumed one per GET command in order
    pub fn script(&self, replies: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.replies.extend(replies.iter().copied());
    }

    /// Channel end to hand to `Session::attach`
    pub fn channel(&self) -> Box<dyn Channel> {
        Box::new(MockChannel {
            state: Arc::clone(&self.state),
            reply_delay: self.reply_delay,
        })
    }

    pub fn events(&self) -> Vec<WireEvent> {
        let state = self.state.lock().unwrap();
        state.events.iter().map(|&(_, e)| e).collect()
    }

    pub fn timed_events(&self) -> Vec<(Instant, WireEvent)> {
        self.state.lock().unwrap().events.clone()
    }

    /// Only the bytes the host wrote, in order
    pub fn written_bytes(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WireEvent::Write(b) => Some(b),
                WireEvent::Read(_) => None,
            })
            .collect()
    }
}

struct MockChannel {
    state: Arc<Mutex<BoardState>>,
    reply_delay: Duration,
}

impl Read for MockChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        if let Some(&(ready_at, byte)) = state.armed.front() {
            if ready_at <= now && !buf.is_empty() {
                state.armed.pop_front();
                state.events.push((now, WireEvent::Read(byte)));
                buf[0] = byte;
                return Ok(1);
            }
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "no data"))
    }
}

impl Write for MockChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let now = Instant::now();
        for &byte in buf {
            state.events.push((now, WireEvent::Write(byte)));
            // A GET command (top bits 00) elicits the next scripted reply;
            // SET bytes elicit nothing.
            if byte & 0xC0 == 0x00 {
                if let Some(reply) = state.replies.pop_front() {
                    state.armed.push_back((now + self.reply_delay, reply));
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Channel for MockChannel {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().armed.clear();
        Ok(())
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        let state = self.state.lock().unwrap();
        let now = Instant::now();
        Ok(state.armed.iter().filter(|&&(at, _)| at <= now).count() as u32)
    }
}
