// SPDX-License-Identifier: MIT
//
// Display driver: the seam between an application and the terminal.
//
// An application sees three things: the grid size, a blocking stream of
// input events, and a way to present a finished frame. `TerminalDisplay`
// wires those to the real terminal:
//
//   stdin thread ─bytes─▶ channel ─▶ Parser ─▶ pending events ─▶ next_event
//   FrameBuffer ─▶ DiffRenderer ─▶ one write() ─▶ stdout
//
// `next_event` blocks on the channel with a short timeout. The timeout is
// only there to resolve a lone ESC and to notice signals; it is not a tick.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{self, Size, Terminal};

/// How long a lone ESC waits for the rest of a sequence.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

// ─── Display ────────────────────────────────────────────────────────────────

/// A character-grid output surface with a blocking input stream.
pub trait Display {
    /// Current grid size.
    fn size(&self) -> Size;

    /// Block until the next input event. `Ok(None)` means input is over
    /// (stdin closed or the process was asked to terminate).
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn next_event(&mut self) -> io::Result<Option<Event>>;

    /// Show `frame`, with the hardware cursor at `cursor` or hidden.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    fn present(&mut self, frame: &FrameBuffer, cursor: Option<(u16, u16)>) -> io::Result<()>;
}

// ─── InputQueue ─────────────────────────────────────────────────────────────

/// Something that interrupts the wait for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Stop reading; input is over.
    Terminate,
    /// The grid changed size.
    Resize(Size),
}

/// Decoded events from a channel of raw input chunks.
///
/// Chunks go through the [`Parser`]; a lone ESC is flushed as Escape once
/// no more bytes arrive within a short timeout. After the sender hangs
/// up, whatever was already decoded is still handed out before the queue
/// reports the end.
#[derive(Debug)]
pub struct InputQueue {
    parser: Parser,
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<Event>,
    closed: bool,
}

impl InputQueue {
    #[must_use]
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            parser: Parser::new(),
            rx,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    /// Block until the next event. `signal` is polled before every wait;
    /// `Terminate` ends input and `Resize` becomes [`Event::Resize`].
    /// Decoded events are delivered before signals are looked at.
    pub fn next(&mut self, mut signal: impl FnMut() -> Option<Signal>) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match signal() {
                Some(Signal::Terminate) => return None,
                Some(Signal::Resize(size)) => return Some(Event::Resize(size)),
                None => {}
            }
            if self.closed {
                return None;
            }

            match self.rx.recv_timeout(ESCAPE_TIMEOUT) {
                Ok(bytes) => self.pending.extend(self.parser.advance(&bytes)),
                Err(RecvTimeoutError::Timeout) => {
                    if self.parser.has_pending() {
                        self.pending.extend(self.parser.flush());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.pending.extend(self.parser.flush());
                    self.closed = true;
                }
            }
        }
    }
}

// ─── TerminalDisplay ────────────────────────────────────────────────────────

/// [`Display`] over the process's own terminal.
///
/// Opening it enters raw mode and the alternate screen; dropping it (or
/// [`close`](Self::close)) restores the terminal.
pub struct TerminalDisplay {
    terminal: Terminal,
    renderer: DiffRenderer,
    reader: StdinReader,
    input: InputQueue,
}

impl TerminalDisplay {
    /// Take over the terminal and start reading input.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be entered or the reader thread
    /// cannot be spawned.
    pub fn open() -> io::Result<Self> {
        let mut terminal = Terminal::new();
        terminal.enter()?;
        terminal::install_signal_handlers();
        let (reader, rx) = StdinReader::spawn()?;

        Ok(Self {
            terminal,
            renderer: DiffRenderer::new(),
            reader,
            input: InputQueue::new(rx),
        })
    }

    /// Stop the reader and restore the terminal, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal could not be restored.
    pub fn close(mut self) -> io::Result<()> {
        self.reader.stop();
        self.terminal.leave()
    }
}

impl Display for TerminalDisplay {
    fn size(&self) -> Size {
        self.terminal.size()
    }

    fn next_event(&mut self) -> io::Result<Option<Event>> {
        let term = &mut self.terminal;
        let renderer = &mut self.renderer;
        Ok(self.input.next(|| {
            if terminal::termination_requested() {
                tracing::info!(target: "term", "termination signal received");
                return Some(Signal::Terminate);
            }
            if terminal::take_resize() {
                let size = term.refresh_size();
                renderer.force_redraw();
                tracing::debug!(target: "term", cols = size.cols, rows = size.rows, "resize");
                return Some(Signal::Resize(size));
            }
            None
        }))
    }

    fn present(&mut self, frame: &FrameBuffer, cursor: Option<(u16, u16)>) -> io::Result<()> {
        let stats = self.renderer.render(frame, cursor);
        tracing::trace!(
            target: "term",
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "frame"
        );
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.renderer.flush_to(&mut lock)?;
        lock.flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
