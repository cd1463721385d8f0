// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A dedicated thread reads stdin and sends raw byte chunks through a
// channel. The driver blocks on that channel with a timeout, which is how
// a lone ESC gets resolved and how resize signals get noticed without
// waiting for the next keypress.
//
// The thread polls stdin with a short timeout and checks a stop flag
// between polls, so shutdown never leaves it stuck inside read().

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Size of one read. A keypress is a few bytes; a fast typist or a
/// terminal paste fits easily.
const READ_BUF_SIZE: usize = 4096;

/// How often the thread wakes to check the stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// Background stdin reader thread.
///
/// The channel closes when the reader is stopped, stdin reaches EOF, or
/// the receiving side is dropped.
///
/// ```no_run
/// use tinyconf_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// while let Ok(bytes) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn a thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || reader_loop(&tx, &stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(target: "term", "stdin reader thread panicked");
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        if !stdin_readable(POLL_TIMEOUT_MS) {
            continue;
        }
        let Some(n) = read_stdin(&mut buf) else {
            tracing::debug!(target: "term", "stdin closed");
            break;
        };
        if tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

/// Wait up to `timeout_ms` for stdin to have bytes (or hit EOF).
#[cfg(unix)]
fn stdin_readable(timeout_ms: i32) -> bool {
    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) > 0 }
}

/// One `read(2)` from stdin. `None` on EOF or error.
#[cfg(unix)]
fn read_stdin(buf: &mut [u8]) -> Option<usize> {
    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(n).ok().filter(|&n| n > 0)
}

/// Blocking fallback without poll(); the thread can only notice the stop
/// flag between reads.
#[cfg(not(unix))]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
