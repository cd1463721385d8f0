// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, signals, RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty,
// sigaction and raw fd writes are only reachable through libc. Each unsafe
// block is a single call.
#![allow(unsafe_code)]
//
// Entering TUI mode turns off line discipline, echo, signal keys and
// software flow control (so Ctrl-S and Ctrl-Q reach the editor), switches
// to the alternate screen and enables SGR click reporting. Dropping the
// handle undoes all of it.
//
// The panic hook writes a prebuilt restore sequence straight to fd 1 and
// skips Rust's stdout lock, which may be held by the frame flush that
// panicked.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi::{self, DecMode};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Fallback when the real size cannot be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or reports a zero size.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Signals ────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);
static TERMINATED: AtomicBool = AtomicBool::new(false);
static SIGNALS_INSTALLED: Once = Once::new();

/// Install handlers for SIGWINCH (resize) and SIGTERM/SIGHUP (shutdown).
///
/// The handlers only set atomic flags; poll them with [`take_resize`] and
/// [`termination_requested`].
pub fn install_signal_handlers() {
    SIGNALS_INSTALLED.call_once(|| {
        #[cfg(unix)]
        {
            install_handler(libc::SIGWINCH, on_sigwinch);
            install_handler(libc::SIGTERM, on_terminate);
            install_handler(libc::SIGHUP, on_terminate);
        }
    });
}

#[cfg(unix)]
fn install_handler(signal: libc::c_int, handler: extern "C" fn(libc::c_int)) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(signal, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn on_terminate(_sig: libc::c_int) {
    TERMINATED.store(true, Ordering::Relaxed);
}

/// Returns `true` once per resize signal.
pub fn take_resize() -> bool {
    RESIZED.swap(false, Ordering::Relaxed)
}

/// Whether SIGTERM or SIGHUP has been received.
pub fn termination_requested() -> bool {
    TERMINATED.load(Ordering::Relaxed)
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Original termios for the panic hook, which cannot reach the
/// [`Terminal`] that saved it.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    let saved = TERMIOS_BACKUP.lock().ok().and_then(|backup| *backup);
    if let Some(saved) = saved {
        unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const saved) };
    }
}

/// End synchronized output, disable mouse reporting, reset SGR, show the
/// cursor, leave the alternate screen. The screen switch goes last.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?1006l\x1b[?1000l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle. [`enter`](Self::enter) switches to TUI mode; drop
/// restores the terminal.
///
/// ```no_run
/// use tinyconf_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... draw frames ...
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// Create a handle with the current size (80x24 if unknown). Does not
    /// touch terminal modes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    /// Cached size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size from the OS and cache it.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    /// Whether TUI mode is active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode and the alternate screen, and enable click
    /// reporting. No-op if already active.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::set_mode(&mut lock, DecMode::AltScreen, true)?;
        ansi::set_mode(&mut lock, DecMode::CursorVisible, false)?;
        ansi::clear_screen(&mut lock)?;
        ansi::set_mode(&mut lock, DecMode::MouseClicks, true)?;
        ansi::set_mode(&mut lock, DecMode::MouseSgr, true)?;
        lock.flush()?;

        self.active = true;
        tracing::debug!(target: "term", cols = self.size.cols, rows = self.size.rows, "entered tui mode");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). No-op if inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::set_mode(&mut lock, DecMode::SyncOutput, false)?;
        ansi::set_mode(&mut lock, DecMode::MouseSgr, false)?;
        ansi::set_mode(&mut lock, DecMode::MouseClicks, false)?;
        ansi::reset(&mut lock)?;
        ansi::set_mode(&mut lock, DecMode::CursorVisible, true)?;
        ansi::set_mode(&mut lock, DecMode::AltScreen, false)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!(target: "term", "left tui mode");
        Ok(())
    }

    // ── termios ───────────────────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let saved = read_termios()?;
        self.original_termios = Some(saved);
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = Some(saved);
        }

        let mut raw = saved;
        // cfmakeraw leaves IXOFF and IXANY alone; clear them too so no
        // byte is ever swallowed as flow control.
        unsafe { libc::cfmakeraw(&raw mut raw) };
        raw.c_iflag &= !(libc::IXOFF | libc::IXANY);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        write_termios(&raw)
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        let Some(saved) = self.original_termios.take() else {
            return Ok(());
        };
        if let Ok(mut backup) = TERMIOS_BACKUP.lock() {
            *backup = None;
        }
        write_termios(&saved)
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn read_termios() -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

/// Apply `termios` to stdin after pending output drains, discarding
/// unread input.
#[cfg(unix)]
fn write_termios(termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.leave() {
                tracing::warn!(target: "term", %err, "failed to restore terminal");
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
