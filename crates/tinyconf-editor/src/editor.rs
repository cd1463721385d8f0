//! The editor: one document, one cursor, and the mode machine that routes
//! input between them.
//!
//! [`Editor::handle_event`] is the only entry point for input. It looks at
//! the current [`Mode`] and hands the event to one handler per mode. Every
//! handler returns a [`Flow`] telling the session whether to keep going.
//!
//! ```text
//!            '/'                      Enter: q/quit, dirty
//!  Normal ─────────▶ CommandEntry ───────────────────────▶ ConfirmSave
//!    ▲                  │ Esc / Enter                        │ y: save, stop
//!    └──────────────────┘                                    │ n: stop
//!    ▲                                                       │ Esc: "Canceled."
//!    └───────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use tinyconf_term::buffer::FrameBuffer;
use tinyconf_term::input::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::buffer::LineBuffer;
use crate::command::{Command, CommandLine};
use crate::mode::Mode;
use crate::render::{self, Palette, gutter_width, visible_height};
use crate::status::{EPHEMERAL_CYCLES, StatusChannel};
use crate::storage::Storage;
use crate::viewport::CursorViewport;

/// Whether the session should keep running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How a save attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; the buffer is clean.
    Saved,
    /// No target path, nothing written.
    NoPath,
    /// The write failed; the buffer stays dirty.
    Failed,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// All editing state for one document.
#[derive(Debug)]
pub struct Editor<S> {
    buffer: LineBuffer,
    viewport: CursorViewport,
    mode: Mode,
    status: StatusChannel,
    path: Option<PathBuf>,
    storage: S,
    /// Text rows in the last drawn frame; clicks are mapped against it.
    visible: usize,
}

impl<S: Storage> Editor<S> {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed document.
    pub fn new(storage: S) -> Self {
        Self::with_buffer(storage, LineBuffer::new(), None)
    }

    /// Load `path` through `storage`.
    ///
    /// A missing file opens as an empty document that will be created on
    /// save. If loading fails the editor starts empty, reports the failure
    /// on the status line and forgets the path, so the unreadable file is
    /// never overwritten.
    pub fn open(storage: S, path: PathBuf) -> Self {
        match storage.load(&path) {
            Ok(lines) => {
                tracing::info!(target: "editor", path = %path.display(), lines = lines.len(), "opened");
                let buffer = LineBuffer::from_lines(&lines);
                Self::with_buffer(storage, buffer, Some(path))
            }
            Err(err) => {
                tracing::warn!(target: "editor", %err, "open failed");
                let mut editor = Self::with_buffer(storage, LineBuffer::new(), None);
                editor.status.set_ephemeral(
                    format!("Could not open {}: {}", path.display(), err.reason()),
                    EPHEMERAL_CYCLES,
                );
                editor
            }
        }
    }

    fn with_buffer(storage: S, buffer: LineBuffer, path: Option<PathBuf>) -> Self {
        Self {
            buffer,
            viewport: CursorViewport::new(),
            mode: Mode::Normal,
            status: StatusChannel::new(),
            path,
            storage,
            visible: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn viewport(&self) -> &CursorViewport {
        &self.viewport
    }

    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub const fn status(&self) -> &StatusChannel {
        &self.status
    }

    /// Where saves go, if anywhere.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // -- Frame --------------------------------------------------------------

    /// Reconcile the viewport to `frame` and paint it. Returns the cursor
    /// cell for the display.
    pub fn draw(&mut self, frame: &mut FrameBuffer, palette: &Palette) -> Option<(u16, u16)> {
        self.visible = visible_height(frame.height());
        self.viewport.reconcile(&self.buffer, self.visible);
        render::render(
            frame,
            &self.buffer,
            &self.viewport,
            &self.mode,
            &self.status,
            palette,
        )
    }

    /// Advance the status countdown by one render cycle.
    pub fn tick(&mut self) {
        self.status.tick();
    }

    // -- Input --------------------------------------------------------------

    /// Route one input event through the current mode.
    pub fn handle_event(&mut self, event: &Event) -> Flow {
        match event {
            Event::Key(key) => match self.mode {
                Mode::Normal => self.handle_normal(key),
                Mode::CommandEntry(_) => self.handle_command_entry(key),
                Mode::ConfirmSave => self.handle_confirm_save(key),
            },
            Event::Mouse(mouse) => {
                if self.mode.is_normal() {
                    self.handle_mouse(mouse);
                }
                Flow::Continue
            }
            // The next draw picks up the new size.
            Event::Resize(_) => Flow::Continue,
        }
    }

    fn handle_normal(&mut self, key: &KeyEvent) -> Flow {
        let pos = self.viewport.cursor();
        let plain = key.modifiers.is_empty();

        match key.code {
            KeyCode::Char('/') if key.printable().is_some() => {
                self.mode = Mode::CommandEntry(CommandLine::new());
            }
            KeyCode::Char(_) => {
                if let Some(ch) = key.printable() {
                    let next = self.buffer.insert_char(pos, ch);
                    self.viewport.set_cursor(next);
                }
            }
            KeyCode::Tab if plain => {
                let next = self.buffer.insert_char(pos, '\t');
                self.viewport.set_cursor(next);
            }
            KeyCode::Backspace => {
                let next = self.buffer.delete_backward(pos);
                self.viewport.set_cursor(next);
            }
            KeyCode::Enter => {
                let next = self.buffer.split_line(pos);
                self.viewport.set_cursor(next);
            }
            KeyCode::Up => self.viewport.move_up(&self.buffer),
            KeyCode::Down => self.viewport.move_down(&self.buffer),
            KeyCode::Left => self.viewport.move_left(&self.buffer),
            KeyCode::Right => self.viewport.move_right(&self.buffer),
            KeyCode::Home => self.viewport.move_line_start(&self.buffer),
            KeyCode::End => self.viewport.move_line_end(&self.buffer),
            KeyCode::PageUp => self.viewport.page_up(&self.buffer),
            KeyCode::PageDown => self.viewport.page_down(&self.buffer),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_command_entry(&mut self, key: &KeyEvent) -> Flow {
        let Mode::CommandEntry(line) = &mut self.mode else {
            return Flow::Continue;
        };

        match key.code {
            KeyCode::Escape => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let command = line.parse();
                self.mode = Mode::Normal;
                return self.evaluate(command);
            }
            KeyCode::Backspace => {
                line.backspace();
            }
            _ => {
                if let Some(ch) = key.printable() {
                    line.push(ch);
                }
            }
        }
        Flow::Continue
    }

    fn handle_confirm_save(&mut self, key: &KeyEvent) -> Flow {
        match key.printable() {
            Some('y' | 'Y') => {
                self.mode = Mode::Normal;
                match self.save() {
                    SaveOutcome::Saved | SaveOutcome::NoPath => Flow::Stop,
                    SaveOutcome::Failed => Flow::Continue,
                }
            }
            Some('n' | 'N') => {
                tracing::info!(target: "editor", "quit without saving");
                Flow::Stop
            }
            _ if key.code == KeyCode::Escape => {
                self.mode = Mode::Normal;
                self.status.set_ephemeral("Canceled.", EPHEMERAL_CYCLES);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if mouse.kind == MouseEventKind::Press(MouseButton::Left) {
            self.viewport.click(
                &self.buffer,
                usize::from(mouse.y),
                usize::from(mouse.x),
                gutter_width(self.buffer.line_count()),
                self.visible,
            );
        }
    }

    fn evaluate(&mut self, command: Command) -> Flow {
        tracing::debug!(target: "editor", ?command, "command");
        match command {
            Command::InsertPrefix => {
                let next = self.buffer.insert_char(self.viewport.cursor(), '/');
                self.viewport.set_cursor(next);
            }
            Command::Quit => {
                if !self.buffer.is_modified() {
                    return Flow::Stop;
                }
                self.mode = Mode::ConfirmSave;
            }
            Command::Save => {
                self.save();
            }
            Command::SaveAs(path) => {
                self.path = Some(path);
                self.save();
            }
            Command::Unknown(_) => {}
        }
        Flow::Continue
    }

    // -- Persistence --------------------------------------------------------

    /// Write the buffer to the target path and report the result on the
    /// status line.
    pub fn save(&mut self) -> SaveOutcome {
        let Some(path) = self.path.as_deref() else {
            tracing::info!(target: "editor", "save skipped: no file name");
            return SaveOutcome::NoPath;
        };

        match self.storage.save(path, &self.buffer.lines()) {
            Ok(()) => {
                self.buffer.mark_saved();
                self.status.set_ephemeral("File saved.", EPHEMERAL_CYCLES);
                tracing::info!(target: "editor", path = %path.display(), "saved");
                SaveOutcome::Saved
            }
            Err(err) => {
                tracing::warn!(target: "editor", %err, "save failed");
                self.status
                    .set_ephemeral(format!("Save failed: {}", err.reason()), EPHEMERAL_CYCLES);
                SaveOutcome::Failed
            }
        }
    }

    /// Save unsaved work when the session ends without a quit command.
    pub fn save_on_exit(&mut self) -> Option<SaveOutcome> {
        (self.buffer.is_modified() && self.path.is_some()).then(|| self.save())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
