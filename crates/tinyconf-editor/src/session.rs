//! The render/input loop.
//!
//! One cycle is: size the frame to the display, draw, present, count the
//! status message down, then block for one event. The loop ends when the
//! editor says stop or input runs out.

use std::io;

use tinyconf_term::buffer::FrameBuffer;
use tinyconf_term::driver::Display;

use crate::editor::{Editor, Flow};
use crate::render::Palette;
use crate::storage::Storage;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// A quit command finished.
    Quit,
    /// The display ran out of input (stdin closed or a termination signal).
    InputClosed,
}

/// An editor bound to a palette and its own frame.
#[derive(Debug)]
pub struct Session<S> {
    editor: Editor<S>,
    palette: Palette,
    frame: FrameBuffer,
}

impl<S: Storage> Session<S> {
    #[must_use]
    pub fn new(editor: Editor<S>, palette: Palette) -> Self {
        Self {
            editor,
            palette,
            frame: FrameBuffer::new(0, 0),
        }
    }

    #[must_use]
    pub const fn editor(&self) -> &Editor<S> {
        &self.editor
    }

    /// Drive the editor until it stops or `display` runs out of input.
    ///
    /// Unless the session ended with a quit command, unsaved work with a
    /// target path is written once more on the way out, even when the
    /// display failed.
    ///
    /// # Errors
    ///
    /// Returns the display's error if presenting or reading input fails.
    pub fn run(&mut self, display: &mut dyn Display) -> io::Result<Exit> {
        let result = self.cycle(display);
        if !matches!(result, Ok(Exit::Quit)) {
            if let Some(outcome) = self.editor.save_on_exit() {
                tracing::info!(target: "editor", ?outcome, "saved on exit");
            }
        }
        result
    }

    fn cycle(&mut self, display: &mut dyn Display) -> io::Result<Exit> {
        loop {
            let size = display.size();
            if (self.frame.width(), self.frame.height()) != (size.cols, size.rows) {
                self.frame.resize(size.cols, size.rows);
            }

            let cursor = self.editor.draw(&mut self.frame, &self.palette);
            display.present(&self.frame, cursor)?;
            self.editor.tick();

            let Some(event) = display.next_event()? else {
                return Ok(Exit::InputClosed);
            };
            if self.editor.handle_event(&event) == Flow::Stop {
                return Ok(Exit::Quit);
            }
        }
    }
}
