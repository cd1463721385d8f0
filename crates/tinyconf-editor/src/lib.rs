//! tinyconf-editor: the editing core of tinyconf.
//!
//! A [`LineBuffer`](buffer::LineBuffer) holds the document. A
//! [`CursorViewport`](viewport::CursorViewport) tracks the cursor and the
//! first visible line. [`Editor`](editor::Editor) routes input through the
//! three modes and talks to a [`Storage`](storage::Storage) for loading and
//! saving. [`Session`](session::Session) runs the render/input loop against
//! any [`Display`](tinyconf_term::driver::Display).
//!
//! Nothing here touches the terminal directly, so the whole editor runs
//! under tests with a scripted display and in-memory storage.

pub mod buffer;
pub mod command;
pub mod editor;
pub mod error;
pub mod mode;
pub mod position;
pub mod render;
pub mod session;
pub mod status;
pub mod storage;
pub mod viewport;

pub use error::{Error, Result};
