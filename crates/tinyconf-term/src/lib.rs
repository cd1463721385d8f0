// SPDX-License-Identifier: MIT
//
// tinyconf-term: terminal layer for tinyconf.
//
// Direct terminal control through ANSI escape sequences and raw termios.
// Frames are painted into a FrameBuffer, diffed against the previous one,
// and only changed cells reach the terminal. Input bytes come from a
// background reader thread and are decoded into key, mouse and resize
// events. The `driver` module puts both halves behind one trait.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod diff;
pub mod driver;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
