// SPDX-License-Identifier: MIT
//
// tinyconf: a minimal full-screen line editor for config files.
//
// This binary parses the command line, sets up optional file logging, and
// wires the two crates together:
//
//   tinyconf-term   → raw mode, input decoding, diffed output (Display)
//   tinyconf-editor → buffer, viewport, modes, status line (Session)
//
//   FILE ─▶ FileStorage ─▶ Editor ─▶ Session::run(TerminalDisplay)
//
// The terminal owns stdout while the editor runs, so logs only ever go to
// the file named by --log-file.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tinyconf_editor::editor::Editor;
use tinyconf_editor::render::Palette;
use tinyconf_editor::session::Session;
use tinyconf_editor::storage::FileStorage;
use tinyconf_term::color::CellColor;
use tinyconf_term::driver::TerminalDisplay;

// ─── Command line ───────────────────────────────────────────────────────────

/// A minimal terminal line editor. Type /q to quit, /s to save.
#[derive(Debug, Parser)]
#[command(name = "tinyconf", about, disable_version_flag = true)]
struct Args {
    /// File to edit; created empty if it does not exist.
    file: Option<PathBuf>,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Text color as #rrggbb.
    #[arg(long, env = "TINYCONF_FG", value_name = "HEX")]
    fg: Option<CellColor>,

    /// Background color as #rrggbb.
    #[arg(long, env = "TINYCONF_BG", value_name = "HEX")]
    bg: Option<CellColor>,

    /// Status line background as #rrggbb.
    #[arg(long, env = "TINYCONF_STATUS_BG", value_name = "HEX")]
    status_bg: Option<CellColor>,

    /// Append logs to this file (filter with RUST_LOG, default "info").
    #[arg(long, env = "TINYCONF_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn palette(&self) -> Palette {
        let defaults = Palette::default();
        Palette {
            fg: self.fg.unwrap_or(defaults.fg),
            bg: self.bg.unwrap_or(defaults.bg),
            status: self.status_bg.unwrap_or(defaults.status),
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a non-blocking file subscriber. The returned guard flushes
/// pending lines when dropped, so it must outlive the session.
fn init_logging(path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install log subscriber")?;
    Ok(guard)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let _guard = args.log_file.as_deref().map(init_logging).transpose()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), file = ?args.file, "starting");

    let palette = args.palette();
    let editor = match args.file {
        Some(path) => {
            FileStorage::create_if_missing(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Editor::open(FileStorage, path)
        }
        None => Editor::new(FileStorage),
    };
    let mut session = Session::new(editor, palette);

    let mut display = TerminalDisplay::open().context("failed to initialize terminal")?;
    let result = session.run(&mut display);
    let restored = display.close();

    let exit = result.context("terminal I/O failed")?;
    restored.context("failed to restore terminal")?;
    tracing::info!(?exit, "session ended");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn short_v_is_version() {
        let args = Args::try_parse_from(["tinyconf", "-v"]).unwrap();
        assert!(args.version);
        assert!(args.file.is_none());
    }

    #[test]
    fn file_and_colors() {
        let args = Args::try_parse_from([
            "tinyconf",
            "--fg",
            "#102030",
            "--status-bg",
            "#ff0000",
            "app.conf",
        ])
        .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("app.conf")));

        let palette = args.palette();
        assert_eq!(palette.fg, CellColor::Rgb(0x10, 0x20, 0x30));
        assert_eq!(palette.bg, Palette::default().bg);
        assert_eq!(palette.status, CellColor::Rgb(0xff, 0x00, 0x00));
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(Args::try_parse_from(["tinyconf", "--bg", "blue"]).is_err());
    }

    #[test]
    fn no_arguments_uses_default_palette() {
        let args = Args::try_parse_from(["tinyconf"]).unwrap();
        assert!(!args.version);
        assert_eq!(args.palette(), Palette::default());
    }
}
