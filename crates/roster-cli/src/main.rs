//! `roster`: terminal panel for the roster student-records service.
//!
//! # Usage
//!
//! ```text
//! roster --url http://localhost:8080
//! roster --config ~/.config/roster/config.toml --export-dir ~/exports
//! ```

mod app;
mod client;
mod editor;
mod ui;

use std::{
  io::{self, Stdout},
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;

const DEFAULT_URL: &str = "http://localhost:8080";

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Terminal panel for roster student records")]
struct Args {
  /// TOML file with `url` and `export_dir`.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the roster server.
  #[arg(long, env = "ROSTER_URL")]
  url: Option<String>,

  /// Where masterlist exports are written.
  #[arg(long, env = "ROSTER_EXPORT_DIR")]
  export_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
  url:        Option<String>,
  export_dir: Option<PathBuf>,
}

impl ConfigFile {
  fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
  }
}

/// Effective settings: flags and env, then the config file, then defaults.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
  base_url:   String,
  export_dir: PathBuf,
}

impl Settings {
  fn resolve(args: Args, file: ConfigFile) -> Self {
    let base_url = args
      .url
      .or(file.url)
      .map(|u| u.trim().trim_end_matches('/').to_owned())
      .filter(|u| !u.is_empty())
      .unwrap_or_else(|| DEFAULT_URL.to_owned());
    let export_dir = args
      .export_dir
      .or(file.export_dir)
      .unwrap_or_else(|| PathBuf::from("."));
    Self {
      base_url,
      export_dir,
    }
  }
}

/// Raw mode and the alternate screen, undone on drop.
struct Screen {
  terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
  fn enter() -> Result<Self> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;
    Ok(Self { terminal })
  }
}

impl Drop for Screen {
  fn drop(&mut self) {
    disable_raw_mode().ok();
    execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
    self.terminal.show_cursor().ok();
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let mut args = Args::parse();
  let file = match args.config.take() {
    Some(path) => ConfigFile::load(&path)?,
    None => ConfigFile::default(),
  };
  let settings = Settings::resolve(args, file);

  let client = ApiClient::new(ApiConfig {
    base_url: settings.base_url,
  })?;
  let mut app = App::new(client, settings.export_dir);

  let mut screen = Screen::enter()?;
  app.load().await?;
  run(&mut screen.terminal, &mut app).await
}

async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll off the async workers so pending requests keep moving.
    let polled = tokio::task::block_in_place(|| -> io::Result<Option<Event>> {
      if event::poll(Duration::from_millis(50))? {
        event::read().map(Some)
      } else {
        Ok(None)
      }
    })?;

    let Some(Event::Key(key)) = polled else {
      continue;
    };
    if key.kind == KeyEventKind::Press && !app.handle_key(key).await? {
      return Ok(());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(url: Option<&str>, export_dir: Option<&str>) -> Args {
    Args {
      config:     None,
      url:        url.map(str::to_owned),
      export_dir: export_dir.map(PathBuf::from),
    }
  }

  #[test]
  fn defaults_apply_without_flags_or_file() {
    let s = Settings::resolve(args(None, None), ConfigFile::default());
    assert_eq!(s.base_url, DEFAULT_URL);
    assert_eq!(s.export_dir, PathBuf::from("."));
  }

  #[test]
  fn flags_override_file() {
    let file: ConfigFile =
      toml::from_str("url = \"http://records.local:9000/\"\nexport_dir = \"/srv/exports\"")
        .unwrap();
    let s = Settings::resolve(args(Some("http://127.0.0.1:8080"), None), file);
    assert_eq!(s.base_url, "http://127.0.0.1:8080");
    assert_eq!(s.export_dir, PathBuf::from("/srv/exports"));
  }

  #[test]
  fn file_url_is_trimmed_of_trailing_slash() {
    let file = ConfigFile {
      url:        Some("http://records.local:9000/".into()),
      export_dir: None,
    };
    assert_eq!(
      Settings::resolve(args(None, None), file).base_url,
      "http://records.local:9000"
    );
  }
}
