use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_THEME: &str = "default";

/// Every color the UI and the preview renderer draw with. Theme files only
/// need to name the colors they change; the rest come from `default`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    // Base colors; Color::Reset inherits terminal defaults
    pub bg: Color,
    pub fg: Color,
    pub border: Color,

    // UI elements
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub line_number: Color,
    pub selection: Color,
    pub active_tab: Color,
    pub inactive_tab: Color,
    pub dialog_bg: Color,

    // Markdown
    pub heading: Color,
    pub bold: Color,
    pub italic: Color,
    pub link: Color,
    pub code: Color,
    pub code_bg: Color,
    pub quote: Color,
    pub quote_border: Color,
    pub rule: Color,

    // Status indicators
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::Reset,
            border: Color::DarkGray,
            bar_bg: Color::Reset,
            bar_fg: Color::Reset,
            line_number: Color::DarkGray,
            selection: Color::Blue,
            active_tab: Color::Blue,
            inactive_tab: Color::Gray,
            dialog_bg: Color::Rgb(30, 32, 44),
            heading: Color::Rgb(130, 170, 255),
            bold: Color::Yellow,
            italic: Color::Cyan,
            link: Color::Cyan,
            code: Color::Red,
            code_bg: Color::Rgb(40, 42, 54),
            quote: Color::Green,
            quote_border: Color::Rgb(106, 190, 120),
            rule: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

impl Palette {
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 248),
            fg: Color::Rgb(40, 40, 40),
            border: Color::Gray,
            bar_bg: Color::Rgb(230, 230, 226),
            bar_fg: Color::Rgb(40, 40, 40),
            line_number: Color::Gray,
            selection: Color::Rgb(180, 210, 255),
            active_tab: Color::Rgb(30, 90, 200),
            inactive_tab: Color::DarkGray,
            dialog_bg: Color::Rgb(236, 236, 232),
            heading: Color::Rgb(30, 90, 200),
            bold: Color::Rgb(150, 90, 0),
            italic: Color::Rgb(0, 120, 140),
            link: Color::Rgb(0, 100, 200),
            code: Color::Rgb(180, 40, 40),
            code_bg: Color::Rgb(235, 235, 235),
            quote: Color::Rgb(40, 130, 60),
            quote_border: Color::Rgb(60, 160, 80),
            rule: Color::Gray,
            success: Color::Rgb(40, 130, 60),
            warning: Color::Rgb(180, 120, 0),
            error: Color::Rgb(190, 30, 30),
        }
    }

    // Pre-built styles

    pub fn editor_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn bar_style(&self) -> Style {
        Style::default().fg(self.bar_fg).bg(self.bar_bg)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border).bg(self.bg)
    }

    pub fn line_number_style(&self) -> Style {
        Style::default().fg(self.line_number)
    }

    pub fn selection_style(&self) -> Style {
        Style::default().bg(self.selection)
    }

    pub fn heading_style(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }

    pub fn bold_style(&self) -> Style {
        Style::default()
            .fg(self.bold)
            .add_modifier(Modifier::BOLD)
    }

    pub fn italic_style(&self) -> Style {
        Style::default()
            .fg(self.italic)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code)
    }

    pub fn quote_style(&self) -> Style {
        Style::default()
            .fg(self.quote)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn dialog_style(&self) -> Style {
        Style::default().fg(self.bar_fg).bg(self.dialog_bg)
    }
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Theme '{0}' not found")]
    NotFound(String),

    #[error("Cannot read theme {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid theme file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Looks up a theme by name: built-ins first, then `<folder>/<name>` or
/// `<folder>/<name>.json`.
pub fn load(name: &str, folder: &Path) -> Result<Palette, ThemeError> {
    match name {
        "default" | "dark" | "textual-dark" => return Ok(Palette::default()),
        "light" | "textual-light" => return Ok(Palette::light()),
        _ => {}
    }

    let path = [folder.join(name), folder.join(format!("{name}.json"))]
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| ThemeError::NotFound(name.to_string()))?;

    let raw = fs::read_to_string(&path).map_err(|source| ThemeError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ThemeError::Parse { path, source })
}

/// Like [`load`], but falls back to the default palette. Returns the name
/// that is actually in effect.
pub fn resolve(name: &str, folder: &Path) -> (String, Palette) {
    match load(name, folder) {
        Ok(palette) => (name.to_string(), palette),
        Err(err) => {
            tracing::warn!(theme = name, error = %err, "falling back to default theme");
            (DEFAULT_THEME.to_string(), Palette::default())
        }
    }
}
