use std::sync::OnceLock;

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

use crate::theme::Palette;

const SYNTAX_THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

pub fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

pub fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Loads the syntect statics on a background thread so the first code
/// block in the preview does not stall the UI.
pub fn ensure_loaded() {
    std::thread::spawn(|| {
        syntax_set();
        theme_set();
    });
}

/// Map common language aliases to tokens that syntect's default set recognizes.
fn resolve_lang(lang: &str) -> &str {
    match lang {
        "typescript" | "ts" | "tsx" | "jsx" => "javascript",
        "sh" | "zsh" | "fish" | "shell" => "bash",
        "yml" => "yaml",
        "jsonc" => "json",
        "cxx" | "cc" | "hpp" => "cpp",
        "py" => "python",
        "rs" => "rust",
        _ => lang,
    }
}

/// Highlights a fenced code block and frames it in a box `width` columns wide.
pub fn highlight_code(code: &str, lang: &str, width: usize, palette: &Palette) -> Vec<Line<'static>> {
    let ss = syntax_set();
    let bg_style = Style::default().bg(palette.code_bg);
    let border_style = Style::default().fg(palette.border).bg(palette.code_bg);
    let plain_style = Style::default().fg(palette.code).bg(palette.code_bg);

    let syntax = if lang.is_empty() {
        None
    } else {
        ss.find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_token(resolve_lang(lang)))
    };
    let mut highlighter = syntax
        .zip(theme_set().themes.get(SYNTAX_THEME))
        .map(|(syntax, theme)| HighlightLines::new(syntax, theme));

    let mut lines: Vec<Line<'static>> = Vec::new();
    let inner_w = width.saturating_sub(2);

    // ┌─ lang ───┐
    let label = if lang.is_empty() { String::new() } else { format!(" {lang} ") };
    let fill = inner_w.saturating_sub(1 + label.width());
    lines.push(Line::from(Span::styled(
        format!("┌─{label}{}┐", "─".repeat(fill)),
        border_style,
    )));

    for raw in LinesWithEndings::from(code) {
        let mut spans: Vec<Span<'static>> = vec![Span::styled("  ", bg_style)];
        let mut col = 2usize;

        let regions = highlighter
            .as_mut()
            .and_then(|h| h.highlight_line(raw, ss).ok());
        match regions {
            Some(regions) => {
                for (style, content) in regions {
                    let text = content.trim_end_matches('\n');
                    if text.is_empty() {
                        continue;
                    }
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    col += text.width();
                    spans.push(Span::styled(text.to_string(), Style::default().fg(fg).bg(palette.code_bg)));
                }
            }
            None => {
                let text = raw.trim_end_matches('\n').to_string();
                col += text.width();
                spans.push(Span::styled(text, plain_style));
            }
        }

        if col < width {
            spans.push(Span::styled(" ".repeat(width - col), bg_style));
        }
        lines.push(Line::from(spans));
    }

    // └───┘
    lines.push(Line::from(Span::styled(
        format!("└{}┘", "─".repeat(inner_w)),
        border_style,
    )));
    lines
}
