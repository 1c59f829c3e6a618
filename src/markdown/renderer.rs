use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};
use unicode_width::UnicodeWidthStr;

use crate::core::preview::{MarkdownRender, RenderedTree};
use crate::markdown::code_highlight;
use crate::theme::Palette;

/// Renders markdown into styled terminal lines with the active palette.
#[derive(Debug, Clone, Default)]
pub struct TerminalRenderer {
    palette: Palette,
}

impl TerminalRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl MarkdownRender for TerminalRenderer {
    fn render(&self, text: &str, width: u16) -> RenderedTree {
        RenderedTree {
            text: render_markdown(text, usize::from(width.max(1)), &self.palette),
        }
    }
}

pub fn render_markdown(content: &str, width: usize, palette: &Palette) -> Text<'static> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let mut walker = Walker::new(width, palette);
    for event in Parser::new_ext(content, options) {
        walker.event(event);
    }
    walker.finish()
}

struct CodeBlock {
    lang: String,
    content: String,
}

#[derive(Default)]
struct Table {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<Vec<Span<'static>>>>,
    header_rows: usize,
    cell: Vec<Span<'static>>,
}

struct Walker<'p> {
    palette: &'p Palette,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    quote_depth: usize,
    // None = unordered, Some(n) = next ordinal
    lists: Vec<Option<u64>>,
    // Hanging indent for wrapped list item text
    item_indent: usize,
    code: Option<CodeBlock>,
    table: Option<Table>,
    link_url: Option<String>,
    image: Option<(String, String)>,
}

impl<'p> Walker<'p> {
    fn new(width: usize, palette: &'p Palette) -> Self {
        Self {
            palette,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![palette.editor_style()],
            quote_depth: 0,
            lists: Vec::new(),
            item_indent: 0,
            code: None,
            table: None,
            link_url: None,
            image: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let style = self.palette.code_style().bg(self.palette.code_bg);
                self.inline(Span::styled(format!(" {code} "), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = Style::default().fg(self.palette.line_number);
                self.inline(Span::styled(html.trim_end().to_string(), style));
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.break_line(),
            Event::Rule => self.rule(),
            Event::TaskListMarker(checked) => {
                let (marker, style) = if checked {
                    ("[x] ", Style::default().fg(self.palette.success))
                } else {
                    ("[ ] ", self.palette.editor_style())
                };
                self.item_indent += marker.len();
                self.spans.push(Span::styled(marker, style));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                if !self.last_is_blank() {
                    self.blank();
                }
                self.quote_prefix();
                let style = self.palette.heading_style();
                self.spans.push(Span::styled(format!("{} ", "#".repeat(level as usize)), style));
                self.styles.push(style);
            }
            Tag::Strong => self.push_style(self.palette.bold_style()),
            Tag::Emphasis => self.push_style(self.palette.italic_style()),
            Tag::Strikethrough => self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.push_style(self.palette.link_style());
                self.link_url = Some(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    content: String::new(),
                });
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(self.palette.quote_style());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                self.quote_prefix();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let label = format!("{indent}{n}. ");
                        *n += 1;
                        label
                    }
                    _ => format!("{indent}• "),
                };
                self.item_indent = bullet.width();
                self.spans.push(Span::styled(bullet, Style::default().fg(self.palette.heading)));
            }
            Tag::Table(alignments) => {
                self.flush();
                self.table = Some(Table {
                    alignments,
                    ..Table::default()
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => {
                self.styles.pop();
                self.flush();
                let rule = match level {
                    HeadingLevel::H1 => Some("━"),
                    HeadingLevel::H2 => Some("─"),
                    _ => None,
                };
                if let Some(ch) = rule {
                    self.quote_prefix();
                    let avail = self.width.saturating_sub(self.quote_depth * 2);
                    self.spans.push(Span::styled(ch.repeat(avail), Style::default().fg(self.palette.heading)));
                    self.flush();
                }
                self.blank();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take().filter(|u| !u.is_empty()) {
                    let style = Style::default().fg(self.palette.line_number);
                    self.inline(Span::styled(format!(" ({url})"), style));
                }
            }
            TagEnd::Image => {
                if let Some((url, alt)) = self.image.take() {
                    let alt = if alt.is_empty() { "image".to_string() } else { alt };
                    let style = Style::default()
                        .fg(self.palette.italic)
                        .add_modifier(Modifier::ITALIC);
                    self.inline(Span::styled(format!("[{alt}]"), style));
                    let dim = Style::default().fg(self.palette.line_number);
                    self.inline(Span::styled(format!(" ({url})"), dim));
                }
            }
            TagEnd::CodeBlock => {
                if let Some(block) = self.code.take() {
                    let avail = self.width.saturating_sub(self.quote_depth * 2);
                    for line in code_highlight::highlight_code(&block.content, &block.lang, avail, self.palette) {
                        self.quote_prefix();
                        self.spans.extend(line.spans);
                        self.flush();
                    }
                    self.blank();
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 && !self.last_is_blank() {
                    self.blank();
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.item_indent = 0;
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Paragraph => {
                self.flush();
                // Loose list items are not separated by blank lines
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header_rows = table.rows.len();
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    if let Some(row) = table.rows.last_mut() {
                        row.push(cell);
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.table_lines(&table);
                    self.blank();
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
            return;
        }
        if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
            return;
        }
        let style = self.current_style();
        if let Some(table) = self.table.as_mut() {
            table.cell.push(Span::styled(text.to_string(), style));
            return;
        }

        self.quote_prefix();
        for word in text.split_inclusive(' ') {
            let word_w = word.trim_end().width();
            if self.line_width() + word_w > self.width && self.has_content() {
                self.break_line();
                if word.trim().is_empty() {
                    continue;
                }
            }
            match self.spans.last_mut() {
                Some(last) if last.style == style => last.content.to_mut().push_str(word),
                _ => self.spans.push(Span::styled(word.to_string(), style)),
            }
        }
    }

    /// An unbreakable inline span (code, link target, image label).
    fn inline(&mut self, span: Span<'static>) {
        if let Some(table) = self.table.as_mut() {
            table.cell.push(span);
            return;
        }
        self.quote_prefix();
        if self.line_width() + span.width() > self.width && self.has_content() {
            self.break_line();
        }
        self.spans.push(span);
    }

    fn rule(&mut self) {
        self.flush();
        self.quote_prefix();
        let avail = self.width.saturating_sub(self.quote_depth * 2);
        let rule = if avail >= 3 {
            format!("╶{}╴", "─".repeat(avail - 2))
        } else {
            "─".repeat(avail)
        };
        self.spans.push(Span::styled(rule, Style::default().fg(self.palette.rule)));
        self.flush();
        self.blank();
    }

    fn table_lines(&mut self, table: &Table) {
        let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return;
        }
        let cell_width = |cell: &Vec<Span<'static>>| cell.iter().map(Span::width).sum::<usize>();
        let mut widths = vec![3usize; cols];
        for row in &table.rows {
            for (j, cell) in row.iter().enumerate() {
                widths[j] = widths[j].max(cell_width(cell));
            }
        }

        // │ a │ b │ → cols + 1 borders and two spaces of padding per column
        let chrome = cols + 1 + cols * 2;
        let avail = self.width.saturating_sub(self.quote_depth * 2 + chrome);
        let natural: usize = widths.iter().sum();
        if natural > avail && avail > 0 {
            for w in widths.iter_mut() {
                *w = (avail * *w / natural).max(3);
            }
        }

        let border = Style::default().fg(self.palette.border);
        for (i, row) in table.rows.iter().enumerate() {
            self.quote_prefix();
            self.spans.push(Span::styled("│", border));
            for (j, width) in widths.iter().copied().enumerate() {
                let cell = row.get(j).map(|c| fit_cell(c, width)).unwrap_or_default();
                let pad = width.saturating_sub(cell_width(&cell));
                let (left, right) = match table.alignments.get(j) {
                    Some(Alignment::Right) => (pad, 0),
                    Some(Alignment::Center) => (pad / 2, pad - pad / 2),
                    _ => (0, pad),
                };
                self.spans.push(Span::raw(" ".repeat(left + 1)));
                if i < table.header_rows {
                    let bold = Modifier::BOLD;
                    self.spans
                        .extend(cell.into_iter().map(|s| Span::styled(s.content, s.style.add_modifier(bold))));
                } else {
                    self.spans.extend(cell);
                }
                self.spans.push(Span::raw(" ".repeat(right + 1)));
                self.spans.push(Span::styled("│", border));
            }
            self.flush();

            if i + 1 == table.header_rows {
                self.quote_prefix();
                let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                self.spans
                    .push(Span::styled(format!("├{}┤", segments.join("┼")), border));
                self.flush();
            }
        }
    }

    // ─── Line bookkeeping ────────────────────────────────────────────────

    fn push_style(&mut self, overlay: Style) {
        let base = self.current_style();
        self.styles.push(base.patch(overlay));
    }

    fn current_style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    /// Starts a line with the block-quote gutter when inside a quote.
    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 && self.spans.is_empty() {
            self.spans.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(self.palette.quote_border),
            ));
        }
    }

    fn prefix_width(&self) -> usize {
        self.quote_depth * 2
    }

    fn line_width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    fn has_content(&self) -> bool {
        self.line_width() > self.prefix_width() + self.item_indent
    }

    fn break_line(&mut self) {
        if let Some(last) = self.spans.last_mut() {
            let kept = last.content.trim_end().len();
            last.content.to_mut().truncate(kept);
        }
        self.flush();
        self.quote_prefix();
        if self.item_indent > 0 && !self.lists.is_empty() {
            self.spans.push(Span::raw(" ".repeat(self.item_indent)));
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank(&mut self) {
        self.flush();
        self.quote_prefix();
        self.flush();
        if self.quote_depth == 0 {
            self.lines.push(Line::default());
        }
    }

    fn last_is_blank(&self) -> bool {
        self.lines
            .last()
            .map_or(true, |l| {
                l.spans
                    .iter()
                    .all(|s| s.content.trim_matches(|c| c == ' ' || c == '│').is_empty())
            })
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

/// Truncates a cell to `width` columns.
fn fit_cell(cell: &[Span<'static>], width: usize) -> Vec<Span<'static>> {
    let mut remaining = width;
    let mut out = Vec::new();
    for span in cell {
        if remaining == 0 {
            break;
        }
        let w = span.width();
        if w <= remaining {
            out.push(span.clone());
            remaining -= w;
        } else {
            let mut taken = String::new();
            for ch in span.content.chars() {
                let cw = ch.to_string().width();
                if cw > remaining {
                    break;
                }
                taken.push(ch);
                remaining -= cw;
            }
            out.push(Span::styled(taken, span.style));
            remaining = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str, width: usize) -> Text<'static> {
        render_markdown(md, width, &Palette::default())
    }

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_keeps_marker_and_is_underlined() {
        let lines = plain(&render("# Hello", 20));
        assert!(lines.iter().any(|l| l == "# Hello"));
        assert!(lines.iter().any(|l| l.starts_with("━━━")));
    }

    #[test]
    fn bold_and_italic_carry_modifiers() {
        let text = render("**bold** and *it*", 80);
        let spans = &text.lines[0].spans;
        assert!(spans
            .iter()
            .any(|s| s.content.contains("bold") && s.style.add_modifier.contains(Modifier::BOLD)));
        assert!(spans
            .iter()
            .any(|s| s.content.contains("it") && s.style.add_modifier.contains(Modifier::ITALIC)));
    }

    #[test]
    fn strikethrough_is_crossed_out() {
        let text = render("~~gone~~", 80);
        assert!(text.lines[0]
            .spans
            .iter()
            .any(|s| s.content.contains("gone") && s.style.add_modifier.contains(Modifier::CROSSED_OUT)));
    }

    #[test]
    fn long_paragraph_wraps_to_width() {
        let text = render("one two three four five six seven eight nine ten", 12);
        assert!(text.lines.len() > 1);
        for line in &text.lines {
            assert!(line.width() <= 12, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn soft_break_joins_lines() {
        let lines = plain(&render("first\nsecond", 80));
        assert_eq!(lines[0], "first second");
    }

    #[test]
    fn lists_number_and_bullet() {
        let lines = plain(&render("- a\n- b\n\n1. x\n2. y", 80));
        assert!(lines.contains(&"• a".to_string()));
        assert!(lines.contains(&"1. x".to_string()));
        assert!(lines.contains(&"2. y".to_string()));
    }

    #[test]
    fn task_markers_render() {
        let lines = plain(&render("- [ ] todo\n- [x] done", 80));
        assert!(lines.iter().any(|l| l.contains("[ ] todo")));
        assert!(lines.iter().any(|l| l.contains("[x] done")));
    }

    #[test]
    fn quote_has_gutter() {
        let lines = plain(&render("> quoted", 80));
        assert_eq!(lines[0], "│ quoted");
    }

    #[test]
    fn link_shows_target() {
        let lines = plain(&render("[site](https://example.com)", 80));
        assert_eq!(lines[0], "site (https://example.com)");
    }

    #[test]
    fn image_renders_placeholder() {
        let lines = plain(&render("![logo](img/logo.png)", 80));
        assert_eq!(lines[0], "[logo] (img/logo.png)");
    }

    #[test]
    fn code_block_is_boxed() {
        let lines = plain(&render("```rust\nlet x = 1;\n```", 30));
        assert!(lines[0].starts_with("┌─ rust"));
        assert!(lines.iter().any(|l| l.contains("let x = 1;")));
        assert!(lines.iter().any(|l| l.starts_with('└')));
    }

    #[test]
    fn rule_fills_width() {
        let lines = plain(&render("---", 40));
        assert_eq!(lines[0].chars().count(), 40);
    }

    #[test]
    fn table_has_borders_and_separator() {
        let lines = plain(&render("| A | B |\n|---|---|\n| 1 | 2 |", 40));
        assert!(lines[0].starts_with('│') && lines[0].contains('A'));
        assert!(lines[1].starts_with('├') && lines[1].contains('┼'));
        assert!(lines[2].contains('1') && lines[2].contains('2'));
    }

    #[test]
    fn wide_table_fits_narrow_width() {
        let md = "| Long Header One | Long Header Two |\n|---|---|\n| cell content a | cell content b |";
        for line in render(md, 30).lines {
            assert!(line.width() <= 30, "table line too wide: {:?}", line);
        }
    }

    #[test]
    fn trailing_blank_lines_are_trimmed() {
        let text = render("para\n\n", 80);
        assert_eq!(text.lines.len(), 1);
    }

    #[test]
    fn empty_source_renders_nothing() {
        assert!(render("", 80).lines.is_empty());
    }

    #[test]
    fn renderer_trait_uses_width() {
        let tree = TerminalRenderer::default().render("---", 10);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.text.lines[0].width(), 10);
    }
}
