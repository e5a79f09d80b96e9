//! Markdown rendering module.
//!
//! Converts a [`ParsedDocument`] into styled ratatui [`Text`] and records the
//! rendered row of every level-2 heading, including headings nested in quotes
//! and list items. Those rows are the section positions the terminal
//! scroll-spy works from.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use crate::parse::{BlockKind, ContentBlock, ParsedDocument};

/// Heading level that opens a TOC section.
pub const SECTION_LEVEL: u8 = 2;

/// A section heading and where it landed in the rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionAnchor {
    pub title: String,
    /// 1-based line in the markdown source.
    pub source_line: usize,
    /// 0-based row in [`RenderedDocument::text`].
    pub rendered_line: usize,
}

/// Styled output plus section positions, in document order.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub text: Text<'static>,
    pub sections: Vec<SectionAnchor>,
}

impl RenderedDocument {
    pub fn total_lines(&self) -> usize {
        self.text.lines.len()
    }
}

/// Render `doc`. Lines are never wrapped, so rows do not move when the
/// terminal is resized.
pub fn render_document(doc: &ParsedDocument) -> RenderedDocument {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut block_rows = Vec::with_capacity(doc.blocks.len());

    for (i, block) in doc.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        block_rows.push(lines.len());
        render_block(block, &mut lines);
    }

    // Quotes and lists render one row per content line, so a nested
    // heading's row is its block's first row plus its line within the block.
    let sections = doc
        .headings
        .iter()
        .filter(|h| h.level == SECTION_LEVEL)
        .filter_map(|h| {
            block_rows.get(h.block).map(|start| SectionAnchor {
                title: h.text.clone(),
                source_line: h.line,
                rendered_line: start + h.row,
            })
        })
        .collect();

    RenderedDocument {
        text: Text::from(lines),
        sections,
    }
}

fn render_block(block: &ContentBlock, lines: &mut Vec<Line<'static>>) {
    match &block.kind {
        BlockKind::Heading(level) => render_heading(*level, &block.content, lines),
        BlockKind::Paragraph | BlockKind::HtmlBlock => render_paragraph(&block.content, lines),
        BlockKind::CodeBlock => render_code_block(&block.content, lines),
        BlockKind::List => render_list(&block.content, lines),
        BlockKind::BlockQuote => render_block_quote(&block.content, lines),
        BlockKind::ThematicBreak => render_thematic_break(lines),
        BlockKind::Table => render_table(&block.content, lines),
    }
}

pub fn heading_style(level: u8) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match level {
        1 => base.fg(Color::Magenta),
        2 => base.fg(Color::Cyan),
        3 => base.fg(Color::Green),
        4 => base.fg(Color::Yellow),
        _ => base.fg(Color::White),
    }
}

fn render_heading(level: u8, content: &str, lines: &mut Vec<Line<'static>>) {
    let style = heading_style(level);
    let prefix = "#".repeat(usize::from(level.clamp(1, 6)));
    // Soft breaks inside a heading collapse into one row.
    let text = content.lines().collect::<Vec<_>>().join(" ");
    lines.push(Line::from(Span::styled(format!("{prefix} {text}"), style)));
}

fn render_paragraph(content: &str, lines: &mut Vec<Line<'static>>) {
    for text_line in content.lines() {
        lines.push(Line::from(Span::raw(text_line.to_owned())));
    }
}

fn render_code_block(content: &str, lines: &mut Vec<Line<'static>>) {
    let border_style = Style::default().fg(Color::DarkGray);
    let code_style = Style::default().fg(Color::Green);

    lines.push(Line::from(Span::styled("┌───", border_style)));
    for text_line in content.lines() {
        lines.push(Line::from(vec![
            Span::styled("│ ", border_style),
            Span::styled(text_line.to_owned(), code_style),
        ]));
    }
    lines.push(Line::from(Span::styled("└───", border_style)));
}

fn render_list(content: &str, lines: &mut Vec<Line<'static>>) {
    let bullet_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    for item in content.lines().map(str::trim) {
        if item.is_empty() {
            lines.push(Line::default());
            continue;
        }
        lines.push(Line::from(vec![
            Span::styled("  • ", bullet_style),
            Span::raw(item.to_owned()),
        ]));
    }
}

fn render_block_quote(content: &str, lines: &mut Vec<Line<'static>>) {
    let bar_style = Style::default().fg(Color::DarkGray);
    let text_style = Style::default().add_modifier(Modifier::ITALIC).fg(Color::Gray);
    for text_line in content.lines() {
        lines.push(Line::from(vec![
            Span::styled("  ▌ ", bar_style),
            Span::styled(text_line.to_owned(), text_style),
        ]));
    }
}

fn render_thematic_break(lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(Span::styled(
        "─".repeat(40),
        Style::default().fg(Color::DarkGray),
    )));
}

fn render_table(content: &str, lines: &mut Vec<Line<'static>>) {
    for row in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        lines.push(Line::from(Span::raw(format!("  {row}"))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn joined(doc: &RenderedDocument) -> String {
        doc.text
            .lines
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn section_rows_point_at_level_two_headings() {
        let rendered = render_document(&parse::parse(
            "# Title\n\nIntro\n\n## First\n\nBody\n\n### Detail\n\n## Second\n",
        ));

        let rows: Vec<(&str, usize)> = rendered
            .sections
            .iter()
            .map(|s| (s.title.as_str(), s.rendered_line))
            .collect();
        assert_eq!(rows, vec![("First", 4), ("Second", 10)]);

        for section in &rendered.sections {
            let line = rendered.text.lines[section.rendered_line].to_string();
            assert_eq!(line, format!("## {}", section.title));
        }
    }

    #[test]
    fn section_rows_account_for_multi_line_blocks() {
        let rendered = render_document(&parse::parse("```\na\nb\nc\n```\n\n## After\n"));
        // 5 rows of boxed code, one blank separator.
        assert_eq!(rendered.sections[0].rendered_line, 6);
        assert_eq!(rendered.sections[0].source_line, 7);
    }

    #[test]
    fn nested_level_two_headings_become_sections() {
        let rendered = render_document(&parse::parse(
            "## Top\n\n> ## Quoted\n\n- item\n\n  ## InList\n",
        ));

        let rows: Vec<(&str, usize, usize)> = rendered
            .sections
            .iter()
            .map(|s| (s.title.as_str(), s.source_line, s.rendered_line))
            .collect();
        assert_eq!(rows, vec![("Top", 1, 0), ("Quoted", 3, 2), ("InList", 7, 5)]);

        for section in &rendered.sections {
            let line = rendered.text.lines[section.rendered_line].to_string();
            assert!(line.ends_with(&section.title), "row {line:?}");
        }
    }

    #[test]
    fn nested_rule_renders_between_quoted_paragraphs() {
        let rendered = render_document(&parse::parse("> before\n>\n> ---\n>\n> after\n"));
        let rows: Vec<String> = rendered.text.lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            rows,
            vec![
                "  ▌ before".to_owned(),
                format!("  ▌ {}", parse::NESTED_RULE),
                "  ▌ after".to_owned(),
            ]
        );
    }

    #[test]
    fn blank_lines_inside_lists_keep_their_row() {
        let rendered = render_document(&parse::parse(
            "- code:\n\n  ```\n  a\n\n  b\n  ```\n\n  ## Later\n",
        ));
        let section = &rendered.sections[0];
        assert_eq!(section.title, "Later");
        assert!(rendered.text.lines[section.rendered_line]
            .to_string()
            .ends_with("Later"));
    }

    #[test]
    fn no_sections_without_level_two_headings() {
        let rendered = render_document(&parse::parse("# Only a title\n\n### Deep\n"));
        assert!(rendered.sections.is_empty());
        assert_eq!(rendered.total_lines(), 3);
    }

    #[test]
    fn code_block_has_borders() {
        let rendered = render_document(&parse::parse("```\nhello\n```\n"));
        let text = joined(&rendered);
        assert!(text.contains("┌"));
        assert!(text.contains("hello"));
        assert!(text.contains("└"));
    }

    #[test]
    fn list_and_quote_markers() {
        let rendered = render_document(&parse::parse("- alpha\n- beta\n\n> quoted\n"));
        let text = joined(&rendered);
        assert!(text.contains("• alpha"));
        assert!(text.contains("• beta"));
        assert!(text.contains("▌ quoted"));
    }

    #[test]
    fn empty_document_renders_nothing() {
        let rendered = render_document(&parse::parse(""));
        assert!(rendered.text.lines.is_empty());
        assert!(rendered.sections.is_empty());
    }
}
