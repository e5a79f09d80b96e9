//! Markdown parsing module.
//!
//! Parses markdown text into a flat list of top-level content blocks and a
//! heading list. Nested blocks are flattened into their top-level parent, one
//! line per nested block. Each heading records which block holds it and on
//! which line of that block's content it starts, so the renderer can find its
//! row.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of a top-level content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    CodeBlock,
    List,
    BlockQuote,
    ThematicBreak,
    HtmlBlock,
    Table,
}

/// A top-level content block in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    /// Flattened text content of the block.
    pub content: String,
}

/// A heading extracted from the document, top-level or nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1–6).
    pub level: u8,
    pub text: String,
    /// 1-based line number where the heading appears.
    pub line: usize,
    /// Index into [`ParsedDocument::blocks`] of the enclosing top-level block.
    pub block: usize,
    /// 0-based line within that block's `content` where the heading starts.
    pub row: usize,
}

/// Stand-in content line for a thematic break nested in a quote or list.
pub const NESTED_RULE: &str = "───";

#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub blocks: Vec<ContentBlock>,
    pub headings: Vec<Heading>,
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Maps byte offsets into a source string to 1-based line numbers.
struct LineIndex {
    newline_offsets: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let newline_offsets = source
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { newline_offsets }
    }

    fn line_at(&self, offset: usize) -> usize {
        match self.newline_offsets.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx + 1,
        }
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Inline spans never open a block of their own.
fn is_inline(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

/// Nested tags that start on a fresh line of the flattened content.
fn starts_line(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::CodeBlock(_)
            | Tag::HtmlBlock
            | Tag::BlockQuote(..)
            | Tag::List(_)
            | Tag::Item
            | Tag::TableHead
            | Tag::TableRow
    )
}

fn break_line(buf: &mut String) {
    if !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
}

/// Map a top-level block tag to its [`BlockKind`]; `None` for tags that are
/// skipped (metadata, footnote definitions, ...).
fn top_level_kind(tag: &Tag) -> Option<BlockKind> {
    match tag {
        Tag::Paragraph => Some(BlockKind::Paragraph),
        Tag::Heading { level, .. } => Some(BlockKind::Heading(heading_level_to_u8(*level))),
        Tag::CodeBlock(_) => Some(BlockKind::CodeBlock),
        Tag::BlockQuote(..) => Some(BlockKind::BlockQuote),
        Tag::List(_) => Some(BlockKind::List),
        Tag::Table(_) => Some(BlockKind::Table),
        Tag::HtmlBlock => Some(BlockKind::HtmlBlock),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a markdown source string into a [`ParsedDocument`].
pub fn parse(source: &str) -> ParsedDocument {
    let line_index = LineIndex::new(source);
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut doc = ParsedDocument::default();

    let mut depth: usize = 0;
    let mut current: Option<BlockKind> = None;
    let mut text_buf = String::new();

    let mut heading: Option<(u8, usize, usize)> = None; // (level, line, row)
    let mut heading_buf = String::new();

    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if is_inline(&tag) {
                    continue;
                }
                if depth == 0 {
                    current = top_level_kind(&tag);
                    text_buf.clear();
                } else if starts_line(&tag) {
                    break_line(&mut text_buf);
                } else if matches!(tag, Tag::TableCell)
                    && !text_buf.is_empty()
                    && !text_buf.ends_with('\n')
                {
                    text_buf.push_str(" | ");
                }
                if let Tag::Heading { level, .. } = tag {
                    let row = text_buf.matches('\n').count();
                    heading = Some((
                        heading_level_to_u8(level),
                        line_index.line_at(range.start),
                        row,
                    ));
                    heading_buf.clear();
                }
                depth += 1;
            }

            Event::End(tag_end) => {
                if is_inline_end(&tag_end) {
                    continue;
                }
                if let TagEnd::Heading(_) = tag_end {
                    if let Some((level, line, row)) = heading.take() {
                        doc.headings.push(Heading {
                            level,
                            text: std::mem::take(&mut heading_buf),
                            line,
                            // The enclosing block is pushed once its end is reached.
                            block: doc.blocks.len(),
                            row,
                        });
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(kind) = current.take() {
                        doc.blocks.push(ContentBlock {
                            kind,
                            content: std::mem::take(&mut text_buf),
                        });
                    }
                    text_buf.clear();
                }
            }

            Event::Text(text) | Event::Code(text) => {
                text_buf.push_str(&text);
                if heading.is_some() {
                    heading_buf.push_str(&text);
                }
            }

            Event::SoftBreak | Event::HardBreak => {
                text_buf.push('\n');
                if heading.is_some() {
                    heading_buf.push(' ');
                }
            }

            Event::Html(html) | Event::InlineHtml(html) => text_buf.push_str(&html),

            Event::TaskListMarker(done) => text_buf.push_str(if done { "[x] " } else { "[ ] " }),

            Event::Rule if depth == 0 => doc.blocks.push(ContentBlock {
                kind: BlockKind::ThematicBreak,
                content: String::new(),
            }),

            Event::Rule => {
                break_line(&mut text_buf);
                text_buf.push_str(NESTED_RULE);
            }

            _ => {}
        }
    }

    doc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
