//! Terminal host for the scroll-spy.
//!
//! Shows a rendered markdown document next to a TOC sidebar with one entry
//! per level-2 heading. Every scroll that moves the document notifies the
//! spy, which highlights the sidebar entry of the current section.
//!
//! Rows are converted to nominal CSS pixels with [`ROW_HEIGHT_PX`] so the
//! activation threshold has the same visual size as in the browser.

use std::{cell::Cell, io};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    DefaultTerminal, Frame,
};

use crate::render::{RenderedDocument, SectionAnchor};
use crate::spy::{HeadingElement, LinkElement, ScrollSpy, Viewport};

/// Nominal height of one terminal row in CSS pixels.
pub const ROW_HEIGHT_PX: f64 = 24.0;

const SIDEBAR_WIDTH: u16 = 32;
/// Narrower terminals hide the sidebar; the spy keeps running.
const MIN_WIDTH_FOR_SIDEBAR: u16 = 60;
const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 5;

pub fn rows_to_px(rows: usize) -> f64 {
    rows as f64 * ROW_HEIGHT_PX
}

// ---------------------------------------------------------------------------
// Spy elements
// ---------------------------------------------------------------------------

/// A section heading placed at a rendered row.
pub struct SectionRow(pub usize);

impl HeadingElement for SectionRow {
    fn vertical_offset(&self) -> f64 {
        rows_to_px(self.0)
    }
}

/// A sidebar entry.
#[derive(Debug)]
pub struct TocEntry {
    pub title: String,
    active: Cell<bool>,
}

impl TocEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            active: Cell::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl LinkElement for TocEntry {
    fn set_active(&self, active: bool) {
        self.active.set(active);
    }
}

/// Snapshot the section rows and build one sidebar entry per section.
///
/// `None` when the document has no level-2 headings.
pub fn capture_sections(sections: &[SectionAnchor]) -> Option<ScrollSpy<TocEntry>> {
    let rows = sections.iter().map(|s| SectionRow(s.rendered_line));
    let entries = sections.iter().map(|s| TocEntry::new(&s.title)).collect();
    ScrollSpy::capture(rows, entries)
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

pub struct Viewer {
    rendered: RenderedDocument,
    scroll_offset: usize,
    viewport_height: usize,
    spy: Option<ScrollSpy<TocEntry>>,
    active: Option<usize>,
}

impl Viewport for Viewer {
    fn scroll_top(&self) -> f64 {
        rows_to_px(self.scroll_offset)
    }
}

impl Viewer {
    /// Captures the section snapshot once. Nothing is highlighted until the
    /// first scroll.
    pub fn new(rendered: RenderedDocument, viewport_height: usize) -> Self {
        let spy = capture_sections(&rendered.sections);
        Self {
            rendered,
            scroll_offset: 0,
            viewport_height,
            spy,
            active: None,
        }
    }

    pub fn rendered(&self) -> &RenderedDocument {
        &self.rendered
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn total_lines(&self) -> usize {
        self.rendered.total_lines()
    }

    /// Sidebar entries, empty when the document has no sections.
    pub fn toc_entries(&self) -> &[TocEntry] {
        match &self.spy {
            Some(spy) => spy.links(),
            None => &[],
        }
    }

    /// Index of the highlighted sidebar entry.
    pub fn active_section(&self) -> Option<usize> {
        self.active
    }

    fn max_scroll(&self) -> usize {
        self.total_lines().saturating_sub(self.viewport_height)
    }

    /// Resize the viewport; a clamped scroll offset counts as a scroll.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.scroll_to(self.scroll_offset);
    }

    /// Move to `offset` (clamped) and notify the spy if the position changed.
    pub fn scroll_to(&mut self, offset: usize) {
        let clamped = offset.min(self.max_scroll());
        if clamped == self.scroll_offset {
            return;
        }
        self.scroll_offset = clamped;
        if let Some(spy) = &self.spy {
            let active = spy.on_scroll(&*self);
            self.active = active;
        }
    }

    pub fn line_down(&mut self) {
        self.scroll_to(self.scroll_offset.saturating_add(1));
    }

    pub fn line_up(&mut self) {
        self.scroll_to(self.scroll_offset.saturating_sub(1));
    }

    pub fn half_page_down(&mut self) {
        self.scroll_to(self.scroll_offset.saturating_add(self.viewport_height / 2));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_to(self.scroll_offset.saturating_sub(self.viewport_height / 2));
    }

    pub fn top(&mut self) {
        self.scroll_to(0);
    }

    pub fn bottom(&mut self) {
        self.scroll_to(self.max_scroll());
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

pub fn run(terminal: &mut DefaultTerminal, rendered: RenderedDocument) -> io::Result<()> {
    let height = terminal.size()?.height.saturating_sub(1) as usize;
    let mut viewer = Viewer::new(rendered, height);

    loop {
        terminal.draw(|frame| ui(frame, &viewer))?;

        let event = event::read()?;

        // Re-clamp on every event, including Event::Resize.
        viewer.set_viewport_height(terminal.size()?.height.saturating_sub(1) as usize);

        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Char('d') if ctrl => viewer.half_page_down(),
            KeyCode::Char('u') if ctrl => viewer.half_page_up(),
            KeyCode::Char('j') | KeyCode::Down => viewer.line_down(),
            KeyCode::Char('k') | KeyCode::Up => viewer.line_up(),
            KeyCode::PageDown => viewer.half_page_down(),
            KeyCode::PageUp => viewer.half_page_up(),
            KeyCode::Char('g') | KeyCode::Home => viewer.top(),
            KeyCode::Char('G') | KeyCode::End => viewer.bottom(),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn active_entry_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD)
}

/// One sidebar line per entry; the active one carries a marker and highlight.
pub fn toc_lines(entries: &[TocEntry]) -> Vec<Line<'static>> {
    entries
        .iter()
        .map(|entry| {
            if entry.is_active() {
                Line::from(Span::styled(
                    format!("\u{25B8} {}", entry.title),
                    active_entry_style(),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {}", entry.title),
                    Style::default().fg(Color::Gray),
                ))
            }
        })
        .collect()
}

/// Status bar text: position indicator plus the current section.
pub fn status_line(viewer: &Viewer) -> String {
    let total = viewer.total_lines();
    let offset = viewer.scroll_offset();
    let height = viewer.viewport_height();

    let position = if total == 0 {
        "Empty".to_owned()
    } else if total <= height {
        "All".to_owned()
    } else if offset == 0 {
        "Top".to_owned()
    } else if offset >= total.saturating_sub(height) {
        "Bot".to_owned()
    } else {
        format!("{}%", offset * 100 / total)
    };

    let section = viewer
        .active_section()
        .and_then(|idx| viewer.toc_entries().get(idx))
        .map(|entry| format!(" \u{00A7} {}", entry.title))
        .unwrap_or_default();

    format!(" Line {}/{} \u{2014} {position}{section}", offset + 1, total)
}

fn render_sidebar(frame: &mut Frame, viewer: &Viewer, area: Rect) {
    let entries = viewer.toc_entries();
    let inner_height = area.height.saturating_sub(2) as usize;

    // Keep the active entry roughly centred.
    let scroll = match viewer.active_section() {
        Some(idx) if inner_height > 0 => idx
            .saturating_sub(inner_height / 2)
            .min(entries.len().saturating_sub(inner_height)),
        _ => 0,
    };

    let sidebar = Paragraph::new(toc_lines(entries))
        .block(Block::bordered().title(" Contents "))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(sidebar, area);
}

fn ui(frame: &mut Frame, viewer: &Viewer) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = "Terminal too small";
        let width = (msg.len() as u16).min(area.width);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        if width > 0 && area.height > 0 {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    msg,
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Rect::new(x, y, width, 1),
            );
        }
        return;
    }

    let [body, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    let document_area = if !viewer.toc_entries().is_empty() && area.width >= MIN_WIDTH_FOR_SIDEBAR {
        let [sidebar, document] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)]).areas(body);
        render_sidebar(frame, viewer, sidebar);
        document
    } else {
        body
    };

    let offset = u16::try_from(viewer.scroll_offset()).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(viewer.rendered().text.clone()).scroll((offset, 0)),
        document_area,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            status_line(viewer),
            Style::default().fg(Color::Black).bg(Color::White),
        ))
        .style(Style::default().bg(Color::White)),
        status,
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, render};

    /// "## Alpha" at row 0, "## Beta" at row 42, 123 rows in total.
    fn two_section_viewer() -> Viewer {
        let mut src = String::from("## Alpha\n\n");
        src.push_str(&"para\n\n".repeat(20));
        src.push_str("## Beta\n\n");
        src.push_str(&"para\n\n".repeat(40));
        let rendered = render::render_document(&parse::parse(&src));
        assert_eq!(rendered.sections[1].rendered_line, 42);
        Viewer::new(rendered, 10)
    }

    fn active_flags(viewer: &Viewer) -> Vec<bool> {
        viewer.toc_entries().iter().map(TocEntry::is_active).collect()
    }

    #[test]
    fn nothing_highlighted_before_first_scroll() {
        let viewer = two_section_viewer();
        assert_eq!(viewer.toc_entries().len(), 2);
        assert_eq!(viewer.active_section(), None);
        assert_eq!(active_flags(&viewer), vec![false, false]);
    }

    #[test]
    fn section_switches_three_rows_before_heading() {
        let mut viewer = two_section_viewer();
        // Beta sits at 42 * 24 = 1008px; it becomes current past 933px.
        viewer.scroll_to(38);
        assert_eq!(viewer.active_section(), Some(0));
        viewer.line_down();
        assert_eq!(viewer.scroll_offset(), 39);
        assert_eq!(viewer.active_section(), Some(1));
        assert_eq!(active_flags(&viewer), vec![false, true]);
    }

    #[test]
    fn scrolling_back_up_moves_highlight() {
        let mut viewer = two_section_viewer();
        viewer.bottom();
        assert_eq!(viewer.active_section(), Some(1));
        viewer.top();
        assert_eq!(viewer.scroll_offset(), 0);
        assert_eq!(viewer.active_section(), Some(0));
        assert_eq!(active_flags(&viewer), vec![true, false]);
    }

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut viewer = two_section_viewer();
        viewer.scroll_to(10_000);
        assert_eq!(viewer.scroll_offset(), 123 - 10);
        viewer.set_viewport_height(200);
        assert_eq!(viewer.scroll_offset(), 0);
        assert_eq!(viewer.active_section(), Some(0));
    }

    #[test]
    fn half_page_moves_by_half_viewport() {
        let mut viewer = two_section_viewer();
        viewer.half_page_down();
        assert_eq!(viewer.scroll_offset(), 5);
        viewer.half_page_up();
        assert_eq!(viewer.scroll_offset(), 0);
    }

    #[test]
    fn no_highlight_above_first_section() {
        let rendered = render::render_document(&parse::parse("# Title\n\nIntro\n\n## Only\n"));
        let mut filler = rendered.clone();
        filler
            .text
            .lines
            .extend(std::iter::repeat(Line::default()).take(50));
        let mut viewer = Viewer::new(filler, 10);

        // "## Only" is at row 4 (96px): current past 21px, i.e. from row 1.
        viewer.line_down();
        assert_eq!(viewer.active_section(), Some(0));
        viewer.line_up();
        assert_eq!(viewer.active_section(), None);
        assert_eq!(active_flags(&viewer), vec![false]);
    }

    #[test]
    fn document_without_sections_has_no_spy() {
        let rendered = render::render_document(&parse::parse(
            &"# Title\n\ntext\n\n".repeat(20),
        ));
        let mut viewer = Viewer::new(rendered, 5);
        viewer.bottom();
        viewer.line_up();
        assert!(viewer.toc_entries().is_empty());
        assert_eq!(viewer.active_section(), None);
    }

    #[test]
    fn toc_lines_mark_only_active_entry() {
        let entries = vec![TocEntry::new("One"), TocEntry::new("Two")];
        entries[1].set_active(true);

        let lines = toc_lines(&entries);
        assert_eq!(lines[0].to_string(), "  One");
        assert_eq!(lines[1].to_string(), "\u{25B8} Two");
        assert_eq!(lines[1].spans[0].style, active_entry_style());
        assert_ne!(lines[0].spans[0].style, active_entry_style());
    }

    #[test]
    fn status_line_names_current_section() {
        let mut viewer = two_section_viewer();
        assert_eq!(status_line(&viewer), " Line 1/123 \u{2014} Top");
        viewer.scroll_to(60);
        assert_eq!(
            status_line(&viewer),
            " Line 61/123 \u{2014} 48% \u{00A7} Beta"
        );
    }
}
