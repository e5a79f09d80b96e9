//! Scroll-spy core.
//!
//! Matches a vertical scroll offset against a snapshot of section-heading
//! positions and marks the table-of-contents link of the current section as
//! active. The snapshot is taken once by [`ScrollSpy::capture`]; every scroll
//! notification afterwards goes through [`ScrollSpy::recompute`].
//!
//! The module knows nothing about any rendering surface. Hosts implement
//! [`HeadingElement`], [`LinkElement`] and [`Viewport`] for whatever backs
//! them (DOM nodes, terminal sidebar entries, in-memory fixtures).

use std::cell::Cell;

/// Distance (in heading offset units) above a heading at which its section
/// already counts as the current one.
pub const ACTIVATION_THRESHOLD: f64 = 75.0;

// ---------------------------------------------------------------------------
// Host capabilities
// ---------------------------------------------------------------------------

/// A section heading with a position in the document.
pub trait HeadingElement {
    /// Distance from the document top to the heading's top edge.
    fn vertical_offset(&self) -> f64;
}

/// A TOC entry that can carry the "active" indicator.
///
/// Takes `&self`: DOM class lists and `Cell`-backed fixtures are both
/// interior-mutable handles.
pub trait LinkElement {
    fn set_active(&self, active: bool);
}

/// The scrollable surface that delivers scroll notifications.
pub trait Viewport {
    /// Current distance scrolled from the document top.
    fn scroll_top(&self) -> f64;
}

impl HeadingElement for f64 {
    fn vertical_offset(&self) -> f64 {
        *self
    }
}

impl LinkElement for Cell<bool> {
    fn set_active(&self, active: bool) {
        self.set(active);
    }
}

impl<T: LinkElement + ?Sized> LinkElement for &T {
    fn set_active(&self, active: bool) {
        (**self).set_active(active);
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Heading positions and their links, captured once at load.
///
/// The i-th heading corresponds to the i-th link by position only. Offsets
/// are never refreshed after capture.
#[derive(Debug)]
pub struct ScrollSpy<L> {
    offsets: Vec<f64>,
    links: Vec<L>,
}

impl<L: LinkElement> ScrollSpy<L> {
    /// Snapshot `headings` and `links`.
    ///
    /// Returns `None` when either sequence is empty (e.g. the page has no
    /// TOC); the host should then install no scroll handler at all.
    pub fn capture<H, I>(headings: I, links: Vec<L>) -> Option<Self>
    where
        H: HeadingElement,
        I: IntoIterator<Item = H>,
    {
        let offsets: Vec<f64> = headings
            .into_iter()
            .map(|h| h.vertical_offset())
            .collect();

        if offsets.is_empty() || links.is_empty() {
            log::debug!(
                "[spy] capture skipped headings={} links={}",
                offsets.len(),
                links.len()
            );
            return None;
        }
        if offsets.len() != links.len() {
            log::warn!(
                "[spy] heading/link count mismatch headings={} links={}",
                offsets.len(),
                links.len()
            );
        }
        log::debug!("[spy] captured sections={}", offsets.len());

        Some(Self { offsets, links })
    }

    /// Heading offsets as read at capture time.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn links(&self) -> &[L] {
        &self.links
    }

    /// Index of the heading whose section is current at `scroll_top`.
    ///
    /// Scans bottom-up so the bottom-most qualifying heading wins, also for
    /// duplicate or out-of-order offsets. `None` above the first threshold.
    pub fn select(&self, scroll_top: f64) -> Option<usize> {
        self.offsets
            .iter()
            .rposition(|&offset| scroll_top > offset - ACTIVATION_THRESHOLD)
    }

    /// Clear every link, then activate the one for the current section.
    ///
    /// Returns the activated index. A selected heading without a matching
    /// link (count mismatch) activates nothing.
    pub fn recompute(&self, scroll_top: f64) -> Option<usize> {
        for link in &self.links {
            link.set_active(false);
        }

        let selected = self.select(scroll_top)?;
        match self.links.get(selected) {
            Some(link) => {
                link.set_active(true);
                Some(selected)
            }
            None => {
                log::debug!("[spy] no link for section index={selected}");
                None
            }
        }
    }

    /// Scroll handler: read the viewport's offset and recompute.
    pub fn on_scroll<V: Viewport + ?Sized>(&self, viewport: &V) -> Option<usize> {
        self.recompute(viewport.scroll_top())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
