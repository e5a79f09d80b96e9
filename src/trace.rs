//! Non-interactive spy trace: which section is current at given offsets.

use crate::render::RenderedDocument;
use crate::viewer::capture_sections;

/// One report line per offset, recomputed in order against a single snapshot.
///
/// Offsets are in the same pixel units as the terminal viewer. An active
/// section is reported with its 1-based line in the markdown source.
pub fn trace(rendered: &RenderedDocument, scroll_tops: &[f64]) -> Vec<String> {
    let Some(spy) = capture_sections(&rendered.sections) else {
        return vec!["no sections".to_owned()];
    };

    scroll_tops
        .iter()
        .map(|&scroll_top| {
            let active = spy.recompute(scroll_top);
            log::debug!("[trace] scroll_top={scroll_top} active={active:?}");
            match active.and_then(|idx| rendered.sections.get(idx).map(|s| (idx, s))) {
                Some((idx, section)) => format!(
                    "scroll_top={scroll_top} active={idx}:{} line={}",
                    section.title, section.source_line
                ),
                None => format!("scroll_top={scroll_top} active=none"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, render};

    fn rendered(src: &str) -> RenderedDocument {
        render::render_document(&parse::parse(src))
    }

    #[test]
    fn reports_section_per_offset() {
        // Intro at row 4 (96px), Usage at row 8 (192px).
        let doc = rendered("# Title\n\nLead\n\n## Intro\n\ntext\n\n## Usage\n\ntext\n");
        let lines = trace(&doc, &[0.0, 50.0, 117.0, 118.0, 1000.0, 50.0]);
        assert_eq!(
            lines,
            vec![
                "scroll_top=0 active=none",
                "scroll_top=50 active=0:Intro line=5",
                "scroll_top=117 active=0:Intro line=5",
                "scroll_top=118 active=1:Usage line=9",
                "scroll_top=1000 active=1:Usage line=9",
                "scroll_top=50 active=0:Intro line=5",
            ]
        );
    }

    #[test]
    fn reports_missing_sections_once() {
        let doc = rendered("# Title\n\nNo sections here.\n");
        assert_eq!(trace(&doc, &[0.0, 100.0]), vec!["no sections"]);
    }

    #[test]
    fn fractional_offsets_are_printed_as_given() {
        let doc = rendered("## Only\n");
        assert_eq!(trace(&doc, &[-80.5]), vec!["scroll_top=-80.5 active=none"]);
    }
}
