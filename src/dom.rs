//! Browser host for the scroll-spy.
//!
//! Reads the rendered page once: every `h2` heading and every link in the
//! `#toc` list. Then installs a single `scroll` listener on the window that
//! keeps the `active` class on the link of the current section. The listener
//! lives as long as the page; there is no teardown.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

use crate::spy::{HeadingElement, LinkElement, ScrollSpy, Viewport};

/// Section headings tracked by the spy.
pub const HEADING_SELECTOR: &str = "h2";

/// TOC links, one per heading, in document order.
pub const LINK_SELECTOR: &str = "#toc > ul > li > a";

/// Class toggled on the link of the current section.
pub const ACTIVE_CLASS: &str = "active";

/// A heading element; its offset is the layout `offsetTop`.
pub struct DomHeading(HtmlElement);

impl HeadingElement for DomHeading {
    fn vertical_offset(&self) -> f64 {
        f64::from(self.0.offset_top())
    }
}

/// A TOC link element whose class list carries the active marker.
pub struct DomLink(Element);

impl LinkElement for DomLink {
    fn set_active(&self, active: bool) {
        let classes = self.0.class_list();
        let result = if active {
            classes.add_1(ACTIVE_CLASS)
        } else {
            classes.remove_1(ACTIVE_CLASS)
        };
        if let Err(e) = result {
            log::warn!("[dom] class toggle failed active={active} error={e:?}");
        }
    }
}

/// The browser window as the scrolling surface.
pub struct WindowViewport(Window);

impl Viewport for WindowViewport {
    fn scroll_top(&self) -> f64 {
        self.0.scroll_y().unwrap_or_else(|e| {
            log::warn!("[dom] scrollY unavailable error={e:?}");
            0.0
        })
    }
}

fn elements<T: JsCast>(list: &NodeList) -> Vec<T> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Snapshot the headings and TOC links of `document`.
///
/// `Ok(None)` when the page has no headings or no TOC.
pub fn capture_document(document: &Document) -> Result<Option<ScrollSpy<DomLink>>, JsValue> {
    let headings = elements::<HtmlElement>(&document.query_selector_all(HEADING_SELECTOR)?)
        .into_iter()
        .map(DomHeading);
    let links = elements::<Element>(&document.query_selector_all(LINK_SELECTOR)?)
        .into_iter()
        .map(DomLink)
        .collect();

    Ok(ScrollSpy::capture(headings, links))
}

/// Capture the page and register the scroll listener on `window`.
///
/// Returns `false` (and registers nothing) when the page has no TOC.
pub fn install(window: &Window) -> Result<bool, JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;

    let Some(spy) = capture_document(&document)? else {
        log::debug!("[dom] no headings or toc links, scroll listener not installed");
        return Ok(false);
    };

    let viewport = WindowViewport(window.clone());
    let on_scroll = Closure::<dyn FnMut()>::new(move || {
        spy.on_scroll(&viewport);
    });
    window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
    on_scroll.forget();

    log::debug!("[dom] scroll listener installed");
    Ok(true)
}

/// Send `log` records to the browser console. Safe to call more than once;
/// later calls leave the first logger in place.
pub fn init_logging() {
    #[cfg(feature = "console-logging")]
    {
        console_log::init_with_level(log::Level::Debug).ok();
    }
}

/// Module entry point, run by the wasm-bindgen glue on load.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    install(&window)?;
    Ok(())
}
