//! Scroll-spy table-of-contents highlighting.
//!
//! [`spy`] holds the surface-independent core. Two hosts drive it:
//!
//! - `dom` (wasm32 only): binds the spy to a browser page's `h2` headings and
//!   `#toc` links and keeps the `active` class current on `scroll`.
//! - [`viewer`] (native): a terminal preview of a markdown document with a
//!   TOC sidebar, fed by [`parse`] and [`render`].

pub mod spy;

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(not(target_arch = "wasm32"))]
pub mod load;
#[cfg(not(target_arch = "wasm32"))]
pub mod parse;
#[cfg(not(target_arch = "wasm32"))]
pub mod render;
#[cfg(not(target_arch = "wasm32"))]
pub mod trace;
#[cfg(not(target_arch = "wasm32"))]
pub mod viewer;
