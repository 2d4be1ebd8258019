//! Fixed Footnotes
//!
//! Keeps the notes of on-screen footnote references visible in a fixed
//! overlay while the reader scrolls.
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use fixed_footnotes::{create, Options};
//! use footnote_dom::{parse_html, MemoryWindow};
//!
//! let doc = parse_html(r##"<a class="reference" href="#fn1">1</a>"##, "https://example.com/");
//! let window = Rc::new(MemoryWindow::new(doc, 800.0, 600.0));
//!
//! let footnotes = create(Options::new(), window.clone())?;
//! footnotes.add_refresh_listener(Rc::new(|| println!("painted")));
//! window.scroll_by(0.0, 400.0);
//! window.advance(std::time::Duration::from_millis(200));
//! footnotes.stop()?;
//! ```

mod config;
mod engine;
mod error;
mod listeners;
mod note;
mod throttle;
mod viewport;

use std::rc::Rc;

pub use config::{Config, EMPTY_CLASS, Options, TransformNote};
pub use engine::FixedFootnotes;
pub use error::{FixedFootnotesError, Result};
pub use listeners::{RefreshListener, RefreshListeners};
pub use note::{build_displayed_note, note_id_from_href, resolve_note, strip_ids};
pub use throttle::Throttle;
pub use viewport::{Viewport, is_visible};

use footnote_dom::WindowHost;

/// Start a fixed-footnotes instance on `window`
///
/// Fails when no element matches `fixed_container_location` or when a
/// configured selector is invalid.
pub fn create<W: WindowHost>(options: Options<W>, window: Rc<W>) -> Result<FixedFootnotes<W>> {
    FixedFootnotes::new(options, window)
}
