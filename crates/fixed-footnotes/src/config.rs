//! Engine Configuration

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use footnote_dom::WindowHost;
use serde::{Deserialize, Serialize};

/// Class carried by the overlay container while it holds no note
pub const EMPTY_CLASS: &str = "empty";

/// Serializable engine options
///
/// Missing keys keep their defaults, so deserializing a partial object
/// merges it over the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Selector identifying the reference markers
    pub references_selector: String,

    /// Selector of the node hosting the fixed container
    pub fixed_container_location: String,

    /// Id given to the fixed container; empty means none
    pub fixed_container_id: String,

    /// Class given to the fixed container
    pub fixed_container_class: String,

    /// Class given to every displayed note
    pub footnote_class: String,

    /// Minimum interval between refreshes triggered by scroll/resize
    pub throttle_interval_ms: u64,

    /// Listener dispatch delay when animation frames are unavailable
    pub frame_fallback_delay_ms: u64,
}

impl Config {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    pub fn frame_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.frame_fallback_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            references_selector: ".reference".to_string(),
            fixed_container_location: "body".to_string(),
            fixed_container_id: String::new(),
            fixed_container_class: "fixed-footnotes-container".to_string(),
            footnote_class: "fixed-footnotes-note".to_string(),
            throttle_interval_ms: 200,
            frame_fallback_delay_ms: 10,
        }
    }
}

/// Hook applied to every displayed note before it is inserted
pub type TransformNote<W> = Rc<dyn Fn(&W, <W as WindowHost>::Node) -> <W as WindowHost>::Node>;

/// Engine options: the serializable `Config` plus the note hook
pub struct Options<W: WindowHost> {
    config: Config,
    transform_note: TransformNote<W>,
}

impl<W: WindowHost> Options<W> {
    /// Default options
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Options built on an existing config, identity hook
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            transform_note: Rc::new(|_, note| note),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn note_hook(&self) -> &TransformNote<W> {
        &self.transform_note
    }

    pub fn references_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.references_selector = selector.into();
        self
    }

    pub fn fixed_container_location(mut self, selector: impl Into<String>) -> Self {
        self.config.fixed_container_location = selector.into();
        self
    }

    pub fn fixed_container_id(mut self, id: impl Into<String>) -> Self {
        self.config.fixed_container_id = id.into();
        self
    }

    pub fn fixed_container_class(mut self, class: impl Into<String>) -> Self {
        self.config.fixed_container_class = class.into();
        self
    }

    pub fn footnote_class(mut self, class: impl Into<String>) -> Self {
        self.config.footnote_class = class.into();
        self
    }

    pub fn throttle_interval(mut self, interval: Duration) -> Self {
        self.config.throttle_interval_ms = millis(interval);
        self
    }

    pub fn frame_fallback_delay(mut self, delay: Duration) -> Self {
        self.config.frame_fallback_delay_ms = millis(delay);
        self
    }

    /// Replace the note hook. It receives the window and the finished note
    /// (class set, ids stripped) and returns the node to insert.
    pub fn transform_note<F>(mut self, hook: F) -> Self
    where
        F: Fn(&W, W::Node) -> W::Node + 'static,
    {
        self.transform_note = Rc::new(hook);
        self
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl<W: WindowHost> Default for Options<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WindowHost> Clone for Options<W> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transform_note: self.transform_note.clone(),
        }
    }
}

impl<W: WindowHost> From<Config> for Options<W> {
    fn from(config: Config) -> Self {
        Self::from_config(config)
    }
}

impl<W: WindowHost> fmt::Debug for Options<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
