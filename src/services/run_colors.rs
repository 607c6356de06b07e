//! Run-based colour assignment for ordered sightings
//!
//! A "run" is a maximal stretch of consecutive records sharing one key.
//! Every run gets a freshly drawn hue. In adjacency mode nothing is
//! remembered about earlier runs, so a key that shows up again after another
//! key gets a new, unrelated colour. Global mode remembers the colour of
//! every key it has seen.

use crate::domain::color::{hue_to_rgb, Color};
use crate::domain::error::{CoreError, CoreResult};
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

/// How runs of the same key are related to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Colour changes whenever the key differs from the previous record
    #[default]
    Adjacency,
    /// A key keeps its first colour for every later run
    Global,
}

impl GroupingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingMode::Adjacency => "adjacency",
            GroupingMode::Global => "global",
        }
    }
}

/// Assigns one colour per record, changing only at run boundaries
pub struct RunColorAssigner {
    mode: GroupingMode,
    alpha: Option<f64>,
    last_key: Option<String>,
    current: Option<Color>,
    /// Colours per key, only filled in global mode
    seen: FxHashMap<String, Color>,
    runs: usize,
}

impl RunColorAssigner {
    pub fn new(mode: GroupingMode) -> Self {
        Self {
            mode,
            alpha: None,
            last_key: None,
            current: None,
            seen: FxHashMap::default(),
            runs: 0,
        }
    }

    /// Fix the alpha of every emitted colour
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Number of runs started so far
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Colour for the next record in order
    pub fn next_color<R: Rng + ?Sized>(&mut self, key: &str, rng: &mut R) -> CoreResult<Color> {
        if key.is_empty() {
            return Err(CoreError::invalid("grouping key is empty"));
        }

        match (self.last_key.as_deref(), self.current) {
            (Some(last), Some(color)) if last == key => return Ok(color),
            _ => {}
        }

        let color = match self.mode {
            GroupingMode::Adjacency => self.draw(rng),
            GroupingMode::Global => match self.seen.get(key) {
                Some(color) => *color,
                None => {
                    let color = self.draw(rng);
                    self.seen.insert(key.to_string(), color);
                    color
                }
            },
        };

        self.runs += 1;
        debug!(key = %key, run = %self.runs, color = %color, "run_started");

        self.last_key = Some(key.to_string());
        self.current = Some(color);
        Ok(color)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        let hue: f64 = rng.gen_range(0.0..1.0);
        let color = hue_to_rgb(hue);
        match self.alpha {
            Some(a) => color.with_alpha(a),
            None => color,
        }
    }

    /// Colour a whole ordered sequence of keys
    ///
    /// Output has the same length and order as the input. Errors carry the
    /// index of the offending key.
    pub fn assign<I, K, R>(&mut self, keys: I, rng: &mut R) -> CoreResult<Vec<Color>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        R: Rng + ?Sized,
    {
        keys.into_iter()
            .enumerate()
            .map(|(i, key)| self.next_color(key.as_ref(), rng).map_err(|e| e.at(i)))
            .collect()
    }
}
