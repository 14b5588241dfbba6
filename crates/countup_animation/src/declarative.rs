//! Attribute-driven counters
//!
//! Elements describe their counter with string attributes:
//!
//! | attribute       | meaning                                  |
//! |-----------------|------------------------------------------|
//! | `data-count-up` | end value (required, float)              |
//! | `data-duration` | run time in ms (int, default 2000)       |
//! | `data-delay`    | delay in ms (int, default 0)             |
//! | `data-format`   | `int`, or anything else for two decimals |
//!
//! The host registers elements once with [`DeclarativeCountUp::init`] and
//! then reports visibility ratios. The first time an element is at least
//! 10% visible its counter is built and started, and the element stops
//! being observed.

use crate::animator::Animator;
use crate::config::{AnimationConfig, DEFAULT_DELAY_MS, DEFAULT_DURATION_MS};
use crate::format::NumberFormat;
use countup_core::{
    parse_float_prefix, parse_int_prefix, CountUpError, DisplayTarget, FrameClock, Result,
    TextBuffer,
};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use std::rc::Rc;

/// Attribute holding the end value; only elements carrying it are observed
pub const COUNT_UP_ATTR: &str = "data-count-up";
pub const DURATION_ATTR: &str = "data-duration";
pub const DELAY_ATTR: &str = "data-delay";
pub const FORMAT_ATTR: &str = "data-format";

/// Fraction of an element that must be visible to trigger its counter
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

new_key_type! {
    /// Handle to an observed element
    pub struct ElementId;
}

/// A display target that also carries string attributes
pub trait DeclarativeElement: DisplayTarget {
    fn attribute(&self, name: &str) -> Option<String>;
}

/// In-memory element: a [`TextBuffer`] plus attributes
#[derive(Debug, Default)]
pub struct TextElement {
    buffer: TextBuffer,
    attributes: HashMap<String, String>,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            buffer: TextBuffer::with_text(text),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }
}

impl DisplayTarget for TextElement {
    fn set_text(&self, text: &str) {
        self.buffer.set_text(text);
    }

    fn text(&self) -> String {
        self.buffer.text()
    }
}

impl DeclarativeElement for TextElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

/// Forwards display calls to an element so it can be used as an animator
/// target
struct ElementTarget(Rc<dyn DeclarativeElement>);

impl DisplayTarget for ElementTarget {
    fn set_text(&self, text: &str) {
        self.0.set_text(text);
    }

    fn text(&self) -> String {
        self.0.text()
    }
}

/// Build a counter configuration from an element's attributes
///
/// Fails with [`CountUpError::InvalidConfiguration`] when `data-count-up` is
/// missing or does not start with a number. Duration and delay fall back to
/// their defaults when missing, non-numeric or zero.
pub fn parse_attributes(element: &dyn DeclarativeElement) -> Result<AnimationConfig> {
    let raw_end = element.attribute(COUNT_UP_ATTR).unwrap_or_default();
    let end_value = match parse_float_prefix(&raw_end) {
        Some(value) if !value.is_nan() => value,
        _ => {
            return Err(CountUpError::InvalidConfiguration(format!(
                "{} value {:?} is not a number",
                COUNT_UP_ATTR, raw_end
            )))
        }
    };

    let duration = int_attribute(element, DURATION_ATTR).unwrap_or(DEFAULT_DURATION_MS);
    let delay = int_attribute(element, DELAY_ATTR).unwrap_or(DEFAULT_DELAY_MS);
    let format = match element.attribute(FORMAT_ATTR) {
        Some(name) if !name.is_empty() => NumberFormat::from_name(&name),
        _ => NumberFormat::Int,
    };

    Ok(AnimationConfig {
        end_value,
        duration,
        delay,
        format,
        ..AnimationConfig::default()
    })
}

/// Integer attribute in ms, `None` when missing, unparsable or zero
fn int_attribute(element: &dyn DeclarativeElement, name: &str) -> Option<f64> {
    element
        .attribute(name)
        .and_then(|raw| parse_int_prefix(&raw))
        .filter(|value| *value != 0)
        .map(|value| value as f64)
}

/// Registry of attribute-driven counters
///
/// Holds observed elements until they first become visible, and the
/// animators started for them afterwards.
pub struct DeclarativeCountUp {
    clock: Rc<dyn FrameClock>,
    elements: SlotMap<ElementId, Rc<dyn DeclarativeElement>>,
    observed: Vec<ElementId>,
    animators: Vec<(ElementId, Animator)>,
}

impl DeclarativeCountUp {
    /// Observe every element carrying `data-count-up`
    ///
    /// Elements without the attribute are ignored.
    pub fn init<I>(clock: Rc<dyn FrameClock>, elements: I) -> Self
    where
        I: IntoIterator<Item = Rc<dyn DeclarativeElement>>,
    {
        let mut registry = Self {
            clock,
            elements: SlotMap::with_key(),
            observed: Vec::new(),
            animators: Vec::new(),
        };
        for element in elements {
            if element.attribute(COUNT_UP_ATTR).is_some() {
                registry.observe(element);
            }
        }
        tracing::debug!(
            "DeclarativeCountUp: observing {} elements",
            registry.observed.len()
        );
        registry
    }

    /// Start observing one more element
    pub fn observe(&mut self, element: Rc<dyn DeclarativeElement>) -> ElementId {
        let id = self.elements.insert(element);
        self.observed.push(id);
        id
    }

    /// Ids of the elements still waiting to become visible, in order
    pub fn observed(&self) -> &[ElementId] {
        &self.observed
    }

    pub fn is_observed(&self, id: ElementId) -> bool {
        self.observed.contains(&id)
    }

    /// Animator started for `id`, if any
    pub fn animator(&self, id: ElementId) -> Option<&Animator> {
        self.animators
            .iter()
            .find(|(element, _)| *element == id)
            .map(|(_, animator)| animator)
    }

    /// Every started animator
    pub fn animators(&self) -> impl Iterator<Item = &Animator> {
        self.animators.iter().map(|(_, animator)| animator)
    }

    /// Report visibility ratios for observed elements
    ///
    /// Each element at or above [`VISIBILITY_THRESHOLD`] is handled once:
    /// a valid configuration starts a counter, an invalid one is logged and
    /// the element text is left alone. Unknown or already handled ids are
    /// ignored. Returns the number of counters started.
    pub fn on_intersection(&mut self, entries: &[(ElementId, f64)]) -> usize {
        let mut started = 0;
        for &(id, ratio) in entries {
            if ratio < VISIBILITY_THRESHOLD || !self.is_observed(id) {
                continue;
            }
            self.observed.retain(|observed| *observed != id);

            let Some(element) = self.elements.remove(id) else {
                continue;
            };
            match parse_attributes(element.as_ref()) {
                Ok(config) => {
                    let target = Rc::new(ElementTarget(element));
                    let animator = Animator::new(target, config, self.clock.clone());
                    animator.start();
                    self.animators.push((id, animator));
                    started += 1;
                }
                Err(err) => {
                    tracing::error!("DeclarativeCountUp: {}", err);
                }
            }
        }
        started
    }
}
