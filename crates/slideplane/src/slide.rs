use std::collections::HashMap;
use std::fmt;

use crate::geometry::{Rect, Size, Vector2};

/// Scale used when a slide is the only member of a focus.
///
/// Not exactly 1.0: at 1.0 some renderers clip the slide to a zero-area region.
pub const DEFAULT_SINGLE_FOCUS_SCALE: f64 = 0.9999;

/// Stable, globally unique slide name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId(String);

impl SlideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlideId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A slide as seen by navigation: where it sits and how to frame it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDescriptor {
    pub id: SlideId,
    /// Position of the slide center, in multiples of screen size.
    pub offset: Vector2,
    pub single_focus_scale: f64,
    pub hint: Option<String>,
    /// Card heading drawn by the presentation surface.
    pub title: Option<String>,
    /// Card body drawn by the presentation surface.
    pub body: Option<String>,
}

impl SlideDescriptor {
    pub fn new(id: impl Into<SlideId>, offset: Vector2) -> Self {
        Self {
            id: id.into(),
            offset,
            single_focus_scale: DEFAULT_SINGLE_FOCUS_SCALE,
            hint: None,
            title: None,
            body: None,
        }
    }

    #[cfg(test)]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_single_focus_scale(mut self, scale: f64) -> Self {
        self.single_focus_scale = scale;
        self
    }

    /// Plane-space rectangle covered by the slide when its frame is `frame` units of
    /// screen size, centered on its offset.
    pub fn offset_rect(&self, frame: Size) -> Rect {
        Rect::from_center_size(self.offset, frame)
    }
}

impl From<String> for SlideId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lets a slide swallow "next" presses while it steps through internal state.
///
/// `count` starts at 0 each time a focus is selected and grows by one per press.
/// Returning `true` consumes the press.
pub trait ForwardCapture {
    fn capture_forward_event(&mut self, count: u32) -> bool;

    /// Whether the capture carries state a deck reload must not discard.
    fn keeps_state(&self) -> bool {
        true
    }
}

impl<F> ForwardCapture for F
where
    F: FnMut(u32) -> bool,
{
    fn capture_forward_event(&mut self, count: u32) -> bool {
        self(count)
    }
}

/// Never captures.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl ForwardCapture for NoCapture {
    fn capture_forward_event(&mut self, _count: u32) -> bool {
        false
    }

    fn keeps_state(&self) -> bool {
        false
    }
}

/// Captures the first `steps` presses after the slide gains focus.
#[derive(Debug, Clone, Copy)]
pub struct StepCapture {
    pub steps: u32,
}

impl ForwardCapture for StepCapture {
    fn capture_forward_event(&mut self, count: u32) -> bool {
        count < self.steps
    }

    fn keeps_state(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SlideError {
    #[error("slide '{0}' is already registered")]
    DuplicateId(SlideId),
}

/// Ordered slide collection. Order is draw order: later slides sit on top.
///
/// Capture state is kept in a table keyed by slide id. An entry is created when the
/// slide is first registered. Stateful entries live as long as the registry and
/// survive deck reloads.
#[derive(Default)]
pub struct SlideRegistry {
    slides: Vec<SlideDescriptor>,
    captures: HashMap<SlideId, Box<dyn ForwardCapture>>,
}

impl fmt::Debug for SlideRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideRegistry")
            .field("slides", &self.slides)
            .field("captures", &self.captures.len())
            .finish()
    }
}

impl SlideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        slide: SlideDescriptor,
        capture: Box<dyn ForwardCapture>,
    ) -> Result<(), SlideError> {
        if self.get(&slide.id).is_some() {
            return Err(SlideError::DuplicateId(slide.id));
        }
        self.captures.entry(slide.id.clone()).or_insert(capture);
        self.slides.push(slide);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SlideDescriptor> {
        self.slides.iter()
    }

    pub fn get(&self, id: &SlideId) -> Option<&SlideDescriptor> {
        self.slides.iter().find(|s| &s.id == id)
    }

    pub fn get_mut(&mut self, id: &SlideId) -> Option<&mut SlideDescriptor> {
        self.slides.iter_mut().find(|s| &s.id == id)
    }

    /// Ask the slide whether it consumes the `count`-th forward press.
    /// Unknown slides never capture.
    pub fn capture_forward_event(&mut self, id: &SlideId, count: u32) -> bool {
        self.captures
            .get_mut(id)
            .is_some_and(|capture| capture.capture_forward_event(count))
    }

    /// Topmost slide whose frame contains `point`.
    pub fn hit_test(&self, point: Vector2, frame: Size) -> Option<&SlideDescriptor> {
        self.slides
            .iter()
            .rev()
            .find(|slide| slide.offset_rect(frame).contains(point))
    }

    /// Take the slide list of a freshly loaded registry.
    ///
    /// Existing capture entries that keep state stay in place. Every other slide id
    /// takes the entry the reloaded registry created for it, so an edited step count
    /// applies immediately.
    pub fn replace_slides(&mut self, reloaded: SlideRegistry) {
        let SlideRegistry { slides, captures } = reloaded;
        for (id, capture) in captures {
            match self.captures.get(&id) {
                Some(existing) if existing.keeps_state() => {}
                _ => {
                    self.captures.insert(id, capture);
                }
            }
        }
        self.slides = slides;
    }
}
