//! Navigation along the focus path and the derived camera/hint state.

use tracing::{debug, error};

use crate::camera::Camera;
use crate::focus::Focus;
use crate::geometry::Vector2;
use crate::resolver::{self, FocusError};
use crate::slide::{SlideId, SlideRegistry};

/// Hint shown while the selected index lies outside the focus list.
pub const OFF_PATH_HINT: &str = "Outside the planned path";

/// Default duration of an animated camera move, in seconds.
pub const DEFAULT_ANIMATION_SECONDS: f64 = 1.0;

/// Current user interaction idiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The deck is being presented.
    #[default]
    Presentation,
    /// Slides can be dragged around and the camera only moves on request.
    Editor,
}

/// Who receives keyboard input: the presentation surface or some other widget
/// (a text field, the hint panel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    Surface,
    Elsewhere,
}

/// How the surface should move from the displayed camera to a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPolicy {
    /// Ease in and out over `seconds`.
    Animated { seconds: f64 },
    /// Jump straight to the new pose.
    Immediate,
}

impl AnimationPolicy {
    /// Camera moves animate only while presenting outside free roam.
    pub fn for_mode(mode: Mode, free_roam: bool, seconds: f64) -> Self {
        match (mode, free_roam) {
            (Mode::Presentation, false) => Self::Animated { seconds },
            _ => Self::Immediate,
        }
    }
}

/// Outcome of a forward press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The focused slide consumed the press; the index did not change.
    Captured,
    /// The index moved to the next focus.
    Moved,
}

/// Selected focus plus everything derived from it.
#[derive(Debug)]
pub struct NavigationState {
    focuses: Vec<Focus>,
    selected_focus: isize,
    camera: Camera,
    hint: Option<String>,
    /// Number of forward presses offered to the focused slide since selection.
    forward_events: u32,
    /// Bumped on every camera assignment, including refreshes that keep the value.
    camera_revision: u64,
    animation_seconds: f64,
    pub mode: Mode,
    pub free_roam: bool,
    pub double_click_free_roam: bool,
    pub input_focus: InputFocus,
    /// Slide under the pointer while free roaming.
    pub hovered_slide: Option<SlideId>,
}

impl NavigationState {
    /// Start in presentation mode, selecting `index` (which may be out of range).
    pub fn new(
        focuses: Vec<Focus>,
        index: isize,
        registry: &SlideRegistry,
    ) -> Result<Self, FocusError> {
        let mut state = Self {
            focuses,
            selected_focus: index,
            camera: Camera::default(),
            hint: None,
            forward_events: 0,
            camera_revision: 0,
            animation_seconds: DEFAULT_ANIMATION_SECONDS,
            mode: Mode::Presentation,
            free_roam: false,
            double_click_free_roam: true,
            input_focus: InputFocus::Surface,
            hovered_slide: None,
        };
        state.jump_to(index, registry)?;
        Ok(state)
    }

    pub fn with_animation_seconds(mut self, seconds: f64) -> Self {
        self.animation_seconds = seconds;
        self
    }

    pub fn focuses(&self) -> &[Focus] {
        &self.focuses
    }

    pub fn selected_focus(&self) -> isize {
        self.selected_focus
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn camera_revision(&self) -> u64 {
        self.camera_revision
    }

    #[cfg(test)]
    pub fn forward_events(&self) -> u32 {
        self.forward_events
    }

    pub fn animation_policy(&self) -> AnimationPolicy {
        AnimationPolicy::for_mode(self.mode, self.free_roam, self.animation_seconds)
    }

    /// Whether an index change may move the camera.
    fn camera_follows_focus(&self) -> bool {
        self.mode == Mode::Presentation && !self.free_roam
    }

    /// Select `index` and re-resolve. Out-of-range indices are allowed and leave the
    /// camera where it is.
    pub fn jump_to(&mut self, index: isize, registry: &SlideRegistry) -> Result<(), FocusError> {
        self.selected_focus = index;
        self.forward_events = 0;

        match resolver::resolve(&self.focuses, index, registry) {
            Ok(Some(resolved)) => {
                debug!(index, camera = ?resolved.camera, "Focus resolved");
                if self.camera_follows_focus() {
                    self.set_camera(resolved.camera);
                }
                self.hint = Some(resolved.hint);
                Ok(())
            }
            Ok(None) => {
                debug!(index, "Focus outside the planned path");
                self.hint = Some(OFF_PATH_HINT.to_string());
                Ok(())
            }
            Err(e) => {
                error!(index, "Failed to resolve focus: {e}");
                Err(e)
            }
        }
    }

    /// Forward press. A single-slide focus gets to consume it first.
    pub fn advance(&mut self, registry: &mut SlideRegistry) -> Result<Step, FocusError> {
        let focused_slide = usize::try_from(self.selected_focus)
            .ok()
            .and_then(|i| self.focuses.get(i))
            .and_then(Focus::single_slide)
            .cloned();

        if let Some(slide) = focused_slide {
            let count = self.forward_events;
            self.forward_events += 1;
            if registry.capture_forward_event(&slide, count) {
                debug!(%slide, count, "Forward press captured by slide");
                return Ok(Step::Captured);
            }
        }

        self.jump_to(self.selected_focus + 1, registry)?;
        Ok(Step::Moved)
    }

    pub fn retreat(&mut self, registry: &SlideRegistry) -> Result<(), FocusError> {
        self.jump_to(self.selected_focus - 1, registry)
    }

    /// Frame a single slide directly, outside the focus path.
    pub fn move_to_slide(&mut self, id: &SlideId, registry: &SlideRegistry) -> bool {
        let Some(slide) = registry.get(id) else {
            return false;
        };
        let resolved = resolver::single_slide(slide);
        self.set_camera(resolved.camera);
        self.hint = slide.hint.clone();
        true
    }

    /// Replace the camera wholesale.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.camera_revision += 1;
    }

    /// Re-assign the current camera so the surface lays the plane out again.
    pub fn refresh_camera(&mut self) {
        self.set_camera(self.camera);
    }

    pub fn pan_camera(&mut self, delta: Vector2) {
        self.set_camera(self.camera.panned(delta));
    }

    pub fn toggle_free_roam(&mut self) -> bool {
        self.free_roam = !self.free_roam;
        debug!(free_roam = self.free_roam, "Free roam toggled");
        self.free_roam
    }

    /// Swap in a reloaded focus list and re-resolve the selected index.
    pub fn replace_focuses(
        &mut self,
        focuses: Vec<Focus>,
        registry: &SlideRegistry,
    ) -> Result<(), FocusError> {
        self.focuses = focuses;
        self.jump_to(self.selected_focus, registry)
    }
}
