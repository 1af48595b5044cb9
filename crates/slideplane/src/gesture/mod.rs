//! Gesture state machine: turns pointer, wheel and keyboard input into camera
//! moves, slide drags and focus navigation.
//!
//! Every handler runs on the UI thread. The free-roam edge-pan timer is polled by
//! the surface through [`GestureMachine::tick`] rather than firing on its own.

pub mod drag;
pub mod edge_pan;
pub mod input;


use tracing::{debug, warn};

use crate::geometry::{Point, Size, Vector2};
use crate::navigation::{InputFocus, Mode, NavigationState};
use crate::slide::{SlideId, SlideRegistry};

use drag::DragMachine;
use edge_pan::{EdgePanTimer, movement_vector};
use input::{InputEvent, KeyAction, Modifiers};

/// Smallest scale the wheel or the zoom-out key can reach.
const MIN_ZOOM_SCALE: f64 = 0.05;

/// Tunables for free roam and double-click detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Dead-zone size as a fraction of the half window.
    pub edge_threshold: f64,
    /// Edge-pan timer frequency in Hz.
    pub tick_rate: f64,
    /// Wheel delta is divided by this before being added to the scale.
    pub wheel_divisor: f64,
    /// Maximum seconds between two presses of a double click.
    pub double_click_interval: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 0.25,
            tick_rate: 24.0,
            wheel_divisor: 1500.0,
            double_click_interval: 0.3,
        }
    }
}

impl GestureConfig {
    /// Largest per-tick pan, in screen multiples: five screens per second.
    pub fn max_per_tick(&self) -> f64 {
        5.0 / self.tick_rate
    }
}

/// Convert a window position to a plane displacement from the window center at
/// the given camera scale. The y axis is flipped: the plane grows upward.
pub fn screen_to_plane(pos: Point, window: Size, scale: f64) -> Vector2 {
    Vector2::new(
        (pos.x - window.width / 2.0) / window.width / scale,
        (pos.y - window.height / 2.0) / window.height / scale,
    )
    .inverted_dy()
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    config: GestureConfig,
    /// Window size in pixels.
    window: Size,
    /// Slide frame size in screen multiples, used for hit-testing.
    frame: Size,
    camera_pan: DragMachine<()>,
    slide_drag: DragMachine<SlideId>,
    last_click: Option<f64>,
    edge_pan: EdgePanTimer,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            frame: Size::new(1.0, 1.0),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update window size (pixels) and slide frame size (screen multiples).
    pub fn set_viewport(&mut self, window: Size, frame: Size) {
        self.window = window;
        self.frame = frame;
    }

    #[cfg(test)]
    pub fn camera_pan(&self) -> &DragMachine<()> {
        &self.camera_pan
    }

    pub fn slide_drag(&self) -> &DragMachine<SlideId> {
        &self.slide_drag
    }

    #[cfg(test)]
    pub fn edge_pan_running(&self) -> bool {
        self.edge_pan.is_running()
    }

    /// Feed one event. Returns `true` when the event was consumed and the toolkit's
    /// default handling should be suppressed.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        nav: &mut NavigationState,
        registry: &mut SlideRegistry,
    ) -> bool {
        match *event {
            InputEvent::ModifiersChanged(modifiers) => {
                self.on_modifiers(modifiers, nav);
                false
            }
            InputEvent::PointerDown { pos, time } => {
                self.on_click(time, nav, registry);
                self.track_hover(pos, nav, registry);
                self.begin_drags(pos, nav, registry);
                false
            }
            InputEvent::PointerMoved { pos, time } => {
                self.update_edge_pan(pos, nav, time);
                self.track_hover(pos, nav, registry);
                self.continue_drags(pos, nav, registry);
                false
            }
            InputEvent::PointerUp { .. } => {
                self.camera_pan.release();
                self.slide_drag.release();
                false
            }
            InputEvent::Wheel { delta_y } => self.on_wheel(delta_y, nav),
            InputEvent::KeyDown(key) => self.on_key(key.action(), nav, registry),
        }
    }

    /// Fire due edge-pan ticks. Returns whether the timer is still running so the
    /// surface knows to schedule another frame.
    pub fn tick(&mut self, now: f64, nav: &mut NavigationState) -> bool {
        let ticks = self.edge_pan.poll(now, self.config.tick_rate);
        for _ in 0..ticks {
            let camera = nav.camera();
            let step = self.edge_pan.movement() * (self.config.max_per_tick() / camera.scale);
            nav.set_camera(camera.panned(step));
        }
        self.edge_pan.is_running()
    }

    fn on_modifiers(&mut self, modifiers: Modifiers, nav: &NavigationState) {
        self.camera_pan.set_modifier(modifiers.command);
        self.slide_drag
            .set_modifier(modifiers.shift && nav.mode == Mode::Editor);
    }

    fn pointer_on_plane(&self, pos: Point, nav: &NavigationState) -> Vector2 {
        screen_to_plane(pos, self.window, nav.camera().scale)
    }

    fn begin_drags(&mut self, pos: Point, nav: &NavigationState, registry: &SlideRegistry) {
        if self.window.is_empty() {
            return;
        }
        let on_plane = self.pointer_on_plane(pos, nav);

        if self.camera_pan.is_armed() {
            self.camera_pan.begin(on_plane, ());
        }

        if self.slide_drag.is_armed() && nav.mode == Mode::Editor {
            let absolute = on_plane + nav.camera().offset;
            match registry.hit_test(absolute, self.frame) {
                Some(slide) => {
                    debug!(slide = %slide.id, "Slide drag started");
                    self.slide_drag.begin(absolute, slide.id.clone());
                }
                None => debug!("Slide drag missed every slide"),
            }
        }
    }

    fn continue_drags(
        &mut self,
        pos: Point,
        nav: &mut NavigationState,
        registry: &mut SlideRegistry,
    ) {
        if self.window.is_empty() {
            return;
        }
        let on_plane = self.pointer_on_plane(pos, nav);

        if let Some((delta, ())) = self.camera_pan.advance(on_plane) {
            nav.pan_camera(-delta);
        }

        let absolute = on_plane + nav.camera().offset;
        if let Some((delta, id)) = self.slide_drag.advance(absolute) {
            if let Some(slide) = registry.get_mut(id) {
                slide.offset += delta;
                // Offset changes alone do not invalidate the surface layout.
                nav.refresh_camera();
            }
        }
    }

    fn on_click(&mut self, time: f64, nav: &mut NavigationState, registry: &SlideRegistry) {
        if nav.input_focus != InputFocus::Surface || !nav.double_click_free_roam {
            return;
        }

        let is_double = self
            .last_click
            .is_some_and(|last| time - last < self.config.double_click_interval);

        if is_double {
            self.last_click = None;
            self.toggle_free_roam(time, nav, registry);
        } else {
            self.last_click = Some(time);
        }
    }

    fn toggle_free_roam(&mut self, time: f64, nav: &mut NavigationState, registry: &SlideRegistry) {
        let free_roam = nav.toggle_free_roam();
        self.edge_pan.sync(free_roam, time);
        if !free_roam {
            if let Some(slide) = nav.hovered_slide.take() {
                nav.move_to_slide(&slide, registry);
            }
        }
    }

    fn track_hover(&mut self, pos: Point, nav: &mut NavigationState, registry: &SlideRegistry) {
        if !nav.free_roam || self.window.is_empty() {
            return;
        }
        let absolute = self.pointer_on_plane(pos, nav) + nav.camera().offset;
        nav.hovered_slide = registry
            .hit_test(absolute, self.frame)
            .map(|slide| slide.id.clone());
    }

    fn update_edge_pan(&mut self, pos: Point, nav: &NavigationState, time: f64) {
        let movement = movement_vector(
            pos,
            self.window,
            self.config.edge_threshold,
            self.config.max_per_tick(),
        );
        self.edge_pan.set_movement(movement);
        self.edge_pan.sync(nav.free_roam, time);
    }

    fn on_wheel(&mut self, delta_y: f64, nav: &mut NavigationState) -> bool {
        if !nav.free_roam {
            return false;
        }
        let camera = nav.camera();
        let scale = (camera.scale + delta_y / self.config.wheel_divisor).max(MIN_ZOOM_SCALE);
        nav.set_camera(camera.with_scale(scale));
        true
    }

    fn on_key(
        &mut self,
        action: KeyAction,
        nav: &mut NavigationState,
        registry: &mut SlideRegistry,
    ) -> bool {
        if action == KeyAction::Escape {
            return self.on_escape(nav);
        }
        if nav.input_focus != InputFocus::Surface {
            return false;
        }

        match action {
            KeyAction::Next => {
                if let Err(e) = nav.advance(registry) {
                    warn!("Cannot advance: {e}");
                }
            }
            KeyAction::Previous => {
                if let Err(e) = nav.retreat(registry) {
                    warn!("Cannot go back: {e}");
                }
            }
            KeyAction::ZoomOut => {
                let zoomed = nav.camera().zoomed_out();
                nav.set_camera(zoomed.with_scale(zoomed.scale.max(MIN_ZOOM_SCALE)));
            }
            KeyAction::ZoomIn => nav.set_camera(nav.camera().zoomed_in()),
            KeyAction::Escape => {}
        }
        true
    }

    fn on_escape(&mut self, nav: &mut NavigationState) -> bool {
        if nav.free_roam {
            nav.toggle_free_roam();
            nav.hovered_slide = None;
            self.edge_pan.stop();
            true
        } else if nav.input_focus == InputFocus::Elsewhere {
            nav.input_focus = InputFocus::Surface;
            true
        } else {
            false
        }
    }
}
