//! Free-roam edge panning.
//!
//! A fixed-rate timer instead of a display-synced loop; it is polled from the UI
//! thread on every frame and reports how many ticks elapsed since the last poll.

use crate::geometry::{Point, Size, Vector2};

/// Per-tick movement for a pointer at `pos` in a window of `window` pixels.
///
/// The pointer's distance from the center is taken as a fraction of half the window
/// on each axis. Anything inside `threshold` is dead zone; beyond it, speed grows
/// linearly up to `max_per_tick` at the window edge.
pub fn movement_vector(pos: Point, window: Size, threshold: f64, max_per_tick: f64) -> Vector2 {
    if window.is_empty() {
        return Vector2::ZERO;
    }
    let half = window / 2.0;
    let from_center = Vector2::new(
        (pos.x - half.width) / half.width,
        (pos.y - half.height) / half.height,
    )
    .inverted_dy();

    let axis = |d: f64| {
        let past = (d.abs() - threshold).max(0.0) / (1.0 - threshold);
        let sign = if d > 0.0 { 1.0 } else { -1.0 };
        sign * past * max_per_tick
    };

    Vector2::new(axis(from_center.dx), axis(from_center.dy))
}

/// Repeating timer that only runs while free roam is on and the pointer sits past
/// the edge threshold.
#[derive(Debug, Clone, Default)]
pub struct EdgePanTimer {
    movement: Vector2,
    started_at: Option<f64>,
    ticks_fired: u64,
}

impl EdgePanTimer {
    pub fn movement(&self) -> Vector2 {
        self.movement
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Store the latest movement vector. Call [`EdgePanTimer::sync`] afterwards.
    pub fn set_movement(&mut self, movement: Vector2) {
        self.movement = movement;
    }

    /// Start the timer if it should run and is not running yet; stop it at once if
    /// it should not run.
    pub fn sync(&mut self, free_roam: bool, now: f64) {
        if !free_roam || self.movement.is_zero() {
            self.stop();
        } else if self.started_at.is_none() {
            self.started_at = Some(now);
            self.ticks_fired = 0;
        }
    }

    pub fn stop(&mut self) {
        self.started_at = None;
        self.ticks_fired = 0;
    }

    /// Ticks due at `now` that were not reported yet.
    pub fn poll(&mut self, now: f64, tick_rate: f64) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let elapsed = (now - start).max(0.0);
        // Truncation is intended: only whole ticks fire.
        let due = (elapsed * tick_rate).floor() as u64;
        let fresh = due.saturating_sub(self.ticks_fired);
        self.ticks_fired = due.max(self.ticks_fired);
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::{approx_eq, vec_approx_eq};

    const WINDOW: Size = Size::new(800.0, 600.0);
    const MAX: f64 = 5.0 / 24.0;

    #[test]
    fn test_center_is_dead_zone() {
        assert!(movement_vector(Point::new(400.0, 300.0), WINDOW, 0.25, MAX).is_zero());
        // Just inside the threshold on both axes.
        assert!(movement_vector(Point::new(450.0, 337.5), WINDOW, 0.25, MAX).is_zero());
    }

    #[test]
    fn test_edges_reach_max_speed() {
        let right = movement_vector(Point::new(800.0, 300.0), WINDOW, 0.25, MAX);
        assert!(approx_eq(right.dx, MAX));
        assert!(approx_eq(right.dy, 0.0));

        // Top of the window moves the camera up the plane.
        let top = movement_vector(Point::new(400.0, 0.0), WINDOW, 0.25, MAX);
        assert!(vec_approx_eq(top, Vector2::new(0.0, MAX)));

        let bottom_left = movement_vector(Point::new(0.0, 600.0), WINDOW, 0.25, MAX);
        assert!(vec_approx_eq(bottom_left, Vector2::new(-MAX, -MAX)));
    }

    #[test]
    fn test_speed_is_linear_past_threshold() {
        // Halfway between the threshold (0.25) and the edge.
        let v = movement_vector(Point::new(400.0 + 0.625 * 400.0, 300.0), WINDOW, 0.25, MAX);
        assert!(approx_eq(v.dx, MAX / 2.0));
    }

    #[test]
    fn test_empty_window_never_moves() {
        assert!(movement_vector(Point::new(0.0, 0.0), Size::default(), 0.25, MAX).is_zero());
    }

    #[test]
    fn test_timer_runs_only_with_free_roam_and_movement() {
        let mut timer = EdgePanTimer::default();
        timer.set_movement(Vector2::new(0.1, 0.0));
        timer.sync(false, 0.0);
        assert!(!timer.is_running());
        timer.sync(true, 0.0);
        assert!(timer.is_running());
        timer.set_movement(Vector2::ZERO);
        timer.sync(true, 0.1);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_poll_reports_whole_ticks_once() {
        let mut timer = EdgePanTimer::default();
        timer.set_movement(Vector2::new(0.1, 0.0));
        timer.sync(true, 10.0);
        assert_eq!(timer.poll(10.0, 24.0), 0);
        assert_eq!(timer.poll(10.03, 24.0), 0);
        assert_eq!(timer.poll(10.05, 24.0), 1);
        assert_eq!(timer.poll(10.05, 24.0), 0);
        assert_eq!(timer.poll(11.0, 24.0), 23);
    }

    #[test]
    fn test_restart_does_not_reset_running_timer() {
        let mut timer = EdgePanTimer::default();
        timer.set_movement(Vector2::new(0.1, 0.0));
        timer.sync(true, 0.0);
        timer.sync(true, 0.5);
        assert_eq!(timer.poll(0.5, 24.0), 12);
    }

    #[test]
    fn test_stopped_timer_polls_nothing() {
        let mut timer = EdgePanTimer::default();
        assert_eq!(timer.poll(100.0, 24.0), 0);
    }
}
