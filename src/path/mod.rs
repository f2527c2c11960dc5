//! Fixed-tick playback along a precomputed path.
//!
//! The path arrives pre-interpolated at uniform spacing; this module only
//! walks it. Each tick advances a cursor by one point, updates the movable
//! overlay object, and asks the host camera to ease to the same point. The
//! tick period equals the ease duration, so successive camera motions run
//! back-to-back without queuing up.

use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::Instant;

/// Default tick period and camera ease duration.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(300);

/// One point of a precomputed path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Geographic position (`x` = lon, `y` = lat, degrees).
    pub coord: Coord<f64>,
    /// Altitude in meters; zero for ground-level paths.
    #[serde(default)]
    pub altitude: f64,
}

impl PathPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            coord: Coord { x: lng, y: lat },
            altitude: 0.0,
        }
    }
}

impl From<Coord<f64>> for PathPoint {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            coord,
            altitude: 0.0,
        }
    }
}

/// Callback fired once per tick.
pub type TickFn = Box<dyn FnMut(&PathPoint)>;

/// Drives a cursor along a path on a fixed-period timer.
///
/// Per due tick, `on_tick` fires first (move the overlay object), then
/// `on_ease` (move the host camera), and the cursor advances by one.
/// Exhausting the path cancels the timer, a terminal state. [`stop`]
/// cancels early; the owning layer calls it on detach so a tick can never
/// touch a torn-down scene.
///
/// [`stop`]: Self::stop
pub struct PathAnimator {
    points: Vec<PathPoint>,
    cursor: usize,
    period: Duration,
    next_due: Option<Instant>,
    on_tick: TickFn,
    on_ease: TickFn,
}

impl PathAnimator {
    pub fn new(points: Vec<PathPoint>, period: Duration, on_tick: TickFn, on_ease: TickFn) -> Self {
        Self {
            points,
            cursor: 0,
            period,
            next_due: None,
            on_tick,
            on_ease,
        }
    }

    /// Arms the timer; the first tick fires one period after `now`.
    ///
    /// Starting an empty or already-exhausted path is a no-op.
    pub fn start(&mut self, now: Instant) {
        if self.cursor < self.points.len() {
            self.next_due = Some(now + self.period);
        }
    }

    /// Cancels the timer. Idempotent; the cursor keeps its position.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Fires at most one due tick.
    ///
    /// Called from the frame loop. Re-arms relative to `now` rather than the
    /// missed deadline, so a stalled host never causes a burst of catch-up
    /// ticks and eases never overlap.
    pub fn update(&mut self, now: Instant) {
        let Some(due) = self.next_due else {
            return;
        };
        if now < due {
            return;
        }

        // cursor < len holds whenever the timer is armed.
        let point = self.points[self.cursor];
        (self.on_tick)(&point);
        (self.on_ease)(&point);
        self.cursor += 1;

        if self.cursor == self.points.len() {
            log::debug!("path playback complete after {} ticks", self.cursor);
            self.next_due = None;
        } else {
            self.next_due = Some(now + self.period);
        }
    }

    /// True while the timer is armed.
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Index of the next point to play.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const PERIOD: Duration = Duration::from_millis(300);

    struct Recorded {
        ticks: Vec<usize>,
        eases: Vec<usize>,
    }

    fn animator_over(count: usize) -> (PathAnimator, Rc<RefCell<Recorded>>) {
        let points: Vec<PathPoint> = (0..count)
            .map(|i| PathPoint::new(i as f64, i as f64))
            .collect();
        let recorded = Rc::new(RefCell::new(Recorded {
            ticks: Vec::new(),
            eases: Vec::new(),
        }));

        let tick_log = Rc::clone(&recorded);
        let ease_log = Rc::clone(&recorded);
        let animator = PathAnimator::new(
            points,
            PERIOD,
            Box::new(move |point| tick_log.borrow_mut().ticks.push(point.coord.x as usize)),
            Box::new(move |point| ease_log.borrow_mut().eases.push(point.coord.x as usize)),
        );
        (animator, recorded)
    }

    #[test]
    fn test_every_point_ticks_exactly_once_in_order() {
        let (mut animator, recorded) = animator_over(4);
        let start = Instant::now();
        animator.start(start);

        let mut now = start;
        for _ in 0..10 {
            now += PERIOD;
            animator.update(now);
        }

        let recorded = recorded.borrow();
        assert_eq!(recorded.ticks, vec![0, 1, 2, 3]);
        assert_eq!(recorded.eases, vec![0, 1, 2, 3]);
        assert!(!animator.is_active());
        assert_eq!(animator.cursor(), 4);
    }

    #[test]
    fn test_tick_waits_for_the_period() {
        let (mut animator, recorded) = animator_over(3);
        let start = Instant::now();
        animator.start(start);

        // Not due yet: nothing fires however often the frame loop polls.
        animator.update(start);
        animator.update(start + PERIOD / 2);
        assert!(recorded.borrow().ticks.is_empty());

        animator.update(start + PERIOD);
        assert_eq!(recorded.borrow().ticks, vec![0]);

        // One tick per due period, even when polled repeatedly.
        animator.update(start + PERIOD);
        assert_eq!(recorded.borrow().ticks, vec![0]);
    }

    #[test]
    fn test_stop_during_playback_prevents_further_ticks() {
        let (mut animator, recorded) = animator_over(5);
        let start = Instant::now();
        animator.start(start);

        let mut now = start;
        for _ in 0..2 {
            now += PERIOD;
            animator.update(now);
        }
        assert_eq!(recorded.borrow().ticks.len(), 2);

        animator.stop();
        for _ in 0..5 {
            now += PERIOD;
            animator.update(now);
        }

        assert_eq!(recorded.borrow().ticks.len(), 2);
        assert_eq!(recorded.borrow().eases.len(), 2);
        assert!(!animator.is_active());
        assert_eq!(animator.cursor(), 2);
    }

    #[test]
    fn test_exhaustion_is_terminal_and_idempotent() {
        let (mut animator, recorded) = animator_over(1);
        let start = Instant::now();
        animator.start(start);

        animator.update(start + PERIOD);
        assert!(!animator.is_active());

        // Restarting or polling an exhausted path does nothing.
        animator.start(start + 2 * PERIOD);
        assert!(!animator.is_active());
        animator.update(start + 3 * PERIOD);
        assert_eq!(recorded.borrow().ticks, vec![0]);
    }

    #[test]
    fn test_empty_path_never_activates() {
        let (mut animator, recorded) = animator_over(0);
        animator.start(Instant::now());
        assert!(!animator.is_active());
        animator.update(Instant::now() + PERIOD);
        assert!(recorded.borrow().ticks.is_empty());
    }

    #[test]
    fn test_stall_fires_single_catch_up_tick() {
        let (mut animator, recorded) = animator_over(5);
        let start = Instant::now();
        animator.start(start);

        // Host stalled for many periods; only one tick fires, re-armed
        // relative to now.
        animator.update(start + 10 * PERIOD);
        assert_eq!(recorded.borrow().ticks, vec![0]);
        assert!(animator.is_active());
    }
}
