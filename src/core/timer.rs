//=========================================================================
// Timer
//=========================================================================
//
// Fixed-step tick driver.
//
// Architecture:
//   host loop ──advance(now)──> accumulator ──N × step──> tick callbacks
//   headless  ──step()──────────────────────────────────> tick callbacks
//
// With autostart the timer begins ticking when KERNEL_START is emitted.
// Catch-up is bounded by `max_steps_per_frame`; any backlog beyond it is
// dropped so a stalled host does not trigger a spiral of updates.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::config::{step_for_rate, TimerConfig};
use crate::core::event::KERNEL_START;
use crate::core::kernel::Kernel;

//=== Frame ===============================================================

/// A single fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based index since the timer was created.
    pub index: u64,

    /// Fixed duration of the step.
    pub delta: Duration,
}

//=== TimerOptions ========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TimerOptions {
    pub autostart: bool,
    pub tps: f64,
    pub max_steps_per_frame: usize,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self::from(&TimerConfig::default())
    }
}

impl From<&TimerConfig> for TimerOptions {
    fn from(config: &TimerConfig) -> Self {
        Self {
            autostart: config.autostart,
            tps: config.tps,
            max_steps_per_frame: config.max_steps_per_frame,
        }
    }
}

//=== Timer ===============================================================

type TickCallback = Rc<dyn Fn(&Frame)>;

struct TimerState {
    /// Fixed step, `1 / tps`.
    step: Duration,

    /// Catch-up limit per `advance`.
    max_steps: usize,

    running: Cell<bool>,

    /// Elapsed time not yet consumed by steps.
    accumulator: Cell<Duration>,

    /// `None` until the first `advance` after `start`.
    last_advance: Cell<Option<Instant>>,

    frames: Cell<u64>,
    callbacks: RefCell<Vec<TickCallback>>,
}

/// Recurring tick driver bound to a kernel.
///
/// Clones share the same timer.
#[derive(Clone)]
pub struct Timer {
    state: Rc<TimerState>,
}

impl Timer {
    /// Creates a timer.
    ///
    /// # Panics
    ///
    /// Panics if `tps` has no representable non-zero step or
    /// `max_steps_per_frame == 0`. Validated configuration never contains
    /// either.
    pub fn new(kernel: &Kernel, options: TimerOptions) -> Self {
        let Some(step) = step_for_rate(options.tps) else {
            panic!("TPS must be positive with a representable step, got {}", options.tps);
        };
        assert!(options.max_steps_per_frame > 0, "Step limit must be positive");

        let timer = Self {
            state: Rc::new(TimerState {
                step,
                max_steps: options.max_steps_per_frame,
                running: Cell::new(false),
                accumulator: Cell::new(Duration::ZERO),
                last_advance: Cell::new(None),
                frames: Cell::new(0),
                callbacks: RefCell::new(Vec::new()),
            }),
        };

        if options.autostart {
            let weak: Weak<TimerState> = Rc::downgrade(&timer.state);
            kernel.events().on(KERNEL_START, move |_| {
                if let Some(state) = weak.upgrade() {
                    Timer { state }.start();
                }
                Ok(())
            });
        }

        debug!(
            target: "timer",
            "Timer created ({} TPS, autostart: {})",
            options.tps,
            options.autostart
        );

        timer
    }

    //--- Control ----------------------------------------------------------

    pub fn start(&self) {
        if self.state.running.replace(true) {
            return;
        }
        self.state.accumulator.set(Duration::ZERO);
        self.state.last_advance.set(None);
        debug!(target: "timer", "Timer started");
    }

    pub fn stop(&self) {
        if self.state.running.replace(false) {
            debug!(target: "timer", "Timer stopped after {} frame(s)", self.frames());
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    //--- Callbacks --------------------------------------------------------

    /// Registers a callback invoked on every step, in registration order.
    pub fn on_tick<F>(&self, callback: F)
    where
        F: Fn(&Frame) + 'static,
    {
        self.state.callbacks.borrow_mut().push(Rc::new(callback));
    }

    //--- Stepping ---------------------------------------------------------

    /// Runs the steps due since the previous call.
    ///
    /// The first call after `start()` only records the time. Returns the
    /// number of steps run.
    pub fn advance(&self, now: Instant) -> usize {
        if !self.is_running() {
            return 0;
        }

        let Some(last) = self.state.last_advance.replace(Some(now)) else {
            return 0;
        };

        let mut accumulator = self.state.accumulator.get() + now.saturating_duration_since(last);
        let mut steps = 0;

        while accumulator >= self.state.step && steps < self.state.max_steps {
            accumulator -= self.state.step;
            self.run_frame();
            steps += 1;
        }

        if accumulator >= self.state.step {
            warn!(
                target: "timer",
                "Timer fell behind, dropping {:?} of backlog",
                accumulator
            );
            accumulator = Duration::ZERO;
        }

        self.state.accumulator.set(accumulator);
        steps
    }

    /// Runs exactly one step if the timer is running.
    pub fn step(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.run_frame();
        true
    }

    fn run_frame(&self) {
        let frame = Frame {
            index: self.state.frames.get(),
            delta: self.state.step,
        };
        self.state.frames.set(frame.index + 1);

        // Snapshot so callbacks may register further callbacks.
        let callbacks: Vec<TickCallback> = self.state.callbacks.borrow().clone();
        for callback in callbacks {
            callback(&frame);
        }
    }

    //--- Query API --------------------------------------------------------

    /// Number of steps run so far.
    pub fn frames(&self) -> u64 {
        self.state.frames.get()
    }

    /// Fixed duration of one step.
    pub fn step_duration(&self) -> Duration {
        self.state.step
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("step", &self.state.step)
            .field("running", &self.is_running())
            .field("frames", &self.frames())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
