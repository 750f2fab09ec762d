//=========================================================================
// Scene Preload
//=========================================================================
//
// Completion signalling for a scene's preload hook.
//
// Flow:
//   Scene::start() → hook.preload(&mut Preload, ctx) → PreloadTask
//                                                          │
//   Scene::update() ───────────────────────poll()──────────┘
//
// A hook completes synchronously (`complete`), after a delay
// (`complete_after`, backed by a crossbeam timer channel), or from any
// thread through the sender returned by `complete_later`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

//=== PreloadStatus =======================================================

/// Status code reported by a preload hook. `200` means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreloadStatus(pub u16);

impl PreloadStatus {
    pub const OK: PreloadStatus = PreloadStatus(200);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }
}

impl From<u16> for PreloadStatus {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for PreloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//=== Preload =============================================================

enum Completion {
    Now(PreloadStatus),
    Timer {
        timer: Receiver<Instant>,
        status: PreloadStatus,
    },
    Channel(Receiver<PreloadStatus>),
}

/// Completion handle passed to a preload hook.
///
/// Only the last completion requested by the hook counts.
#[derive(Default)]
pub struct Preload {
    completion: Option<Completion>,
}

impl Preload {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Completes the preload immediately.
    pub fn complete(&mut self, status: u16) {
        self.completion = Some(Completion::Now(PreloadStatus(status)));
    }

    /// Completes the preload once `delay` has elapsed.
    pub fn complete_after(&mut self, delay: Duration, status: u16) {
        self.completion = Some(Completion::Timer {
            timer: after(delay),
            status: PreloadStatus(status),
        });
    }

    /// Returns a sender that completes the preload when a status is sent.
    ///
    /// Dropping the sender without sending cancels the preload.
    pub fn complete_later(&mut self) -> Sender<PreloadStatus> {
        let (tx, rx) = bounded(1);
        self.completion = Some(Completion::Channel(rx));
        tx
    }

    pub(crate) fn into_task(self) -> PreloadTask {
        let state = match self.completion {
            None => TaskState::Waiting(None),
            Some(Completion::Now(status)) => TaskState::Done(status),
            Some(other) => TaskState::Waiting(Some(other)),
        };
        PreloadTask { state }
    }
}

//=== PreloadTask =========================================================

/// Observed state of a preload task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPoll {
    Pending,
    Ready(PreloadStatus),
    Cancelled,
}

enum TaskState {
    /// `None` when the hook never requested completion.
    Waiting(Option<Completion>),
    Done(PreloadStatus),
    Cancelled,
}

/// Cancellable preload in progress.
pub struct PreloadTask {
    state: TaskState,
}

impl PreloadTask {
    /// Checks for completion without blocking.
    pub fn poll(&mut self) -> PreloadPoll {
        let next = match &self.state {
            TaskState::Done(status) => return PreloadPoll::Ready(*status),
            TaskState::Cancelled => return PreloadPoll::Cancelled,
            TaskState::Waiting(None) => return PreloadPoll::Pending,
            TaskState::Waiting(Some(Completion::Now(status))) => TaskState::Done(*status),
            TaskState::Waiting(Some(Completion::Timer { timer, status })) => {
                match timer.try_recv() {
                    Ok(_) => TaskState::Done(*status),
                    Err(_) => return PreloadPoll::Pending,
                }
            }
            TaskState::Waiting(Some(Completion::Channel(rx))) => match rx.try_recv() {
                Ok(status) => TaskState::Done(status),
                Err(TryRecvError::Empty) => return PreloadPoll::Pending,
                Err(TryRecvError::Disconnected) => TaskState::Cancelled,
            },
        };

        self.state = next;
        self.poll()
    }

    /// Blocks up to `timeout` for completion.
    pub fn wait_timeout(&mut self, timeout: Duration) -> PreloadPoll {
        let next = match &self.state {
            TaskState::Waiting(Some(Completion::Timer { timer, status })) => {
                match timer.recv_timeout(timeout) {
                    Ok(_) => TaskState::Done(*status),
                    Err(_) => return PreloadPoll::Pending,
                }
            }
            TaskState::Waiting(Some(Completion::Channel(rx))) => match rx.recv_timeout(timeout) {
                Ok(status) => TaskState::Done(status),
                Err(RecvTimeoutError::Timeout) => return PreloadPoll::Pending,
                Err(RecvTimeoutError::Disconnected) => TaskState::Cancelled,
            },
            _ => return self.poll(),
        };

        self.state = next;
        self.poll()
    }

    /// Cancels the task. A completed task stays completed.
    pub fn cancel(&mut self) -> bool {
        if let TaskState::Waiting(_) = self.state {
            self.state = TaskState::Cancelled;
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for PreloadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            TaskState::Waiting(_) => "waiting".to_string(),
            TaskState::Done(status) => format!("done({status})"),
            TaskState::Cancelled => "cancelled".to_string(),
        };
        f.debug_struct("PreloadTask").field("state", &state).finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn immediate_completion_is_ready() {
        let mut preload = Preload::new();
        preload.complete(200);

        let mut task = preload.into_task();
        assert_eq!(task.poll(), PreloadPoll::Ready(PreloadStatus::OK));
    }

    #[test]
    fn no_completion_stays_pending() {
        let mut task = Preload::new().into_task();
        assert_eq!(task.poll(), PreloadPoll::Pending);
        assert_eq!(task.wait_timeout(Duration::from_millis(1)), PreloadPoll::Pending);
    }

    #[test]
    fn timed_completion_fires_after_delay() {
        let mut preload = Preload::new();
        preload.complete_after(Duration::from_millis(20), 200);

        let mut task = preload.into_task();
        assert_eq!(task.poll(), PreloadPoll::Pending);
        assert_eq!(
            task.wait_timeout(Duration::from_secs(5)),
            PreloadPoll::Ready(PreloadStatus::OK)
        );
        // Completion sticks
        assert_eq!(task.poll(), PreloadPoll::Ready(PreloadStatus::OK));
    }

    #[test]
    fn completion_from_another_thread() {
        let mut preload = Preload::new();
        let sender = preload.complete_later();
        let mut task = preload.into_task();

        thread::spawn(move || {
            sender.send(PreloadStatus(404)).unwrap();
        });

        assert_eq!(
            task.wait_timeout(Duration::from_secs(5)),
            PreloadPoll::Ready(PreloadStatus(404))
        );
    }

    #[test]
    fn dropped_sender_cancels() {
        let mut preload = Preload::new();
        drop(preload.complete_later());

        let mut task = preload.into_task();
        assert_eq!(task.poll(), PreloadPoll::Cancelled);
    }

    #[test]
    fn cancel_stops_pending_task_only() {
        let mut preload = Preload::new();
        preload.complete_after(Duration::from_secs(60), 200);
        let mut task = preload.into_task();

        assert!(task.cancel());
        assert_eq!(task.poll(), PreloadPoll::Cancelled);

        let mut done = Preload::new();
        done.complete(200);
        let mut done = done.into_task();
        assert!(!done.cancel());
        assert_eq!(done.poll(), PreloadPoll::Ready(PreloadStatus::OK));
    }

    #[test]
    fn last_completion_wins() {
        let mut preload = Preload::new();
        preload.complete_after(Duration::from_secs(60), 200);
        preload.complete(500);

        let mut task = preload.into_task();
        assert_eq!(task.poll(), PreloadPoll::Ready(PreloadStatus(500)));
    }
}
