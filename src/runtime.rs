//! Frame scheduling for the marker animation.
//!
//! A [`FrameScheduler`] runs a callback before the next repaint, handing it
//! a millisecond timestamp. [`start_frame_loop`] builds a self-rescheduling
//! loop on top of any scheduler and returns an [`AnimationHandle`] that stops
//! it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Callback run once with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// "Run this before the next repaint"
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}

/// Handle to a running frame loop
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the loop; the next scheduled frame becomes a no-op
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            log::debug!("Animation loop cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs `on_frame(0.0)` right away, then once per frame the scheduler
/// delivers, until the returned handle is cancelled.
pub fn start_frame_loop<S, F>(scheduler: Rc<S>, on_frame: F) -> AnimationHandle
where
    S: FrameScheduler + ?Sized + 'static,
    F: FnMut(f64) + 'static,
{
    let handle = AnimationHandle::new();
    start_frame_loop_with_handle(scheduler, handle.clone(), on_frame);
    handle
}

/// Like [`start_frame_loop`], but stops on a handle the caller already holds.
/// Nothing runs if it was cancelled before the start.
pub fn start_frame_loop_with_handle<S, F>(scheduler: Rc<S>, handle: AnimationHandle, on_frame: F)
where
    S: FrameScheduler + ?Sized + 'static,
    F: FnMut(f64) + 'static,
{
    run_frame(scheduler, Rc::new(RefCell::new(on_frame)), handle, 0.0);
}

fn run_frame<S, F>(scheduler: Rc<S>, on_frame: Rc<RefCell<F>>, handle: AnimationHandle, timestamp: f64)
where
    S: FrameScheduler + ?Sized + 'static,
    F: FnMut(f64) + 'static,
{
    if handle.is_cancelled() {
        return;
    }
    (on_frame.borrow_mut())(timestamp);
    if handle.is_cancelled() {
        return;
    }

    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move |timestamp| {
        run_frame(next, on_frame, handle, timestamp)
    }));
}

/// Scheduler driven by the host: callbacks queue up until
/// [`run_frame`](ManualFrameScheduler::run_frame) is called.
#[derive(Default)]
pub struct ManualFrameScheduler {
    pending: RefCell<VecDeque<FrameCallback>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every callback queued before this call with `timestamp`.
    /// Callbacks they request wait for the next frame. Returns how many ran.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        let due: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let count = due.len();
        for callback in due {
            callback(timestamp);
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push_back(callback);
    }
}

/// Calls `on_frame` at a fixed rate until `handle` is cancelled.
/// Timestamps are milliseconds since the loop started, the first one being 0.
#[cfg(feature = "tokio-runtime")]
pub async fn run_interval_frames<F>(fps: u32, handle: AnimationHandle, mut on_frame: F) -> u64
where
    F: FnMut(f64),
{
    let period = std::time::Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let started = instant::Instant::now();
    let mut frames = 0;

    loop {
        interval.tick().await;
        if handle.is_cancelled() {
            break;
        }
        let timestamp = if frames == 0 {
            0.0
        } else {
            started.elapsed().as_secs_f64() * 1000.0
        };
        on_frame(timestamp);
        frames += 1;
    }

    log::info!("Interval frame loop stopped after {} frames", frames);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_runs_synchronously() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let _handle = start_frame_loop(scheduler.clone(), move |t| sink.borrow_mut().push(t));

        assert_eq!(*seen.borrow(), vec![0.0]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_loop_reschedules_every_frame() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _handle = start_frame_loop(scheduler.clone(), move |t| sink.borrow_mut().push(t));

        for t in [16.0, 33.0, 50.0] {
            assert_eq!(scheduler.run_frame(t), 1);
        }
        assert_eq!(*seen.borrow(), vec![0.0, 16.0, 33.0, 50.0]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancel_stops_rescheduling() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let handle = start_frame_loop(scheduler.clone(), move |_| *counter.borrow_mut() += 1);

        scheduler.run_frame(16.0);
        handle.cancel();
        scheduler.run_frame(33.0);
        scheduler.run_frame(50.0);

        assert_eq!(*count.borrow(), 2);
        assert_eq!(scheduler.pending(), 0);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_cancel_from_inside_a_frame() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let handle_slot: Rc<RefCell<Option<AnimationHandle>>> = Rc::new(RefCell::new(None));
        let slot = handle_slot.clone();
        let handle = start_frame_loop(scheduler.clone(), move |t| {
            if t >= 1000.0 {
                if let Some(handle) = slot.borrow().as_ref() {
                    handle.cancel();
                }
            }
        });
        *handle_slot.borrow_mut() = Some(handle);

        scheduler.run_frame(500.0);
        scheduler.run_frame(1000.0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_handle_cancelled_before_start() {
        let scheduler = Rc::new(ManualFrameScheduler::new());
        let handle = AnimationHandle::new();
        handle.cancel();
        let ran = Rc::new(RefCell::new(false));
        let flag = ran.clone();
        start_frame_loop_with_handle(scheduler.clone(), handle, move |_| *flag.borrow_mut() = true);

        assert!(!*ran.borrow());
        assert_eq!(scheduler.pending(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_interval_frames_stop_on_cancel() {
        let handle = AnimationHandle::new();
        let stopper = handle.clone();
        let mut timestamps = Vec::new();

        let frames = run_interval_frames(200, handle, |t| {
            timestamps.push(t);
            if timestamps.len() == 3 {
                stopper.cancel();
            }
        })
        .await;

        assert_eq!(frames, 3);
        assert_eq!(timestamps[0], 0.0);
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
