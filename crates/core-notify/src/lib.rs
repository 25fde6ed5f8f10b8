//! Transient notifications ("toasts").
//!
//! `ToastQueue` owns one tokio task that drains a FIFO of `(message, duration)`
//! requests. Each toast is shown, held for its duration, then faded out in
//! fixed steps before the next one starts, so at most one toast is ever
//! visible. Callers enqueue through `ToastSender`, which never blocks and
//! never fails: once the consumer is gone, requests are logged and dropped.

use core_events::{CHANNEL_SEND_FAILURES, Event, ToastFrame};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(1000);

/// Fire-and-forget message display.
pub trait NotificationService {
    fn show(&self, message: &str, duration: Duration);

    fn show_default(&self, message: &str) {
        self.show(message, DEFAULT_DURATION);
    }
}

/// Where toast frames end up (a terminal row, a test recorder, ...).
///
/// `show` and `hide` bracket a toast and must reach the display; the queue
/// awaits them. `fade` frames are cosmetic and may be dropped.
pub trait ToastDisplay: Send + 'static {
    fn show(&mut self, message: &str) -> impl Future<Output = ()> + Send;
    fn fade(&mut self, opacity: f32, offset: u16);
    fn hide(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fade-out pacing: every `step` the opacity drops by `opacity_step` and the
/// toast drifts one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeConfig {
    pub step: Duration,
    pub opacity_step: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(20),
            opacity_step: 0.05,
        }
    }
}

#[derive(Debug)]
enum Request {
    Toast { message: String, duration: Duration },
    Close,
}

/// Cloneable enqueue handle.
#[derive(Debug, Clone)]
pub struct ToastSender {
    tx: UnboundedSender<Request>,
}

impl NotificationService for ToastSender {
    fn show(&self, message: &str, duration: Duration) {
        let request = Request::Toast {
            message: message.to_string(),
            duration,
        };
        if self.tx.send(request).is_err() {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            warn!(target: "notify", len = message.len(), "toast_dropped_queue_closed");
        }
    }
}

pub struct ToastQueue {
    sender: ToastSender,
    handle: JoinHandle<()>,
}

impl ToastQueue {
    /// Start the consumer task. Must be called inside a tokio runtime.
    pub fn spawn<D: ToastDisplay>(display: D, fade: FadeConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(rx, display, fade));
        Self {
            sender: ToastSender { tx },
            handle,
        }
    }

    pub fn sender(&self) -> ToastSender {
        self.sender.clone()
    }

    /// Let already queued toasts play out, then stop the task.
    pub async fn shutdown(self) {
        let _ = self.sender.tx.send(Request::Close);
        if let Err(e) = self.handle.await {
            warn!(target: "notify", error = %e, "toast_task_join_failed");
        }
    }
}

impl NotificationService for ToastQueue {
    fn show(&self, message: &str, duration: Duration) {
        self.sender.show(message, duration);
    }
}

async fn run<D: ToastDisplay>(
    mut rx: UnboundedReceiver<Request>,
    mut display: D,
    fade: FadeConfig,
) {
    info!(target: "notify", "toast_task_started");
    let mut shown = 0u64;
    while let Some(request) = rx.recv().await {
        match request {
            Request::Toast { message, duration } => {
                play(&mut display, &message, duration, fade).await;
                shown += 1;
            }
            Request::Close => break,
        }
    }
    info!(target: "notify", shown, "toast_task_stopped");
}

async fn play<D: ToastDisplay>(
    display: &mut D,
    message: &str,
    duration: Duration,
    fade: FadeConfig,
) {
    debug!(target: "notify", len = message.len(), duration_ms = duration.as_millis() as u64, "toast_show");
    display.show(message).await;
    tokio::time::sleep(duration).await;

    let opacity_step = if fade.opacity_step > 0.0 {
        fade.opacity_step
    } else {
        1.0
    };
    let mut frame: u16 = 0;
    loop {
        tokio::time::sleep(fade.step).await;
        frame = frame.saturating_add(1);
        let opacity = 1.0 - f32::from(frame) * opacity_step;
        if opacity < 0.0 {
            break;
        }
        display.fade(opacity, frame);
    }
    trace!(target: "notify", frames = frame, "toast_hide");
    display.hide().await;
}

/// Forwards frames into the host event loop channel.
#[derive(Debug, Clone)]
pub struct EventDisplay {
    tx: mpsc::Sender<Event>,
}

impl EventDisplay {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Waits for room in the host channel. Fails only once the host loop
    /// has stopped receiving.
    async fn deliver(&self, frame: ToastFrame) {
        if let Err(e) = self.tx.send(Event::Toast(frame)).await {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            debug!(target: "notify", error = %e, "toast_frame_undeliverable");
        }
    }
}

impl ToastDisplay for EventDisplay {
    async fn show(&mut self, message: &str) {
        self.deliver(ToastFrame::Show(message.to_string())).await;
    }

    fn fade(&mut self, opacity: f32, offset: u16) {
        // A full channel only costs one fade frame.
        let frame = ToastFrame::Fade { opacity, offset };
        if let Err(e) = self.tx.try_send(Event::Toast(frame)) {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            trace!(target: "notify", error = %e, "fade_frame_dropped");
        }
    }

    async fn hide(&mut self) {
        self.deliver(ToastFrame::Hide).await;
    }
}
