//! Background task pumping crossterm events into the host channel.

use crate::key_map::map_key_event;
use core_events::{CHANNEL_SEND_FAILURES, Event, InputEvent};
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task::{self, JoinHandle};
use tokio_stream::{Stream, StreamExt};
use tracing::{Instrument, info, trace, warn};

/// Handle the host keeps to stop the input task.
#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    fn pair() -> (Self, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        (
            Self {
                notify: Arc::clone(&notify),
            },
            notify,
        )
    }

    /// Ask the task to stop. A signal sent before the task polls is kept.
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

pub(crate) fn spawn_async_event_task(
    sender: Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, stop) = AsyncInputShutdown::pair();
    let span = tracing::debug_span!(target: "input.thread", "input_pump");
    let pump = InputPump::new(EventStream::new(), sender, stop);
    let handle = task::spawn(pump.run().instrument(span));
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StopReason {
    Signalled,
    ReceiverGone,
    StreamEnded,
    StreamFailed,
}

impl StopReason {
    fn label(self) -> &'static str {
        match self {
            StopReason::Signalled => "shutdown_signal",
            StopReason::ReceiverGone => "channel_closed",
            StopReason::StreamEnded => "stream_ended",
            StopReason::StreamFailed => "stream_error",
        }
    }
}

/// Owns the terminal event stream and forwards the events the editor
/// understands. Generic over the stream so tests can script it.
struct InputPump<S> {
    stream: S,
    sender: Sender<Event>,
    stop: Arc<Notify>,
}

impl<S> InputPump<S>
where
    S: Stream<Item = io::Result<CEvent>> + Unpin,
{
    fn new(stream: S, sender: Sender<Event>, stop: Arc<Notify>) -> Self {
        Self {
            stream,
            sender,
            stop,
        }
    }

    async fn run(mut self) {
        info!(target: "input.thread", "input_pump_started");
        let reason = self.pump().await;
        info!(target: "input.thread", reason = reason.label(), "input_pump_stopped");
    }

    async fn pump(&mut self) -> StopReason {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.stop.notified() => return StopReason::Signalled,
                next = self.stream.next() => next,
            };
            let event = match next {
                None => return StopReason::StreamEnded,
                Some(Err(err)) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "input_stream_error");
                    return StopReason::StreamFailed;
                }
                Some(Ok(raw)) => translate(raw),
            };
            let Some(event) = event else {
                continue;
            };
            if self.sender.send(event).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                return StopReason::ReceiverGone;
            }
        }
    }
}

fn translate(raw: CEvent) -> Option<Event> {
    match raw {
        CEvent::Key(key) => {
            let mapped = map_key_event(&key)?;
            // Typed characters stay out of logs.
            trace!(target: "input.event", kind = "keypress", mods = ?mapped.mods, chord = mapped.is_chord());
            Some(Event::Input(InputEvent::Key(mapped)))
        }
        CEvent::Resize(w, h) => {
            trace!(target: "input.event", w, h, "resize");
            Some(Event::Input(InputEvent::Resize(w, h)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyEvent, KeyModifiers};
    use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers as CMods};
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio::time::{Duration, timeout};
    use tokio_stream::wrappers::UnboundedReceiverStream;
    use tracing::subscriber::Interest;
    use tracing::{Metadata, Subscriber};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Captured {
        events: Arc<Mutex<Vec<LogLine>>>,
    }

    #[derive(Clone, Debug)]
    struct LogLine {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldRecorder {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldRecorder {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Captured
    where
        S: Subscriber,
    {
        fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
            Interest::always()
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldRecorder::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(LogLine {
                target: event.metadata().target().to_string(),
                fields: visitor.fields,
            });
        }
    }

    async fn run_scenario(events: Vec<CEvent>) -> Vec<Event> {
        let (tx, mut rx) = mpsc::channel(64);
        let stream = tokio_stream::iter(events.into_iter().map(Ok));
        let (_shutdown, stop) = AsyncInputShutdown::pair();
        InputPump::new(stream, tx, stop).run().await;

        let mut outputs = Vec::new();
        while let Some(evt) = rx.recv().await {
            outputs.push(evt);
        }
        outputs
    }

    #[tokio::test]
    async fn forwards_keys_and_resizes_in_order() {
        let outputs = run_scenario(vec![
            CEvent::Key(CKeyEvent::new(CKeyCode::Char('a'), CMods::NONE)),
            CEvent::Resize(120, 48),
            CEvent::Key(CKeyEvent::new(CKeyCode::Char('s'), CMods::CONTROL)),
        ])
        .await;
        assert_eq!(
            outputs,
            vec![
                Event::Input(InputEvent::Key(KeyEvent::plain(KeyCode::Char('a')))),
                Event::Input(InputEvent::Resize(120, 48)),
                Event::Input(InputEvent::Key(KeyEvent::new(
                    KeyCode::Char('s'),
                    KeyModifiers::CTRL
                ))),
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_events_are_skipped() {
        let outputs = run_scenario(vec![
            CEvent::FocusGained,
            CEvent::Key(CKeyEvent::new(CKeyCode::F(1), CMods::NONE)),
            CEvent::Key(CKeyEvent::new(CKeyCode::Enter, CMods::NONE)),
        ])
        .await;
        assert_eq!(
            outputs,
            vec![Event::Input(InputEvent::Key(KeyEvent::plain(KeyCode::Enter)))]
        );
    }

    #[tokio::test]
    async fn keypress_logs_never_carry_the_character() {
        let capture = Captured::default();
        let events = capture.events.clone();
        let dispatch = tracing::Dispatch::new(Registry::default().with(capture));
        let _guard = tracing::dispatcher::set_default(&dispatch);

        run_scenario(vec![CEvent::Key(CKeyEvent::new(CKeyCode::Char('§'), CMods::NONE))]).await;

        let logged = events.lock().unwrap();
        let keypress = logged
            .iter()
            .find(|e| e.target == "input.event")
            .expect("missing input.event log");
        assert!(keypress.fields.iter().all(|(_, v)| !v.contains('§')));
    }

    #[tokio::test]
    async fn logs_stop_reason_when_channel_closes() {
        let capture = Captured::default();
        let events = capture.events.clone();
        let dispatch = tracing::Dispatch::new(Registry::default().with(capture));
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let before = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let stream = tokio_stream::iter(vec![Ok(CEvent::Resize(10, 10))]);
        let (_shutdown, stop) = AsyncInputShutdown::pair();
        InputPump::new(stream, tx, stop).run().await;

        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) > before);
        let logged = events.lock().unwrap();
        let stop = logged
            .iter()
            .find(|e| {
                e.fields
                    .iter()
                    .any(|(k, v)| k == "message" && v == "input_pump_stopped")
            })
            .expect("missing stop log");
        assert!(
            stop.fields
                .iter()
                .any(|(k, v)| k == "reason" && v.trim_matches('"') == "channel_closed")
        );
    }

    #[tokio::test]
    async fn stream_error_stops_the_task() {
        let outputs = run_scenario_results(vec![
            Err(io::Error::other("tty gone")),
            Ok(CEvent::Resize(1, 1)),
        ])
        .await;
        assert!(outputs.is_empty());
    }

    async fn run_scenario_results(events: Vec<io::Result<CEvent>>) -> Vec<Event> {
        let (tx, mut rx) = mpsc::channel(8);
        let (_shutdown, stop) = AsyncInputShutdown::pair();
        InputPump::new(tokio_stream::iter(events), tx, stop).run().await;
        let mut outputs = Vec::new();
        while let Some(evt) = rx.recv().await {
            outputs.push(evt);
        }
        outputs
    }

    #[tokio::test]
    async fn shutdown_signal_exits_immediately() {
        let (tx, mut rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<io::Result<CEvent>>();
        let stream = UnboundedReceiverStream::new(event_rx);
        let (shutdown, stop) = AsyncInputShutdown::pair();

        let task = tokio::spawn(async move {
            let _keep_alive = event_tx;
            InputPump::new(stream, tx, stop).run().await;
        });

        shutdown.signal();

        timeout(Duration::from_millis(50), task)
            .await
            .expect("shutdown should resolve promptly")
            .expect("task join failed");

        assert!(rx.recv().await.is_none());
    }
}
