//! tabpad entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{EditingSurface, SurfaceOptions};
use core_config::load_from;
use core_events::{EVENT_CHANNEL_CAP, Event, InputEvent, KeyEvent, ToastFrame};
use core_notify::{EventDisplay, FadeConfig, ToastQueue};
use core_storage::{DirectoryExporter, FileStore};
use core_terminal::{CrosstermBackend, TerminalBackend, TerminalGuard, window_title};
use core_text::display_col;
use native_input::NativeOutcome;
use status::StatusTracker;
use std::fmt;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use view::{Layout, ToastView, Viewport};

mod native_input;
mod status;
mod view;

type Surface = EditingSurface<FileStore, DirectoryExporter>;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tabpad", version, about = "Plain-text pad with tab-aware editing")]
struct Args {
    /// Optional configuration file path (overrides discovery of `tabpad.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Directory for the saved document (overrides `[storage] dir`).
    #[arg(long = "storage-dir")]
    pub storage_dir: Option<PathBuf>,
    /// Directory downloads are written to (overrides `[export] dir`).
    #[arg(long = "export-dir")]
    pub export_dir: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    config: core_config::Config,
    store: FileStore,
    exporter: DirectoryExporter,
    terminal_guard: TerminalGuard<'a>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn run<'a>(&'a mut self, args: &Args) -> Result<RuntimeContext<'a>> {
        self.configure_logging()?;
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let config = load_from(args.config.clone())?;
        let storage_dir = args
            .storage_dir
            .clone()
            .unwrap_or_else(|| config.storage_dir());
        let export_dir = args
            .export_dir
            .clone()
            .unwrap_or_else(|| config.export_dir());
        let store = FileStore::open(&storage_dir)
            .with_context(|| format!("opening store in {}", storage_dir.display()))?;
        let exporter = DirectoryExporter::new(export_dir);
        let config_path = config
            .source
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());
        info!(
            target: "runtime.startup",
            store = %store.path().display(),
            export = %exporter.dir().display(),
            config = config_path.as_deref(),
            "bootstrap_complete"
        );

        let terminal_guard = self.backend.enter_guard()?;
        Ok(RuntimeContext {
            config,
            store,
            exporter,
            terminal_guard,
        })
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("tabpad.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "tabpad.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        // Otherwise a global subscriber is already installed; dropping the
        // guard shuts our writer down.
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

enum LoopControl {
    Continue,
    Break { reason: ShutdownReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    Quit,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Quit => "quit",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

struct EditorRuntime<'a> {
    surface: Surface,
    status: StatusTracker,
    toast: ToastView,
    viewport: Viewport,
    size: (u16, u16),
    tab_width: usize,
    shown_title: Option<String>,
    rx: mpsc::Receiver<Event>,
    toasts: Option<ToastQueue>,
    input_task: Option<tokio::task::JoinHandle<()>>,
    input_shutdown: Option<core_input::AsyncInputShutdown>,
    terminal_guard: TerminalGuard<'a>,
}

impl<'a> EditorRuntime<'a> {
    fn new(
        context: RuntimeContext<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
    ) -> Self {
        let RuntimeContext {
            config,
            store,
            exporter,
            mut terminal_guard,
        } = context;

        let fade = FadeConfig {
            step: config.file.notify.fade_step(),
            opacity_step: config.file.notify.opacity_step,
        };
        let toasts = ToastQueue::spawn(EventDisplay::new(tx.clone()), fade);
        let mut surface = EditingSurface::with_options(
            store,
            exporter,
            Box::new(toasts.sender()),
            SurfaceOptions::from_config(&config),
        );
        let status = StatusTracker::default();
        surface.add_observer(Box::new(status.clone()));

        let (input_task, input_shutdown) = core_input::spawn_async_input(tx);
        let size = terminal_guard.backend().size().unwrap_or((80, 24));

        Self {
            surface,
            status,
            toast: ToastView::default(),
            viewport: Viewport::default(),
            size,
            tab_width: config.tab_width(),
            shown_title: None,
            rx,
            toasts: Some(toasts),
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            terminal_guard,
        }
    }

    async fn run(&mut self) -> Result<()> {
        self.render();

        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = match event {
                Event::Input(InputEvent::Key(key)) => self.handle_key(key),
                Event::Input(InputEvent::Resize(w, h)) => self.handle_resize(w, h),
                Event::Toast(frame) => self.handle_toast(frame),
                Event::Shutdown => LoopControl::Break {
                    reason: ShutdownReason::ShutdownEvent,
                },
            };
            match control {
                LoopControl::Break { reason } => {
                    shutdown_reason = reason;
                    break;
                }
                LoopControl::Continue => self.render(),
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> LoopControl {
        if self.surface.handle_key_down(key).is_consumed() {
            return LoopControl::Continue;
        }
        match native_input::apply(self.surface.buffer(), self.surface.selection(), key) {
            NativeOutcome::Edited { text, selection } => {
                self.surface.input_changed(&text, selection.start, selection.end);
            }
            NativeOutcome::Moved(selection) => {
                self.surface.set_selection(selection.start, selection.end);
            }
            NativeOutcome::Quit => {
                return LoopControl::Break {
                    reason: ShutdownReason::Quit,
                };
            }
            NativeOutcome::Ignored => {
                trace!(target: "runtime.input", chord = key.is_chord(), "key_ignored");
            }
        }
        LoopControl::Continue
    }

    fn handle_resize(&mut self, width: u16, height: u16) -> LoopControl {
        trace!(target: "runtime", width, height, "resize");
        self.size = (width, height);
        LoopControl::Continue
    }

    fn handle_toast(&mut self, frame: ToastFrame) -> LoopControl {
        self.toast.apply(frame);
        LoopControl::Continue
    }

    fn render(&mut self) {
        let layout = Layout {
            width: self.size.0,
            height: self.size.1,
            tab_width: self.tab_width,
        };
        let buffer = self.surface.buffer();
        let sel = self.surface.selection();
        let caret = if sel.is_caret() { sel.start } else { sel.end };
        let info = buffer.line_info(caret);
        self.viewport.follow(info.index, layout.text_rows());

        let col = display_col(&buffer.slice(info.start, caret), self.tab_width);
        let status_line = self.status.line(info.index, col);
        let frame = view::compose(buffer, sel, self.viewport, &status_line, &self.toast, &layout);
        if let Err(e) = view::draw(&mut stdout().lock(), &frame, &layout) {
            error!(target: "render", ?e, "draw_failed");
        }

        let status = self.status.snapshot();
        let title = window_title(&status.title, status.dirty);
        if self.shown_title.as_deref() != Some(title.as_str()) {
            if let Err(e) = self.terminal_guard.backend().set_title(&title) {
                warn!(target: "render", ?e, "set_title_failed");
            }
            self.shown_title = Some(title);
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");

        if let Some(shutdown) = self.input_shutdown.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "input_task_shutdown_signal"
            );
            shutdown.signal();
        }

        if let Some(handle) = self.input_task.take() {
            match handle.await {
                Ok(_) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Err(err) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Err(err) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
            }
        }

        // A toast still holding on screen is abandoned after a short grace.
        if let Some(toasts) = self.toasts.take() {
            match tokio::time::timeout(Duration::from_millis(200), toasts.shutdown()).await {
                Ok(()) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "toast_queue_stopped"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "toast_queue_timeout"
                ),
            }
        }

        log_shutdown_stage(reason, "complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let context = startup.run(&args)?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut runtime = EditorRuntime::new(context, tx, rx);
    runtime.run().await
}
