//! Scripted sessions through the full stack.
//!
//! A replay script is a RON file listing steps. The runner wires a
//! [`Dispatcher`] to a [`ShortcutHost`] backed by a [`MockBackend`], binds the
//! configured shortcuts, and executes each step, printing deliveries, UI
//! notices and signal observations as it goes.
//!
//! ```ron
//! (
//!     platform: "macos",
//!     steps: [
//!         Register(action: "screenshot"),
//!         Press("cmd+shift+s"),
//!         Press("cmd+shift+s"),
//!         Sleep(350),
//!         Press("cmd+shift+s"),
//!         Publish("abc"),
//!         Observe,
//!     ],
//! )
//! ```

use std::{
    collections::HashMap,
    fmt::Write as _,
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use config::Config;
use keycombo::{KeyCombo, Platform};
use overlay_engine::{
    Dispatcher, DispatcherOptions, EventBus, Handler, HandlerError, NotificationDispatcher,
    Registration,
};
use overlay_host::{MockBackend, ShortcutHost};
use overlay_protocol::{
    UiNotice,
    ipc::{UiRx, ui_channel},
};
use parking_lot::Mutex;
use ron::{Options, error::SpannedError, extensions::Extensions};
use serde::Deserialize;
use surface_signal::{FileStore, MemoryStore, SignalChannel, SignalWatcher, SlotStore};
use tokio::{runtime::Handle, task, time};
use tracing::debug;

/// What a registered replay handler does when invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Behavior {
    /// Record the call and succeed.
    #[default]
    Ok,
    /// Record the call and return an error.
    Fail,
    /// Record the call and panic.
    Panic,
    /// Record the call from a spawned task.
    Async,
    /// Record the call from a spawned task that then fails.
    AsyncFail,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum Step {
    /// Register a handler for an action.
    Register {
        /// Action to handle.
        action: String,
        /// Handler behavior.
        #[serde(default)]
        behavior: Behavior,
    },
    /// Remove the handler for an action.
    Unregister(String),
    /// Fire a key combination at the host.
    Press(String),
    /// Wait this many milliseconds.
    Sleep(u64),
    /// Publish a selected-conversation signal.
    Publish(String),
    /// Read the selected-conversation slot.
    Observe,
    /// Run dispatcher initialization again.
    Reinit,
}

/// A replay script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Platform whose bindings are applied; defaults to the current one.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Signal store file; an in-memory store is used when absent.
    #[serde(default)]
    pub signal_file: Option<PathBuf>,
    /// Steps, in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from RON text.
    pub fn from_ron(text: &str) -> Result<Self, SpannedError> {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
    }
}

/// Everything a running replay holds.
struct Session {
    /// Shortcut dispatcher.
    dispatcher: Dispatcher,
    /// Host with a mock backend.
    host: ShortcutHost,
    /// UI notices emitted so far.
    notices: UiRx,
    /// Handler invocation log.
    calls: Arc<Mutex<Vec<String>>>,
    /// Live handler registrations by action.
    guards: HashMap<String, Registration>,
    /// Producer side of the signal slot.
    signals: SignalChannel,
    /// Consumer side of the signal slot.
    watcher: SignalWatcher,
}

impl Session {
    /// Build the stack and bind `cfg`'s shortcuts for `platform`.
    fn start(cfg: &Config, script: &Script, out: &mut dyn Write) -> io::Result<Self> {
        let (tx, notices) = ui_channel();
        let dispatcher = Dispatcher::with_options(
            NotificationDispatcher::new(tx),
            DispatcherOptions {
                capture_debounce: cfg.capture_debounce(),
                runtime: Handle::try_current().ok(),
            },
        );
        let host = ShortcutHost::new(Arc::new(MockBackend::new()), EventBus::new());
        let report = dispatcher.subscribe(host.bus());
        writeln!(out, "subscribed: {report}")?;

        let platform = script.platform.unwrap_or_else(Platform::current);
        match host.update_shortcuts(&cfg.shortcuts_config(platform)) {
            Ok(()) => writeln!(
                out,
                "bound {} shortcuts for {platform}",
                host.registered_shortcuts().len()
            )?,
            Err(e) => writeln!(out, "binding: {e}")?,
        }

        let store: Arc<dyn SlotStore> = match &script.signal_file {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        };
        let signals = SignalChannel::selected_conversation(store);
        let watcher = signals.watcher(cfg.signal_freshness());

        let mut session = Self {
            dispatcher,
            host,
            notices,
            calls: Arc::new(Mutex::new(Vec::new())),
            guards: HashMap::new(),
            signals,
            watcher,
        };
        session.flush(out)?;
        Ok(session)
    }

    /// Handler for `action` with the given behavior.
    fn handler(&self, action: &str, behavior: Behavior) -> Handler {
        let calls = self.calls.clone();
        let action = action.to_string();
        match behavior {
            Behavior::Ok => Handler::from_fn(move || calls.lock().push(format!("{action} ran"))),
            Behavior::Fail => Handler::new(move |_| {
                calls.lock().push(format!("{action} ran"));
                Err(HandlerError::msg(format!("{action} failed")))
            }),
            Behavior::Panic => Handler::from_fn(move || {
                calls.lock().push(format!("{action} ran"));
                panic!("{action} panicked");
            }),
            Behavior::Async | Behavior::AsyncFail => Handler::from_async(move |_| {
                let calls = calls.clone();
                let action = action.clone();
                async move {
                    calls.lock().push(format!("{action} ran (async)"));
                    if behavior == Behavior::AsyncFail {
                        return Err(HandlerError::msg(format!("{action} failed")));
                    }
                    Ok(())
                }
            }),
        }
    }

    /// Execute one step.
    async fn step(&mut self, step: &Step, out: &mut dyn Write) -> io::Result<()> {
        match step {
            Step::Register { action, behavior } => {
                writeln!(out, "> register {action} ({behavior:?})")?;
                let guard = self
                    .dispatcher
                    .register(action.as_str(), self.handler(action, *behavior));
                self.guards.insert(action.clone(), guard);
            }
            Step::Unregister(action) => {
                writeln!(out, "> unregister {action}")?;
                let removed = self.dispatcher.unregister(action);
                self.guards.remove(action);
                if !removed {
                    writeln!(out, "  (was not registered)")?;
                }
            }
            Step::Press(spec) => {
                writeln!(out, "> press {spec}")?;
                match KeyCombo::parse(spec) {
                    Ok(combo) => match self.host.on_key_combo(&combo) {
                        Some(event) => writeln!(out, "  event {}", event.kind())?,
                        None => writeln!(out, "  not bound")?,
                    },
                    Err(e) => writeln!(out, "  invalid: {e}")?,
                }
            }
            Step::Sleep(ms) => {
                writeln!(out, "> sleep {ms}ms")?;
                time::sleep(Duration::from_millis(*ms)).await;
            }
            Step::Publish(id) => {
                writeln!(out, "> publish {id}")?;
                if let Err(e) = self.signals.publish(id.as_str()) {
                    writeln!(out, "  error: {e}")?;
                }
            }
            Step::Observe => {
                writeln!(out, "> observe")?;
                match self.watcher.poll() {
                    Ok(Some(signal)) => writeln!(out, "  selected {}", signal.id)?,
                    Ok(None) => writeln!(out, "  nothing new")?,
                    Err(e) => writeln!(out, "  error: {e}")?,
                }
            }
            Step::Reinit => {
                writeln!(out, "> reinit")?;
                let report = self.dispatcher.subscribe(self.host.bus());
                writeln!(out, "  {report}")?;
            }
        }
        // Let spawned handlers run before reporting.
        for _ in 0..4 {
            task::yield_now().await;
        }
        self.flush(out)
    }

    /// Print handler calls and notices recorded since the last flush.
    fn flush(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let calls: Vec<String> = self.calls.lock().drain(..).collect();
        for call in calls {
            writeln!(out, "  handler {call}")?;
        }
        while let Ok(notice) = self.notices.try_recv() {
            writeln!(out, "  notice {}", render_notice(&notice))?;
        }
        Ok(())
    }

    /// Dispose subscriptions and release every binding.
    fn finish(self, out: &mut dyn Write) -> io::Result<()> {
        let disposed = self.dispatcher.shutdown();
        let released = self.host.clear();
        writeln!(
            out,
            "shutdown: {disposed} subscriptions disposed, {released} shortcuts released"
        )
    }
}

/// One-line rendering of a UI notice.
fn render_notice(notice: &UiNotice) -> String {
    match notice {
        UiNotice::ShortcutRegistrationError(failures) => {
            let mut s = String::from("registration error:");
            for f in failures {
                let _ignored = write!(s, " [{f}]");
            }
            s
        }
        UiNotice::Notify { kind, title, text } => format!("{kind:?} {title}: {text}"),
    }
}

/// Execute `script` against `cfg`, writing a transcript to `out`.
pub async fn run(cfg: &Config, script: &Script, out: &mut dyn Write) -> io::Result<()> {
    let mut session = Session::start(cfg, script, out)?;
    for step in &script.steps {
        debug!(?step, "replay step");
        session.step(step, out).await?;
    }
    session.finish(out)
}
