/* Logger initialization */
use std::{panic, thread};

use tracing::{error, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::{AppConfig, CargoEnv};

pub struct LoggerGuards {
    pub _tracing_guard: WorkerGuard,
    // option because sentry is opt-in
    pub _sentry_guard: Option<sentry::ClientInitGuard>,
}

pub struct Logger {}

impl Logger {
    pub fn init(config: &AppConfig) -> LoggerGuards {
        // dev gets the chatty proxy logs, prod only wants info and up
        let default_level = match config.cargo_env {
            CargoEnv::Development => LevelFilter::DEBUG,
            CargoEnv::Production => LevelFilter::INFO,
        };

        // RUST_LOG wins if it's set so a single module can be turned up without a redeploy
        let filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let (non_blocking, guard) = match config.cargo_env {
            CargoEnv::Development => tracing_appender::non_blocking(std::io::stdout()),
            CargoEnv::Production => tracing_appender::non_blocking(
                tracing_appender::rolling::daily(&config.log_dir, "streambox.log"),
            ),
        };

        let sentry_guard = config.sentry_dsn.clone().map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    environment: Some(environment_name(config.cargo_env).into()),
                    attach_stacktrace: true,
                    ..Default::default()
                },
            ))
        });

        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);

        let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

        if sentry_guard.is_some() {
            registry.with(sentry_tracing::layer()).init();
        } else {
            registry.init();
        }

        panic::set_hook(Box::new(log_panic));

        // both guards go back to main, dropping them stops the flush
        LoggerGuards {
            _tracing_guard: guard,
            _sentry_guard: sentry_guard,
        }
    }
}

pub fn environment_name(cargo_env: CargoEnv) -> &'static str {
    match cargo_env {
        CargoEnv::Development => "development",
        CargoEnv::Production => "production",
    }
}

fn log_panic(info: &panic::PanicHookInfo<'_>) {
    let thread = thread::current();
    let thread = thread.name().unwrap_or("unknown");

    let msg = match info.payload().downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match info.payload().downcast_ref::<String>() {
            Some(s) => &**s,
            None => "Box<Any>",
        },
    };

    // "notrace - " panics are expected ones, the backtrace is just noise for those
    let (msg, backtrace) = match msg.strip_prefix("notrace - ") {
        Some(stripped) => (stripped, None),
        None => (msg, Some(backtrace::Backtrace::new())),
    };

    match (info.location(), backtrace) {
        (Some(location), Some(backtrace)) => error!(
            target: "panic", "thread '{}' panicked at '{}': {}:{}\n{:?}",
            thread,
            msg,
            location.file(),
            location.line(),
            backtrace
        ),
        (Some(location), None) => error!(
            target: "panic", "thread '{}' panicked at '{}': {}:{}",
            thread,
            msg,
            location.file(),
            location.line()
        ),
        (None, Some(backtrace)) => error!(
            target: "panic", "thread '{}' panicked at '{}'\n{:?}",
            thread,
            msg,
            backtrace
        ),
        (None, None) => error!(target: "panic", "thread '{}' panicked at '{}'", thread, msg),
    }
}
