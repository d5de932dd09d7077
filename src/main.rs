use std::io;
use std::process::{self, ExitCode};
use std::thread;

use env_logger::Env;
use log::debug;

use integral_tex::app;
use integral_tex::config::{Config, LOG_ENV};
use integral_tex::error::AppError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::new().filter_or(LOG_ENV, "warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = spawn_interrupt_watcher() {
        debug!("interrupt watcher unavailable: {err}");
    }

    let config = Config::default();
    let stdin = io::stdin();
    let stdout = io::stdout();
    match app::run(&mut stdin.lock(), &mut stdout.lock(), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("run failed: {err:?}");
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Reading stdin blocks the main thread, so Ctrl-C is awaited on a helper
/// thread that ends the process itself. The handler is installed before this
/// returns.
#[cfg(unix)]
fn spawn_interrupt_watcher() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let runtime = runtime()?;
    let mut interrupts = runtime.block_on(async { signal(SignalKind::interrupt()) })?;
    spawn_watcher(move || runtime.block_on(interrupts.recv()).is_some())
}

#[cfg(not(unix))]
fn spawn_interrupt_watcher() -> io::Result<()> {
    let runtime = runtime()?;
    spawn_watcher(move || runtime.block_on(tokio::signal::ctrl_c()).is_ok())
}

fn spawn_watcher(wait: impl FnOnce() -> bool + Send + 'static) -> io::Result<()> {
    thread::Builder::new()
        .name("interrupt".into())
        .spawn(move || {
            if wait() {
                let err = AppError::Interrupted;
                eprintln!("{err}");
                process::exit(i32::from(err.exit_code()));
            }
        })?;
    Ok(())
}
