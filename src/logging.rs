use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber: human-readable events on stderr, filtered
/// by `RUST_LOG` when set. With the `debug-log` feature a JSON copy of every
/// event is appended to `foundry-chat-debug.log`; keep the returned guard
/// alive for the process lifetime so the writer flushes.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "foundry_chat=debug"
        } else {
            "foundry_chat=warn"
        })
    });

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    #[cfg(feature = "debug-log")]
    {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("foundry-chat-debug.log");

        if let Ok(file) = file {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_file(true)
                .with_line_number(true);

            if tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .is_ok()
            {
                tracing::info!("Debug logging initialized");
                return Some(guard);
            }
            return None;
        }
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
    None
}
