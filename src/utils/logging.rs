use tracing::{info, warn, debug};
use tracing_subscriber::EnvFilter;
use std::time::Instant;

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` wins over `verbose`.
    pub fn init(verbose: bool) {
        let default_directive = if verbose { "ojpack=debug" } else { "ojpack=info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        // A second init (tests, embedders) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn bundle_start(target: &str, language: &str) {
        info!("📦 Bundling {} ({})", target, language);
    }

    pub fn stage(name: &str) {
        debug!("➡️  Stage: {}", name);
    }

    pub fn tool_invocation(program: &str, args: &[String]) {
        debug!("🔧 Execute: {} {}", program, args.join(" "));
    }

    pub fn tool_stderr(program: &str, stderr: &str) {
        warn!("⚠️  {} reported:\n{}", program, stderr.trim_end());
    }

    pub fn transform_fallback(action: &str, reason: &str) {
        warn!("⚠️  Failed to {} the code, continue with the original code. ({})", action, reason);
    }

    pub fn delivered(destination: &str, bytes: usize) {
        info!("✅ {} bytes delivered to {}", bytes, destination);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
