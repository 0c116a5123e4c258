use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Terminal feedback for one command: a spinner while tools run, then a
/// one-line summary on stderr
pub struct BundleUI {
    start_time: Instant,
    spinner: Option<ProgressBar>,
}

impl BundleUI {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            spinner: None,
        }
    }

    pub fn start(&mut self, title: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(300));
        spinner.set_message(format!("{} working...", title));
        self.spinner = Some(spinner);
    }

    pub fn finish_delivered(&mut self, file_name: &str, delivered_to: &str, size: usize) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }

        let elapsed = self.start_time.elapsed();
        let destination = if delivered_to == "clipboard" {
            "copied to clipboard".to_string()
        } else {
            format!("written to {}", delivered_to)
        };

        eprintln!(
            "  {} {} {} {} in {}",
            "✓".bright_green(),
            file_name.bright_cyan(),
            format!("({})", format_size(size)).bright_black(),
            destination,
            format!("{:.0}ms", elapsed.as_secs_f64() * 1000.0).bright_white().bold()
        );
    }

    pub fn fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        eprintln!("{}", message.bright_red());
    }
}

impl Default for BundleUI {
    fn default() -> Self {
        Self::new()
    }
}

fn format_size(size: usize) -> String {
    let size_kb = size as f64 / 1024.0;
    if size_kb < 1.0 {
        format!("{} B", size)
    } else {
        format!("{:.2} kB", size_kb)
    }
}
