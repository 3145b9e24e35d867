use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// StderrProgressReporter adapter writing progress to stderr
///
/// Uses indicatif for the progress bar and the lookup spinner. Only one
/// indicator is active at a time; printing a message clears it first.
pub struct StderrProgressReporter {
    indicator: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            indicator: Mutex::new(None),
            quiet: false,
        }
    }

    /// A reporter that prints nothing
    pub fn quiet() -> Self {
        Self {
            indicator: Mutex::new(None),
            quiet: true,
        }
    }

    fn with_indicator<F>(&self, f: F)
    where
        F: FnOnce(&mut Option<ProgressBar>),
    {
        if let Ok(mut guard) = self.indicator.lock() {
            f(&mut guard);
        }
    }

    fn clear_indicator(&self) {
        self.with_indicator(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        });
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("   {spinner:.green} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.clear_indicator();
        eprintln!("{}", message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        if self.quiet {
            return;
        }
        self.with_indicator(|slot| {
            let bar = slot.get_or_insert_with(|| {
                let bar = ProgressBar::new(total as u64);
                bar.set_style(Self::bar_style());
                bar
            });
            bar.set_length(total as u64);
            bar.set_position(current as u64);
            if let Some(msg) = message {
                bar.set_message(msg.to_string());
            }
        });
    }

    fn begin_activity(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.clear_indicator();
        self.with_indicator(|slot| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(Self::spinner_style());
            spinner.set_message(message.to_string());
            spinner.enable_steady_tick(Duration::from_millis(80));
            *slot = Some(spinner);
        });
    }

    fn report_error(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.clear_indicator();
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.clear_indicator();
        eprintln!();
        eprintln!("{}", message);
    }
}
