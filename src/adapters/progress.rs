use crate::ports::ProgressPort;
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal progress bar over the 0–100 scan percentage.
pub struct ProgressBarAdapter {
    bar: ProgressBar,
    quiet: bool,
}

impl ProgressBarAdapter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        Self { bar, quiet: false }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        if quiet {
            self.bar = ProgressBar::hidden();
        }
        self
    }
}

impl Default for ProgressBarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressPort for ProgressBarAdapter {
    fn start(&self, total_files: u64) {
        if self.quiet {
            return;
        }

        self.bar.set_length(100);
        self.bar.set_message(format!("Hashing candidates among {} files...", total_files));
        self.bar.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    fn report(&self, percent: u8) {
        if self.quiet {
            return;
        }

        self.bar.set_position(u64::from(percent));
    }

    fn finish(&self) {
        if self.quiet {
            return;
        }

        self.bar.disable_steady_tick();
        self.bar.finish_with_message("✓ Scan complete!");
    }
}

/// Forwards each percentage to a caller-supplied closure.
pub struct CallbackProgress<F> {
    callback: F,
}

impl<F: Fn(u8)> CallbackProgress<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: Fn(u8)> ProgressPort for CallbackProgress<F> {
    fn start(&self, _total_files: u64) {}

    fn report(&self, percent: u8) {
        (self.callback)(percent);
    }

    fn finish(&self) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressPort for NoProgress {
    fn start(&self, _total_files: u64) {}
    fn report(&self, _percent: u8) {}
    fn finish(&self) {}
}
