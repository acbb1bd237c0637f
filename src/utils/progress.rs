use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;

/// Progress callback for long batch operations. Library code reports through
/// this trait and never writes to the console itself.
pub trait ProgressSink: Sync {
    fn set_message(&self, message: &str);
    fn increment(&self, delta: u64);
    fn finish(&self, message: &str);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set_message(&self, _message: &str) {}
    fn increment(&self, _delta: u64) {}
    fn finish(&self, _message: &str) {}
}

/// Terminal progress bar for the CLI.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new(total);
        match ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Falling back to default progress style: {}", e),
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    fn finish(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporters_have_no_bar() {
        let bar = ProgressReporter::new(10, "Checking", true);
        let spinner = ProgressReporter::new_spinner("Reading", true);
        for reporter in [&bar, &spinner] {
            reporter.increment(3);
            reporter.finish("done");
            assert!(reporter.progress_bar.is_none());
        }
    }

    #[test]
    fn test_spinner_finishes_with_message() {
        let spinner = ProgressReporter::new_spinner("Reading", false);
        spinner.finish("Loaded 2 observations");
        let pb = spinner.progress_bar.as_ref().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Loaded 2 observations");
    }
}
