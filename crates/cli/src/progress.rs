// Progress bar wrapper so commands share one look and the engine stays
// terminal-free (it only sees a callback).

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Bar with a known total.
    pub fn new(total: u64, message: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{percent:>3}% {bar:32} {pos}/{len} | ETA: {eta} | T: {elapsed}")
                .expect("invalid progress bar template"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Bar whose total is only known once the engine has scanned.
    pub fn deferred(message: &str) -> Self {
        Self::new(0, message)
    }

    pub fn ensure_length(&self, total: u64) {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
