//! Progress display for remote fetches

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::fetch::{TransferObserver, VendorDescriptor};

/// One spinner per in-flight fetch, turning into a bar once the object count
/// is known
#[derive(Default)]
pub struct FetchProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl FetchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("[{bar:30.cyan/blue}] {pos}/{len} objects {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }
}

impl TransferObserver for FetchProgress {
    fn started(&self, descriptor: &VendorDescriptor) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Fetching {descriptor}"));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(descriptor.cache_key(), pb);
    }

    fn progress(&self, descriptor: &VendorDescriptor, received: usize, total: usize) {
        let bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = bars.get(&descriptor.cache_key()) {
            if total > 0 && pb.length().is_none() {
                pb.set_style(Self::bar_style());
                pb.set_length(total as u64);
            }
            pb.set_position(received as u64);
        }
    }

    fn finished(&self, descriptor: &VendorDescriptor, success: bool) {
        let removed = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&descriptor.cache_key());
        if let Some(pb) = removed {
            if success {
                pb.finish_and_clear();
            } else {
                pb.abandon_with_message(format!("Failed to fetch {descriptor}"));
            }
        }
    }
}
