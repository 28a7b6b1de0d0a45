//! Progress reporting for repository scans

use colored::Colorize;
use govbot_application::ScanProgressNotifier;
use govbot_domain::VoteItem;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports scan progress with a progress bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanProgressNotifier for ProgressReporter {
    fn on_scan_start(&self, total_items: usize) {
        let pb = ProgressBar::new(total_items as u64);
        pb.set_style(Self::scan_style());
        pb.set_prefix("Scanning votes");
        pb.set_message("Starting...");

        *self.bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_item_complete(&self, item: &VoteItem, status: &str, success: bool) {
        if let Some(pb) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let message = if success {
                format!("{} #{} {}", "v".green(), item.number, status)
            } else {
                format!("{} #{} {}", "x".red(), item.number, status)
            };
            pb.set_message(message);
            pb.inc(1);
        }
    }

    fn on_scan_complete(&self) {
        if let Some(pb) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(format!("{}", "Scan complete!".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ScanProgressNotifier for SimpleProgress {
    fn on_scan_start(&self, total_items: usize) {
        eprintln!(
            "{} {} ({} open votes)",
            "->".cyan(),
            "Scanning".bold(),
            total_items
        );
    }

    fn on_item_complete(&self, item: &VoteItem, status: &str, success: bool) {
        if success {
            eprintln!("  {} #{} {}", "v".green(), item.number, status);
        } else {
            eprintln!("  {} #{} {} (failed)", "x".red(), item.number, status);
        }
    }

    fn on_scan_complete(&self) {
        eprintln!();
    }
}
