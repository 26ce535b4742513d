//! Progress reporting for long exports

use indicatif::{ProgressBar, ProgressStyle};

/// A bar counting exported contacts out of `total`
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} contacts {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("=>-"));
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
