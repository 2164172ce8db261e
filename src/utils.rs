//! Console helpers shared by the subcommands

use crate::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    if crate::logger::is_quiet() {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    pb
}

/// Create a 0..=100 bar for aggregate upload progress
pub fn create_upload_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar()
        .template(PROGRESS_BAR_TEMPLATE)
        .map(|s| s.progress_chars("=>-"))
    {
        pb.set_style(style);
    }
    if crate::logger::is_quiet() {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    pb
}
