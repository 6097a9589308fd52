use indicatif::ProgressStyle;
use std::future::{self, Future};


const PROGRESS_CHARS: &str = "#-";
const NONE_TEMPLATE: &str = "{wide_msg}";
const COUNT_TEMPLATE: &str =
    "{spinner} {wide_msg} {pos}/{len} {per_sec} {elapsed_precise} ({eta_precise}) [{bar:80}]";

pub fn get_none_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(NONE_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

pub fn get_count_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(COUNT_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
}

/// Snapshot of a multi-game bundle, reported after every game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleProgress {
    pub total_games: usize,
    pub games_processed: usize,
    pub current_game: String,
    pub bytes_written: u64,
    pub images_added: usize,
    pub games_failed: usize,
}

/// Receives bundle progress. The returned future must be `Send` so that a
/// bundle can run on a multi-threaded runtime.
pub trait ProgressSink {
    fn report(&mut self, progress: &BundleProgress) -> impl Future<Output = ()> + Send;
}

impl<F: FnMut(&BundleProgress)> ProgressSink for F {
    fn report(&mut self, progress: &BundleProgress) -> impl Future<Output = ()> + Send {
        self(progress);
        future::ready(())
    }
}
