//! Cost-matrix observer trait for progress reporting.

/// Callbacks invoked by
/// [`compute_travel_cost_matrix`][crate::compute_travel_cost_matrix] once
/// per origin.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: log every thousandth origin
///
/// ```rust,ignore
/// struct EveryThousand;
///
/// impl MatrixObserver for EveryThousand {
///     fn on_origin_done(&mut self, done: usize, total: usize) {
///         if done % 1_000 == 0 {
///             log::info!("{done}/{total} origins routed");
///         }
///     }
/// }
/// ```
pub trait MatrixObserver {
    /// Called once before the first origin, with the number of origins.
    fn on_start(&mut self, _origins: usize) {}

    /// Called after each origin's row is complete.  `done` counts from 1.
    fn on_origin_done(&mut self, _done: usize, _total: usize) {}

    /// Called once after the last row.
    fn on_finish(&mut self) {}
}

/// A [`MatrixObserver`] that does nothing.
pub struct NoopObserver;

impl MatrixObserver for NoopObserver {}

// ── Progress bar (feature = "progress") ───────────────────────────────────────

#[cfg(feature = "progress")]
pub use bar::ProgressBarObserver;

#[cfg(feature = "progress")]
mod bar {
    use indicatif::{ProgressBar, ProgressStyle};

    use super::MatrixObserver;

    /// Draws an `indicatif` bar on stderr, one tick per origin.
    #[derive(Default)]
    pub struct ProgressBarObserver {
        bar: Option<ProgressBar>,
    }

    impl ProgressBarObserver {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl MatrixObserver for ProgressBarObserver {
        fn on_start(&mut self, origins: usize) {
            let bar = ProgressBar::new(origins as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:40.green} {pos}/{len} origins [{elapsed_precise}]")
            {
                bar.set_style(style);
            }
            self.bar = Some(bar);
        }

        fn on_origin_done(&mut self, _done: usize, _total: usize) {
            if let Some(bar) = &self.bar {
                bar.inc(1);
            }
        }

        fn on_finish(&mut self) {
            if let Some(bar) = self.bar.take() {
                bar.finish();
            }
        }
    }
}
