//! Orientation pipeline: smoothing plus a user-chosen home reference.
//!
//! Raw samples arrive at roughly 15 Hz and jitter. Smoothing is exponential,
//! applied through repeated SLERP so every output stays a unit rotation.

use cubelink_math::Quaternion;

/// Exponential SLERP smoothing.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    factor: f64,
    last: Option<Quaternion>,
}

impl SmoothingFilter {
    /// Create a filter. `factor` is clamped to `[0, 1]`; 0 disables smoothing.
    pub fn new(factor: f64) -> Self {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        Self { factor, last: None }
    }

    /// Smoothing factor in use.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Feed one sample and get the smoothed rotation.
    ///
    /// The first sample after construction or [`reset`](Self::reset) passes
    /// through unchanged.
    pub fn process(&mut self, sample: Quaternion) -> Quaternion {
        let smoothed = match self.last {
            None => sample,
            Some(last) => last.slerp(&sample, 1.0 - self.factor),
        };
        self.last = Some(smoothed);
        smoothed
    }

    /// Forget history.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Most recent output.
    pub fn last(&self) -> Option<Quaternion> {
        self.last
    }
}

/// Reports orientations relative to a captured "home" pose.
#[derive(Debug, Clone, Default)]
pub struct HomeReference {
    home_inverse: Option<Quaternion>,
}

impl HomeReference {
    /// No home set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `current` the zero pose.
    pub fn set_home(&mut self, current: Quaternion) {
        self.home_inverse = Some(current.inverse());
    }

    /// Forget the home pose.
    pub fn clear_home(&mut self) {
        self.home_inverse = None;
    }

    /// True once [`set_home`](Self::set_home) has been called.
    pub fn is_set(&self) -> bool {
        self.home_inverse.is_some()
    }

    /// `home⁻¹ * current`, or `current` when no home is set.
    pub fn relative(&self, current: Quaternion) -> Quaternion {
        match self.home_inverse {
            Some(home_inverse) => home_inverse * current,
            None => current,
        }
    }
}

/// Smoothing followed by home re-referencing.
#[derive(Debug, Clone)]
pub struct OrientationPipeline {
    filter: SmoothingFilter,
    home: HomeReference,
}

impl OrientationPipeline {
    /// Pipeline with the given smoothing factor and no home pose.
    pub fn new(smoothing_factor: f64) -> Self {
        Self { filter: SmoothingFilter::new(smoothing_factor), home: HomeReference::new() }
    }

    /// Smooth `raw`, then express it relative to home.
    pub fn process(&mut self, raw: Quaternion) -> Quaternion {
        let smoothed = self.filter.process(raw);
        self.home.relative(smoothed)
    }

    /// Capture the latest smoothed sample as home.
    ///
    /// Returns false if no sample has been seen yet.
    pub fn set_home_to_current(&mut self) -> bool {
        match self.filter.last() {
            Some(current) => {
                self.home.set_home(current);
                true
            },
            None => false,
        }
    }

    /// Forget the home pose.
    pub fn clear_home(&mut self) {
        self.home.clear_home();
    }

    /// Forget smoothing history but keep the home pose.
    pub fn reset(&mut self) {
        self.filter.reset();
    }
}
