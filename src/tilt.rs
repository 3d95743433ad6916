//! Card tilt and shine transforms.
//!
//! Cards lean toward the pointer, or toward the device orientation on mobile,
//! while a highlight follows. Both inputs map to the same [`Tilt`] output:
//! rotation angles in degrees and a shine position in percent.

/// Default maximum tilt, in degrees, for device orientation.
pub const MAX_TILT: f64 = 14.0;

/// Tilt per unit of pointer offset from the card center, in degrees.
const POINTER_TILT: f64 = 18.0;

/// Orientation delta, in degrees, that reaches full tilt.
const ORIENTATION_RANGE: f64 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    /// Rotation around the horizontal axis, degrees
    pub tilt_x: f64,
    /// Rotation around the vertical axis, degrees
    pub tilt_y: f64,
    /// Horizontal highlight position, 0 to 100
    pub shine_x: f64,
    /// Vertical highlight position, 0 to 100
    pub shine_y: f64,
}

impl Tilt {
    /// Flat card with the highlight at the top center.
    pub const RESTING: Tilt = Tilt {
        tilt_x: 0.0,
        tilt_y: 0.0,
        shine_x: 50.0,
        shine_y: 0.0,
    };
}

impl Default for Tilt {
    fn default() -> Self {
        Tilt::RESTING
    }
}

/// Maps device orientation to a tilt, relative to a calibration baseline.
///
/// `beta` is the front-back inclination and `gamma` the left-right one, both
/// in degrees. A delta of 45 degrees reaches `max_tilt`; results are clamped.
///
/// ```rust
/// use kodex::tilt::{compute_tilt, Tilt};
///
/// assert_eq!(compute_tilt(10.0, -5.0, 10.0, -5.0, 14.0), Tilt {
///     tilt_x: 0.0,
///     tilt_y: 0.0,
///     shine_x: 50.0,
///     shine_y: 50.0,
/// });
///
/// let leaning = compute_tilt(0.0, 0.0, 90.0, -90.0, 14.0);
/// assert_eq!((leaning.tilt_x, leaning.tilt_y), (-14.0, -14.0));
/// assert_eq!((leaning.shine_x, leaning.shine_y), (0.0, 100.0));
/// ```
pub fn compute_tilt(
    baseline_beta: f64,
    baseline_gamma: f64,
    beta: f64,
    gamma: f64,
    max_tilt: f64,
) -> Tilt {
    let d_beta = beta - baseline_beta;
    let d_gamma = gamma - baseline_gamma;

    Tilt {
        tilt_x: (-d_beta / ORIENTATION_RANGE * max_tilt).clamp(-max_tilt, max_tilt),
        tilt_y: (d_gamma / ORIENTATION_RANGE * max_tilt).clamp(-max_tilt, max_tilt),
        shine_x: ((d_gamma + ORIENTATION_RANGE) / (2.0 * ORIENTATION_RANGE) * 100.0)
            .clamp(0.0, 100.0),
        shine_y: ((d_beta + ORIENTATION_RANGE) / (2.0 * ORIENTATION_RANGE) * 100.0)
            .clamp(0.0, 100.0),
    }
}

/// Maps a pointer position over a card to a tilt.
///
/// `x` and `y` are the pointer position as fractions of the card width and
/// height (0 at the top-left corner, 1 at the bottom-right).
///
/// ```rust
/// use kodex::tilt::pointer_tilt;
///
/// let center = pointer_tilt(0.5, 0.5);
/// assert_eq!((center.tilt_x, center.tilt_y), (0.0, 0.0));
/// assert_eq!((center.shine_x, center.shine_y), (50.0, 50.0));
/// ```
pub fn pointer_tilt(x: f64, y: f64) -> Tilt {
    Tilt {
        tilt_x: (0.5 - y) * POINTER_TILT,
        tilt_y: (x - 0.5) * POINTER_TILT,
        shine_x: x * 100.0,
        shine_y: y * 100.0,
    }
}

/// What the platform reports when gyro tilt is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEnvironment {
    pub prefers_reduced_motion: bool,
    pub secure_context: bool,
    pub orientation_supported: bool,
    /// `None` when the platform needs no explicit permission
    pub permission_granted: Option<bool>,
}

/// Why gyro tilt stayed inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroRefusal {
    Disabled,
    ReducedMotion,
    InsecureContext,
    Unsupported,
    PermissionDenied,
}

/// Orientation-driven tilt for one card.
///
/// Inactive until [`request_activation()`](GyroTilt::request_activation)
/// succeeds. The first sample after activation becomes the calibration
/// baseline, so the card starts flat in whatever position the device is held.
#[derive(Debug, Clone)]
pub struct GyroTilt {
    enabled: bool,
    active: bool,
    max_tilt: f64,
    baseline: Option<(f64, f64)>,
}

impl GyroTilt {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            active: false,
            max_tilt: MAX_TILT,
            baseline: None,
        }
    }

    pub fn with_max_tilt(mut self, max_tilt: f64) -> Self {
        self.max_tilt = max_tilt.abs();
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enables or disables the card; disabling stops tracking.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    /// Activates tracking if the environment allows it.
    pub fn request_activation(&mut self, env: &MotionEnvironment) -> Result<(), GyroRefusal> {
        if env.prefers_reduced_motion {
            return Err(GyroRefusal::ReducedMotion);
        }
        if !self.enabled {
            return Err(GyroRefusal::Disabled);
        }
        if !env.secure_context {
            return Err(GyroRefusal::InsecureContext);
        }
        if !env.orientation_supported {
            return Err(GyroRefusal::Unsupported);
        }
        if env.permission_granted == Some(false) {
            return Err(GyroRefusal::PermissionDenied);
        }

        self.active = true;
        Ok(())
    }

    /// Feeds one orientation sample; `None` while inactive.
    ///
    /// Missing angles count as 0.
    pub fn sample(&mut self, beta: Option<f64>, gamma: Option<f64>) -> Option<Tilt> {
        if !self.active {
            return None;
        }
        let (beta, gamma) = (beta.unwrap_or(0.0), gamma.unwrap_or(0.0));
        let (base_beta, base_gamma) = *self.baseline.get_or_insert((beta, gamma));
        Some(compute_tilt(base_beta, base_gamma, beta, gamma, self.max_tilt))
    }

    /// Deactivates and forgets the baseline; the card returns to rest.
    pub fn stop(&mut self) -> Tilt {
        self.active = false;
        self.baseline = None;
        Tilt::RESTING
    }
}
