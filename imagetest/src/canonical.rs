//! Canonical comparable image form and the difference metric over it.

use ndarray::{Array3, ArrayView3, Zip};

use crate::error::{Error, Result};

/// Height x width x channel, `f32`, values in [0, 1].
///
/// The channel axis always exists: 1 for gray, 2 for gray with alpha,
/// 3 for color and 4 for color with alpha.
pub type CanonicalImage = Array3<f32>;

/// Default acceptable mean absolute difference between two canonical images.
pub const DEFAULT_MEAN_ABS_TOLERANCE: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageDiff {
    /// (height, width, channels) shared by both images.
    pub shape: (usize, usize, usize),
    pub mean_abs: f64,
    pub max_abs: f32,
}

impl ImageDiff {
    /// `mean_abs <= tolerance`. A NaN mean never passes.
    pub fn within(&self, tolerance: f64) -> bool {
        self.mean_abs <= tolerance
    }

    pub fn check(&self, tolerance: f64) -> Result<()> {
        if self.within(tolerance) {
            Ok(())
        } else {
            Err(Error::NotAlmostEqual {
                mean_abs: self.mean_abs,
                tolerance,
                max_abs: self.max_abs,
            })
        }
    }
}

/// Computes the mean and maximum absolute element difference.
///
/// Shapes must match exactly; no broadcasting is attempted.
pub fn image_diff(a: &ArrayView3<f32>, b: &ArrayView3<f32>) -> Result<ImageDiff> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            left: a.shape().to_vec(),
            right: b.shape().to_vec(),
        });
    }

    // Summed in f64 so full-size images don't lose the small differences.
    let (sum, max_abs) = Zip::from(a)
        .and(b)
        .fold((0.0f64, 0.0f32), |(sum, max), &x, &y| {
            let diff = (x - y).abs();
            (sum + diff as f64, max.max(diff))
        });

    let count = a.len();
    let mean_abs = if count == 0 { 0.0 } else { sum / count as f64 };

    Ok(ImageDiff {
        shape: a.dim(),
        mean_abs,
        max_abs,
    })
}

/// True when every value is finite and within [0, 1].
pub fn is_normalized(image: &ArrayView3<f32>) -> bool {
    image.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v))
}
