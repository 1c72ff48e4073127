//! Quality error definitions attached at every tree level
//!
//! - [`ProductError`] and [`SeamSeriesError`]: overlying errors with a
//!   single threshold
//! - [`SeamError`]: per measure task bounds on a whole seam or series
//! - [`IntervalError`]: one [`LevelConfig`] tier per level and one error
//!   instance id per seam interval

mod interval;
mod level_config;
mod overlying;
mod seam;
mod simple;

pub use interval::IntervalError;
pub use level_config::LevelConfig;
pub use overlying::{ProductError, SeamSeriesError};
pub use seam::SeamError;
pub use simple::SimpleError;

use once_cell::sync::Lazy;
use std::collections::HashSet;
use uuid::Uuid;

/// Number of quality levels per interval error
pub const MAX_LEVEL: usize = 3;

/// How min/max bounds are interpreted by the processing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryType {
    /// Absolute bounds, shifted by `shift`
    Static,
    /// Bounds relative to a reference curve
    Reference,
}

/// Tree level an error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Product,
    SeamSeries,
    Seam,
    SeamInterval,
}

impl ErrorScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorScope::Product => "Product",
            ErrorScope::SeamSeries => "SeamSeries",
            ErrorScope::Seam => "Seam",
            ErrorScope::SeamInterval => "SeamInterval",
        }
    }
}

/// Position of the owning measure task, resolved by the caller
///
/// Errors hold no back reference; the owner passes its numbers and the
/// product's lwm trigger threshold when values are queried.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskContext {
    pub series: Option<i32>,
    pub seam: Option<i32>,
    pub interval: Option<i32>,
    pub lwm_signal_threshold: f64,
}

static REFERENCE_VARIANTS: Lazy<HashSet<Uuid>> = Lazy::new(|| {
    [
        "5EB04560-2641-4E64-A016-14207E59A370",
        "F8F4E0A8-D259-40F9-B134-68AA24E0A06C",
        "4A6AE9B0-3A1A-427F-8D58-2D0205452377",
        "D36ECEBA-286B-4D06-B596-0491B6544F40",
        "527B7421-5DDD-436C-BE33-C1A359A736F6",
        "7CF9F16D-36DE-4840-A2EA-C41979F91A9B",
        "C0C80DA1-4E9D-4EC0-859A-8D43A0674571",
    ]
    .iter()
    .filter_map(|s| Uuid::parse_str(s).ok())
    .collect()
});

static SECOND_THRESHOLD_VARIANTS: Lazy<HashSet<Uuid>> = Lazy::new(|| {
    [
        "C0C80DA1-4E9D-4EC0-859A-8D43A0674571",
        "55DCC3D9-FE50-4792-8E27-460AADDDD09F",
    ]
    .iter()
    .filter_map(|s| Uuid::parse_str(s).ok())
    .collect()
});

pub fn boundary_type_for(variant_id: &Uuid) -> BoundaryType {
    if REFERENCE_VARIANTS.contains(variant_id) {
        BoundaryType::Reference
    } else {
        BoundaryType::Static
    }
}

pub fn shows_second_threshold(variant_id: &Uuid) -> bool {
    SECOND_THRESHOLD_VARIANTS.contains(variant_id)
}
