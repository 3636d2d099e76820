use crate::error::ProcessingError;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const RATIO_TOLERANCE: f64 = 0.01;

/// Width and height of the first video stream of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

impl StreamGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Bucket a geometry by aspect ratio, allowing ±0.01 around 16:9 and 9:16.
    ///
    /// Landscape is tested first, so a ratio within tolerance of both resolves
    /// to Landscape. A zero height is rejected.
    pub fn classify(geometry: StreamGeometry) -> Result<Self, ProcessingError> {
        if geometry.height == 0 {
            return Err(ProcessingError::InvalidGeometry {
                width: geometry.width,
                height: geometry.height,
            });
        }

        let ratio = f64::from(geometry.width) / f64::from(geometry.height);

        if (ratio - LANDSCAPE_RATIO).abs() <= RATIO_TOLERANCE {
            Ok(Orientation::Landscape)
        } else if (ratio - PORTRAIT_RATIO).abs() <= RATIO_TOLERANCE {
            Ok(Orientation::Portrait)
        } else {
            Ok(Orientation::Other)
        }
    }

    /// Key prefix, including the trailing slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape/",
            Orientation::Portrait => "portrait/",
            Orientation::Other => "other/",
        }
    }
}
