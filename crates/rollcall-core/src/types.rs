/// Sentinel label for a face the classifier could not attribute confidently.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Axis-aligned face rectangle in frame pixel coordinates.
///
/// Coordinates are already clamped to the frame by the detector;
/// `end_x`/`end_y` are exclusive, so `width()`/`height()` are crop sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionBox {
    pub start_x: u32,
    pub start_y: u32,
    pub end_x: u32,
    pub end_y: u32,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

impl DetectionBox {
    pub fn width(&self) -> u32 {
        self.end_x.saturating_sub(self.start_x)
    }

    pub fn height(&self) -> u32 {
        self.end_y.saturating_sub(self.start_y)
    }

    /// A degenerate box has no interior pixels left after clamping.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Fixed-length face embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Outcome of classifying one face box in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    Known { name: String, confidence: f32 },
    Unknown,
}

impl Recognition {
    /// Label for display: the identity, or the `"Unknown"` sentinel.
    pub fn label(&self) -> &str {
        match self {
            Recognition::Known { name, .. } => name,
            Recognition::Unknown => UNKNOWN_LABEL,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Recognition::Known { .. })
    }
}
