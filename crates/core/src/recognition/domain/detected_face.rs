use uuid::Uuid;

use super::quality::QualityForRecognition;

/// Pixel rectangle of a detected face inside its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRectangle {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// A face found by a remote detect call.
///
/// `face_id` is temporary: the service forgets it 24 hours after detection,
/// so it is only good for identify/verify calls within the same run.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFace {
    pub face_id: Uuid,
    pub rectangle: Option<FaceRectangle>,
    pub quality: Option<QualityForRecognition>,
}

impl DetectedFace {
    pub fn new(face_id: Uuid, quality: Option<QualityForRecognition>) -> Self {
        Self {
            face_id,
            rectangle: None,
            quality,
        }
    }

    /// True when the face carries a quality score of at least `threshold`.
    /// Faces without a score never qualify.
    pub fn meets(&self, threshold: QualityForRecognition) -> bool {
        self.quality.is_some_and(|q| q >= threshold)
    }
}

/// Parameters for a detect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectOptions {
    pub recognition_model: String,
    pub detection_model: String,
    /// Ask the service to score each face's quality for recognition.
    pub return_quality: bool,
}
