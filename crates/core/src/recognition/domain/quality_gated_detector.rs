use std::sync::Arc;

use super::detected_face::{DetectOptions, DetectedFace};
use super::face_client::{FaceApiError, FaceClient};
use super::quality::QualityForRecognition;

/// Outcome of one detect call, before and after the quality gate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualityScan {
    /// Every face the service returned.
    pub detected: Vec<DetectedFace>,
    /// The subset scoring at least `QualityForRecognition::SUFFICIENT`.
    pub sufficient: Vec<DetectedFace>,
}

impl QualityScan {
    /// True when the image has faces and every one of them scores `High`.
    pub fn is_enrollable(&self) -> bool {
        !self.detected.is_empty()
            && self
                .detected
                .iter()
                .all(|f| f.quality == Some(QualityForRecognition::ENROLLABLE))
    }

    /// Console line reporting how many faces were found and usable.
    pub fn describe(&self, image: &str) -> String {
        format!(
            "{} face(s) with {} having sufficient quality for recognition detected from image `{}`",
            self.detected.len(),
            self.sufficient.len(),
            image
        )
    }
}

/// Detects faces for recognition and drops those too poor to use.
///
/// Always requests the quality-for-recognition attribute with the fixed
/// detection model; the service rejects incompatible model pairings.
pub struct QualityGatedDetector {
    client: Arc<dyn FaceClient>,
    detection_model: String,
}

impl QualityGatedDetector {
    pub fn new(client: Arc<dyn FaceClient>, detection_model: impl Into<String>) -> Self {
        Self {
            client,
            detection_model: detection_model.into(),
        }
    }

    /// Faces in `image_url` with quality `>= Medium`.
    pub fn detect_for_recognition(
        &self,
        image_url: &str,
        recognition_model: &str,
    ) -> Result<Vec<DetectedFace>, FaceApiError> {
        Ok(self.scan(image_url, recognition_model)?.sufficient)
    }

    /// One detect call, returning both the raw and the gated face lists.
    pub fn scan(
        &self,
        image_url: &str,
        recognition_model: &str,
    ) -> Result<QualityScan, FaceApiError> {
        let options = DetectOptions {
            recognition_model: recognition_model.to_string(),
            detection_model: self.detection_model.clone(),
            return_quality: true,
        };
        let detected = self.client.detect_faces_from_url(image_url, &options)?;
        let sufficient: Vec<DetectedFace> = detected
            .iter()
            .filter(|f| f.meets(QualityForRecognition::SUFFICIENT))
            .cloned()
            .collect();

        let scan = QualityScan {
            detected,
            sufficient,
        };
        log::debug!("{}", scan.describe(image_url));
        Ok(scan)
    }
}
