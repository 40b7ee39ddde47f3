use serde::{Deserialize, Serialize};

/// Ordinal score telling whether a detected face is usable for recognition.
///
/// Variant order matters: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityForRecognition {
    Low,
    Medium,
    High,
}

impl QualityForRecognition {
    /// Minimum score a face needs to be used for identification.
    pub const SUFFICIENT: QualityForRecognition = QualityForRecognition::Medium;

    /// Score every face in an image needs before the image is enrolled.
    pub const ENROLLABLE: QualityForRecognition = QualityForRecognition::High;
}

impl std::fmt::Display for QualityForRecognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityForRecognition::Low => write!(f, "low"),
            QualityForRecognition::Medium => write!(f, "medium"),
            QualityForRecognition::High => write!(f, "high"),
        }
    }
}
