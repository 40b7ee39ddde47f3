use thiserror::Error;
use uuid::Uuid;

use super::detected_face::{DetectOptions, DetectedFace};
use super::identification::{IdentifyResult, VerifyResult};
use super::person_group::{PersistedFace, Person, PersonGroup, PersonGroupId, TrainingStatus};

/// Underlying cause raised by whichever transport backs a `FaceClient`.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum FaceApiError {
    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("{operation}: service returned {status} ({code}): {message}")]
    Service {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },
    #[error("{operation}: could not decode response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("endpoint and key must both be non-empty")]
    InvalidCredentials,
}

impl FaceApiError {
    /// HTTP status of a service-side rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FaceApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Domain interface to the remote face-recognition service.
///
/// Every call is a blocking request/response keyed by opaque ids. The handle
/// is read-only after construction and shared by every use case of a run.
pub trait FaceClient: Send + Sync {
    fn create_person_group(&self, group: &PersonGroup) -> Result<(), FaceApiError>;

    fn delete_person_group(&self, group_id: &PersonGroupId) -> Result<(), FaceApiError>;

    fn create_person(&self, group_id: &PersonGroupId, name: &str) -> Result<Person, FaceApiError>;

    fn get_person(&self, group_id: &PersonGroupId, person_id: Uuid)
        -> Result<Person, FaceApiError>;

    fn add_face_from_url(
        &self,
        group_id: &PersonGroupId,
        person_id: Uuid,
        image_url: &str,
        user_data: Option<&str>,
    ) -> Result<PersistedFace, FaceApiError>;

    fn train_person_group(&self, group_id: &PersonGroupId) -> Result<(), FaceApiError>;

    fn get_training_status(&self, group_id: &PersonGroupId)
        -> Result<TrainingStatus, FaceApiError>;

    fn detect_faces_from_url(
        &self,
        image_url: &str,
        options: &DetectOptions,
    ) -> Result<Vec<DetectedFace>, FaceApiError>;

    fn identify(
        &self,
        group_id: &PersonGroupId,
        face_ids: &[Uuid],
    ) -> Result<Vec<IdentifyResult>, FaceApiError>;

    fn verify_face_to_person(
        &self,
        face_id: Uuid,
        person_id: Uuid,
        group_id: &PersonGroupId,
    ) -> Result<VerifyResult, FaceApiError>;
}
