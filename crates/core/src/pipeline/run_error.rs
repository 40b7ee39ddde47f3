use thiserror::Error;

use crate::recognition::domain::face_client::FaceApiError;
use crate::recognition::domain::person_group::PersonGroupId;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Api(#[from] FaceApiError),
    #[error("training of person group {group_id} failed: {message}")]
    TrainingFailed {
        group_id: PersonGroupId,
        message: String,
    },
    #[error("training of person group {group_id} did not finish within {waited_secs:.1}s ({polls} polls)")]
    TrainingTimedOut {
        group_id: PersonGroupId,
        polls: usize,
        waited_secs: f64,
    },
}
