use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::recognition::domain::detected_face::{DetectOptions, DetectedFace, FaceRectangle};
use crate::recognition::domain::face_client::{FaceApiError, FaceClient};
use crate::recognition::domain::identification::{Candidate, IdentifyResult, VerifyResult};
use crate::recognition::domain::person_group::{
    PersistedFace, Person, PersonGroup, PersonGroupId, TrainingStatus, TrainingStatusKind,
};
use crate::recognition::domain::quality::QualityForRecognition;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const API_PREFIX: &str = "/face/v1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds an authenticated client for the Face REST API.
///
/// The key is not checked here; a bad key surfaces as a 401 service error
/// on the first call.
pub fn authenticate(endpoint: &str, key: &str) -> Result<HttpFaceClient, FaceApiError> {
    HttpFaceClient::new(endpoint, key)
}

/// `FaceClient` over the documented Face REST API (v1.0), blocking.
pub struct HttpFaceClient {
    http: Client,
    endpoint: String,
    key: String,
}

impl HttpFaceClient {
    pub fn new(endpoint: &str, key: &str) -> Result<Self, FaceApiError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let key = key.trim();
        if endpoint.is_empty() || key.is_empty() {
            return Err(FaceApiError::InvalidCredentials);
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FaceApiError::Transport {
                operation: "build_client",
                source: Box::new(e),
            })?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.endpoint)
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response, FaceApiError> {
        log::debug!("{operation}: sending request");
        let response = request
            .header(KEY_HEADER, &self.key)
            .send()
            .map_err(|e| FaceApiError::Transport {
                operation,
                source: Box::new(e),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(service_error(operation, status.as_u16(), &body))
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, FaceApiError> {
        self.send(operation, request)?
            .json()
            .map_err(|e| FaceApiError::Decode {
                operation,
                source: Box::new(e),
            })
    }
}

/// Maps a non-2xx response to `FaceApiError::Service`, reading the
/// `{"error": {"code", "message"}}` envelope when the body has one.
fn service_error(operation: &'static str, status: u16, body: &str) -> FaceApiError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown")
                .to_string(),
            body.trim().to_string(),
        ),
    };
    FaceApiError::Service {
        operation,
        status,
        code,
        message,
    }
}

impl FaceClient for HttpFaceClient {
    fn create_person_group(&self, group: &PersonGroup) -> Result<(), FaceApiError> {
        let request = self
            .http
            .put(self.url(&format!("/persongroups/{}", group.id)))
            .json(&json!({
                "name": group.name,
                "recognitionModel": group.recognition_model,
            }));
        self.send("create_person_group", request).map(drop)
    }

    fn delete_person_group(&self, group_id: &PersonGroupId) -> Result<(), FaceApiError> {
        let request = self.http.delete(self.url(&format!("/persongroups/{group_id}")));
        self.send("delete_person_group", request).map(drop)
    }

    fn create_person(&self, group_id: &PersonGroupId, name: &str) -> Result<Person, FaceApiError> {
        let request = self
            .http
            .post(self.url(&format!("/persongroups/{group_id}/persons")))
            .json(&json!({ "name": name }));
        let created: CreatedPersonWire = self.send_json("create_person", request)?;
        Ok(Person {
            person_id: created.person_id,
            name: name.to_string(),
            persisted_face_ids: Vec::new(),
            user_data: None,
        })
    }

    fn get_person(
        &self,
        group_id: &PersonGroupId,
        person_id: Uuid,
    ) -> Result<Person, FaceApiError> {
        let request = self
            .http
            .get(self.url(&format!("/persongroups/{group_id}/persons/{person_id}")));
        let person: PersonWire = self.send_json("get_person", request)?;
        Ok(person.into())
    }

    fn add_face_from_url(
        &self,
        group_id: &PersonGroupId,
        person_id: Uuid,
        image_url: &str,
        user_data: Option<&str>,
    ) -> Result<PersistedFace, FaceApiError> {
        let mut request = self
            .http
            .post(self.url(&format!(
                "/persongroups/{group_id}/persons/{person_id}/persistedfaces"
            )))
            .json(&json!({ "url": image_url }));
        if let Some(data) = user_data {
            request = request.query(&[("userData", data)]);
        }
        let face: PersistedFaceWire = self.send_json("add_face_from_url", request)?;
        Ok(PersistedFace {
            persisted_face_id: face.persisted_face_id,
        })
    }

    fn train_person_group(&self, group_id: &PersonGroupId) -> Result<(), FaceApiError> {
        let request = self
            .http
            .post(self.url(&format!("/persongroups/{group_id}/train")));
        self.send("train_person_group", request).map(drop)
    }

    fn get_training_status(
        &self,
        group_id: &PersonGroupId,
    ) -> Result<TrainingStatus, FaceApiError> {
        let request = self
            .http
            .get(self.url(&format!("/persongroups/{group_id}/training")));
        let status: TrainingStatusWire = self.send_json("get_training_status", request)?;
        Ok(status.into())
    }

    fn detect_faces_from_url(
        &self,
        image_url: &str,
        options: &DetectOptions,
    ) -> Result<Vec<DetectedFace>, FaceApiError> {
        let mut query = vec![
            ("returnFaceId", "true"),
            ("recognitionModel", options.recognition_model.as_str()),
            ("detectionModel", options.detection_model.as_str()),
        ];
        if options.return_quality {
            query.push(("returnFaceAttributes", "qualityForRecognition"));
        }
        let request = self
            .http
            .post(self.url("/detect"))
            .query(&query)
            .json(&json!({ "url": image_url }));
        let faces: Vec<DetectedFaceWire> = self.send_json("detect_faces_from_url", request)?;
        Ok(faces.into_iter().filter_map(DetectedFaceWire::into_domain).collect())
    }

    fn identify(
        &self,
        group_id: &PersonGroupId,
        face_ids: &[Uuid],
    ) -> Result<Vec<IdentifyResult>, FaceApiError> {
        let request = self.http.post(self.url("/identify")).json(&json!({
            "personGroupId": group_id.as_str(),
            "faceIds": face_ids,
        }));
        let results: Vec<IdentifyResultWire> = self.send_json("identify", request)?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    fn verify_face_to_person(
        &self,
        face_id: Uuid,
        person_id: Uuid,
        group_id: &PersonGroupId,
    ) -> Result<VerifyResult, FaceApiError> {
        let request = self.http.post(self.url("/verify")).json(&json!({
            "faceId": face_id,
            "personId": person_id,
            "personGroupId": group_id.as_str(),
        }));
        let result: VerifyWire = self.send_json("verify_face_to_person", request)?;
        Ok(VerifyResult {
            is_identical: result.is_identical,
            confidence: result.confidence,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPersonWire {
    person_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonWire {
    person_id: Uuid,
    name: String,
    #[serde(default)]
    persisted_face_ids: Vec<Uuid>,
    user_data: Option<String>,
}

impl From<PersonWire> for Person {
    fn from(w: PersonWire) -> Self {
        Person {
            person_id: w.person_id,
            name: w.name,
            persisted_face_ids: w.persisted_face_ids,
            user_data: w.user_data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedFaceWire {
    persisted_face_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TrainingStatusKindWire {
    #[serde(alias = "notStarted")]
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Deserialize)]
struct TrainingStatusWire {
    status: TrainingStatusKindWire,
    message: Option<String>,
}

impl From<TrainingStatusWire> for TrainingStatus {
    fn from(w: TrainingStatusWire) -> Self {
        let status = match w.status {
            TrainingStatusKindWire::NotStarted => TrainingStatusKind::NotStarted,
            TrainingStatusKindWire::Running => TrainingStatusKind::Running,
            TrainingStatusKindWire::Succeeded => TrainingStatusKind::Succeeded,
            TrainingStatusKindWire::Failed => TrainingStatusKind::Failed,
        };
        TrainingStatus {
            status,
            message: w.message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedFaceWire {
    face_id: Option<Uuid>,
    face_rectangle: Option<FaceRectangleWire>,
    face_attributes: Option<FaceAttributesWire>,
}

#[derive(Debug, Deserialize)]
struct FaceRectangleWire {
    top: u32,
    left: u32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceAttributesWire {
    quality_for_recognition: Option<QualityForRecognition>,
}

impl DetectedFaceWire {
    /// Faces without an id cannot be identified, so they are dropped.
    fn into_domain(self) -> Option<DetectedFace> {
        let Some(face_id) = self.face_id else {
            log::warn!("Detect returned a face without faceId; ignoring it");
            return None;
        };
        Some(DetectedFace {
            face_id,
            rectangle: self.face_rectangle.map(|r| FaceRectangle {
                left: r.left,
                top: r.top,
                width: r.width,
                height: r.height,
            }),
            quality: self.face_attributes.and_then(|a| a.quality_for_recognition),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateWire {
    person_id: Uuid,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyResultWire {
    face_id: Uuid,
    #[serde(default)]
    candidates: Vec<CandidateWire>,
}

impl From<IdentifyResultWire> for IdentifyResult {
    fn from(w: IdentifyResultWire) -> Self {
        IdentifyResult {
            face_id: w.face_id,
            candidates: w
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    person_id: c.person_id,
                    confidence: c.confidence,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyWire {
    is_identical: bool,
    confidence: f64,
}
