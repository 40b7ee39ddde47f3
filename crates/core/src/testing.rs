//! Scripted collaborators shared by the use-case tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;

use crate::recognition::domain::detected_face::{DetectOptions, DetectedFace};
use crate::recognition::domain::face_client::{FaceApiError, FaceClient};
use crate::recognition::domain::identification::{Candidate, IdentifyResult, VerifyResult};
use crate::recognition::domain::person_group::{
    PersistedFace, Person, PersonGroup, PersonGroupId, TrainingStatus, TrainingStatusKind,
};
use crate::recognition::domain::quality::QualityForRecognition;
use crate::shared::clock::Clock;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateGroup(String),
    DeleteGroup(String),
    CreatePerson(String),
    GetPerson(Uuid),
    AddFace { person_id: Uuid, url: String, user_data: Option<String> },
    Train,
    GetTrainingStatus,
    Detect { url: String, options: DetectOptions },
    Identify(Vec<Uuid>),
    Verify { face_id: Uuid, person_id: Uuid },
}

/// In-memory `FaceClient` that replays staged answers and records calls.
#[derive(Default)]
pub struct ScriptedFaceClient {
    detections: HashMap<String, Vec<DetectedFace>>,
    candidates: HashMap<Uuid, Vec<Candidate>>,
    staged_persons: HashMap<Uuid, Person>,
    verify: Option<VerifyResult>,
    fail_on: Option<&'static str>,
    training: Mutex<VecDeque<TrainingStatus>>,
    created: Mutex<Vec<Person>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedFaceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faces(mut self, url: &str, faces: Vec<DetectedFace>) -> Self {
        self.detections.insert(url.to_string(), faces);
        self
    }

    pub fn with_training(self, statuses: &[TrainingStatusKind]) -> Self {
        *self.training.lock().unwrap() = statuses.iter().map(|s| TrainingStatus::new(*s)).collect();
        self
    }

    pub fn with_training_status(self, status: TrainingStatus) -> Self {
        self.training.lock().unwrap().push_back(status);
        self
    }

    pub fn with_candidates(mut self, face_id: Uuid, candidates: Vec<Candidate>) -> Self {
        self.candidates.insert(face_id, candidates);
        self
    }

    pub fn with_person(mut self, person: Person) -> Self {
        self.staged_persons.insert(person.person_id, person);
        self
    }

    pub fn with_verify(mut self, result: VerifyResult) -> Self {
        self.verify = Some(result);
        self
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|&c| pred(c)).count()
    }

    pub fn add_face_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::AddFace { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), FaceApiError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(operation) {
            return Err(service_error(operation, 500, "InternalServerError"));
        }
        Ok(())
    }
}

pub fn service_error(operation: &'static str, status: u16, code: &str) -> FaceApiError {
    FaceApiError::Service {
        operation,
        status,
        code: code.to_string(),
        message: format!("scripted {operation} failure"),
    }
}

pub fn face(n: u128, quality: QualityForRecognition) -> DetectedFace {
    DetectedFace::new(Uuid::from_u128(n), Some(quality))
}

impl FaceClient for ScriptedFaceClient {
    fn create_person_group(&self, group: &PersonGroup) -> Result<(), FaceApiError> {
        self.record("create_person_group", Call::CreateGroup(group.id.to_string()))
    }

    fn delete_person_group(&self, group_id: &PersonGroupId) -> Result<(), FaceApiError> {
        self.record("delete_person_group", Call::DeleteGroup(group_id.to_string()))
    }

    fn create_person(&self, _group_id: &PersonGroupId, name: &str) -> Result<Person, FaceApiError> {
        self.record("create_person", Call::CreatePerson(name.to_string()))?;
        let mut created = self.created.lock().unwrap();
        let person = Person {
            person_id: Uuid::from_u128(1000 + created.len() as u128),
            name: name.to_string(),
            persisted_face_ids: Vec::new(),
            user_data: None,
        };
        created.push(person.clone());
        Ok(person)
    }

    fn get_person(
        &self,
        _group_id: &PersonGroupId,
        person_id: Uuid,
    ) -> Result<Person, FaceApiError> {
        self.record("get_person", Call::GetPerson(person_id))?;
        if let Some(p) = self.staged_persons.get(&person_id) {
            return Ok(p.clone());
        }
        self.created
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.person_id == person_id)
            .cloned()
            .ok_or_else(|| service_error("get_person", 404, "PersonNotFound"))
    }

    fn add_face_from_url(
        &self,
        _group_id: &PersonGroupId,
        person_id: Uuid,
        image_url: &str,
        user_data: Option<&str>,
    ) -> Result<PersistedFace, FaceApiError> {
        self.record(
            "add_face_from_url",
            Call::AddFace {
                person_id,
                url: image_url.to_string(),
                user_data: user_data.map(str::to_string),
            },
        )?;
        Ok(PersistedFace {
            persisted_face_id: Uuid::new_v4(),
        })
    }

    fn train_person_group(&self, _group_id: &PersonGroupId) -> Result<(), FaceApiError> {
        self.record("train_person_group", Call::Train)
    }

    fn get_training_status(
        &self,
        _group_id: &PersonGroupId,
    ) -> Result<TrainingStatus, FaceApiError> {
        self.record("get_training_status", Call::GetTrainingStatus)?;
        Ok(self
            .training
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TrainingStatus::new(TrainingStatusKind::Succeeded)))
    }

    fn detect_faces_from_url(
        &self,
        image_url: &str,
        options: &DetectOptions,
    ) -> Result<Vec<DetectedFace>, FaceApiError> {
        self.record(
            "detect_faces_from_url",
            Call::Detect {
                url: image_url.to_string(),
                options: options.clone(),
            },
        )?;
        Ok(self.detections.get(image_url).cloned().unwrap_or_default())
    }

    fn identify(
        &self,
        _group_id: &PersonGroupId,
        face_ids: &[Uuid],
    ) -> Result<Vec<IdentifyResult>, FaceApiError> {
        self.record("identify", Call::Identify(face_ids.to_vec()))?;
        Ok(face_ids
            .iter()
            .map(|id| IdentifyResult {
                face_id: *id,
                candidates: self.candidates.get(id).cloned().unwrap_or_default(),
            })
            .collect())
    }

    fn verify_face_to_person(
        &self,
        face_id: Uuid,
        person_id: Uuid,
        _group_id: &PersonGroupId,
    ) -> Result<VerifyResult, FaceApiError> {
        self.record("verify_face_to_person", Call::Verify { face_id, person_id })?;
        Ok(self.verify.unwrap_or(VerifyResult {
            is_identical: true,
            confidence: 0.9,
        }))
    }
}

/// Clock that records requested sleeps instead of blocking.
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
