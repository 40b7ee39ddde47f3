use std::sync::Arc;

use uuid::Uuid;

use crate::recognition::domain::face_client::FaceClient;
use crate::recognition::domain::identification::{IdentifyResult, VerifyResult};
use crate::recognition::domain::image_ref::ImageRef;
use crate::recognition::domain::person_group::{Person, PersonGroup};
use crate::recognition::domain::quality_gated_detector::QualityGatedDetector;
use crate::shared::constants::MAX_IDENTIFY_FACE_IDS;

use super::run_error::RunError;
use super::run_logger::{timed, RunLogger};

/// What happened to one face found in the target image.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceOutcome {
    NoMatch {
        face_id: Uuid,
    },
    Identified {
        face_id: Uuid,
        person: Person,
        confidence: f64,
        /// `None` when verification was switched off.
        verification: Option<VerifyResult>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationReport {
    pub image: String,
    pub outcomes: Vec<FaceOutcome>,
}

impl IdentificationReport {
    pub fn identified(&self) -> impl Iterator<Item = &FaceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FaceOutcome::Identified { .. }))
    }
}

/// Identifies the faces of a target image against a trained group and
/// verifies each face against its best candidate.
pub struct IdentifyFacesUseCase {
    client: Arc<dyn FaceClient>,
    detector: QualityGatedDetector,
    verify: bool,
}

impl IdentifyFacesUseCase {
    pub fn new(client: Arc<dyn FaceClient>, detector: QualityGatedDetector, verify: bool) -> Self {
        Self {
            client,
            detector,
            verify,
        }
    }

    pub fn execute(
        &self,
        group: &PersonGroup,
        target: &ImageRef,
        logger: &mut dyn RunLogger,
    ) -> Result<IdentificationReport, RunError> {
        let scan = timed(logger, "detect", || {
            self.detector.scan(&target.url, &group.recognition_model)
        })?;
        logger.info(&scan.describe(&target.url));
        let faces = scan.sufficient;

        let mut report = IdentificationReport {
            image: target.name.clone(),
            outcomes: Vec::with_capacity(faces.len()),
        };
        if faces.is_empty() {
            log::warn!("No usable faces in `{}`; nothing to identify", target.name);
            return Ok(report);
        }

        let face_ids: Vec<Uuid> = faces.iter().map(|f| f.face_id).collect();
        let mut results = Vec::with_capacity(face_ids.len());
        for batch in face_ids.chunks(MAX_IDENTIFY_FACE_IDS) {
            results.extend(timed(logger, "identify", || {
                self.client.identify(&group.id, batch)
            })?);
        }

        for result in &results {
            report.outcomes.push(self.resolve(group, &target.name, result, logger)?);
        }
        logger.info("");

        Ok(report)
    }

    fn resolve(
        &self,
        group: &PersonGroup,
        image: &str,
        result: &IdentifyResult,
        logger: &mut dyn RunLogger,
    ) -> Result<FaceOutcome, RunError> {
        let Some(top) = result.top_candidate() else {
            logger.info(&format!(
                "No person is identified for the face in: {image} - {}",
                result.face_id
            ));
            return Ok(FaceOutcome::NoMatch {
                face_id: result.face_id,
            });
        };

        let person = timed(logger, "get_person", || {
            self.client.get_person(&group.id, top.person_id)
        })?;
        logger.info(&format!(
            "Person '{}' is identified for the face in: {image} - {}, confidence: {:.6}.",
            person.name, result.face_id, top.confidence
        ));

        let verification = if self.verify {
            let verified = timed(logger, "verify", || {
                self.client
                    .verify_face_to_person(result.face_id, top.person_id, &group.id)
            })?;
            logger.info(&format!(
                "Verification result: is a match? {}. confidence: {:.6}.",
                verified.is_identical, verified.confidence
            ));
            Some(verified)
        } else {
            None
        };

        Ok(FaceOutcome::Identified {
            face_id: result.face_id,
            person,
            confidence: top.confidence,
            verification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_logger::{NullRunLogger, StdoutRunLogger};
    use crate::recognition::domain::identification::Candidate;
    use crate::recognition::domain::person_group::PersonGroupId;
    use crate::recognition::domain::quality::QualityForRecognition::{High, Low, Medium};
    use crate::testing::{face, Call, ScriptedFaceClient};

    const TARGET: &str = "https://img.example/identification1.jpg";

    fn group() -> PersonGroup {
        PersonGroup {
            id: PersonGroupId::new("group-1"),
            name: "group-1".into(),
            recognition_model: "recognition_04".into(),
        }
    }

    fn target() -> ImageRef {
        ImageRef::new("identification1.jpg", TARGET)
    }

    fn staged_person(n: u128, name: &str) -> Person {
        Person {
            person_id: Uuid::from_u128(n),
            name: name.into(),
            persisted_face_ids: vec![],
            user_data: None,
        }
    }

    fn candidate(n: u128, confidence: f64) -> Candidate {
        Candidate {
            person_id: Uuid::from_u128(n),
            confidence,
        }
    }

    fn use_case(client: ScriptedFaceClient, verify: bool) -> (Arc<ScriptedFaceClient>, IdentifyFacesUseCase) {
        let client = Arc::new(client);
        let detector = QualityGatedDetector::new(client.clone(), "detection_03");
        (client.clone(), IdentifyFacesUseCase::new(client, detector, verify))
    }

    #[test]
    fn test_empty_candidates_report_no_match_without_verify() {
        let client = ScriptedFaceClient::new().with_faces(TARGET, vec![face(1, High)]);
        let (client, uc) = use_case(client, true);
        let mut logger = StdoutRunLogger::new();

        let report = uc.execute(&group(), &target(), &mut logger).unwrap();

        assert_eq!(
            report.outcomes,
            vec![FaceOutcome::NoMatch {
                face_id: Uuid::from_u128(1)
            }]
        );
        assert_eq!(client.count(|c| matches!(c, Call::Verify { .. })), 0);
        assert!(logger
            .messages()
            .iter()
            .any(|m| m.starts_with("No person is identified for the face in: identification1.jpg")));
    }

    #[test]
    fn test_detection_counts_reach_console() {
        let client = ScriptedFaceClient::new().with_faces(TARGET, vec![face(1, High), face(2, Low)]);
        let (_, uc) = use_case(client, true);
        let mut logger = StdoutRunLogger::new();

        uc.execute(&group(), &target(), &mut logger).unwrap();

        assert!(logger.messages().contains(&format!(
            "2 face(s) with 1 having sufficient quality for recognition detected from image `{TARGET}`"
        )));
    }

    #[test]
    fn test_candidates_verify_once_with_top_person() {
        let client = ScriptedFaceClient::new()
            .with_faces(TARGET, vec![face(1, High)])
            .with_candidates(Uuid::from_u128(1), vec![candidate(7, 0.9), candidate(8, 0.4)])
            .with_person(staged_person(7, "Family1-Dad"))
            .with_person(staged_person(8, "Family1-Son"));
        let (client, uc) = use_case(client, true);

        let report = uc.execute(&group(), &target(), &mut NullRunLogger).unwrap();

        let verifies: Vec<Call> = client
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Verify { .. }))
            .collect();
        assert_eq!(
            verifies,
            vec![Call::Verify {
                face_id: Uuid::from_u128(1),
                person_id: Uuid::from_u128(7),
            }]
        );
        match &report.outcomes[0] {
            FaceOutcome::Identified {
                person,
                confidence,
                verification,
                ..
            } => {
                assert_eq!(person.name, "Family1-Dad");
                assert!((confidence - 0.9).abs() < f64::EPSILON);
                assert!(verification.unwrap().is_identical);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_identify_receives_only_sufficient_faces() {
        let client = ScriptedFaceClient::new().with_faces(
            TARGET,
            vec![face(1, High), face(2, Low), face(3, Medium)],
        );
        let (client, uc) = use_case(client, true);

        uc.execute(&group(), &target(), &mut NullRunLogger).unwrap();

        let identify: Vec<Call> = client
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Identify(_)))
            .collect();
        assert_eq!(
            identify,
            vec![Call::Identify(vec![Uuid::from_u128(1), Uuid::from_u128(3)])]
        );
    }

    #[test]
    fn test_no_faces_skips_identify() {
        let (client, uc) = use_case(ScriptedFaceClient::new(), true);

        let report = uc.execute(&group(), &target(), &mut NullRunLogger).unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(client.count(|c| matches!(c, Call::Identify(_))), 0);
    }

    #[test]
    fn test_identify_is_batched_by_ten() {
        let faces = (0..23).map(|n| face(n, High)).collect();
        let client = ScriptedFaceClient::new().with_faces(TARGET, faces);
        let (client, uc) = use_case(client, true);

        let report = uc.execute(&group(), &target(), &mut NullRunLogger).unwrap();

        let sizes: Vec<usize> = client
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Identify(ids) => Some(ids.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(report.outcomes.len(), 23);
    }

    #[test]
    fn test_verify_disabled_makes_no_verify_calls() {
        let client = ScriptedFaceClient::new()
            .with_faces(TARGET, vec![face(1, High)])
            .with_candidates(Uuid::from_u128(1), vec![candidate(7, 0.8)])
            .with_person(staged_person(7, "Family2-Lady"));
        let (client, uc) = use_case(client, false);

        let report = uc.execute(&group(), &target(), &mut NullRunLogger).unwrap();

        assert_eq!(client.count(|c| matches!(c, Call::Verify { .. })), 0);
        assert_eq!(report.identified().count(), 1);
    }

    #[test]
    fn test_unknown_person_error_propagates() {
        let client = ScriptedFaceClient::new()
            .with_faces(TARGET, vec![face(1, High)])
            .with_candidates(Uuid::from_u128(1), vec![candidate(99, 0.8)]);
        let (client, uc) = use_case(client, true);

        let err = uc.execute(&group(), &target(), &mut NullRunLogger).unwrap_err();

        assert!(matches!(err, RunError::Api(ref e) if e.status() == Some(404)));
        assert_eq!(client.count(|c| matches!(c, Call::Verify { .. })), 0);
    }
}
