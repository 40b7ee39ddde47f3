use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::recognition::domain::face_client::FaceClient;
use crate::recognition::domain::image_ref::ImageRef;
use crate::recognition::domain::person_group::{PersonGroup, PersonGroupId, TrainingStatusKind};
use crate::recognition::domain::quality_gated_detector::QualityGatedDetector;
use crate::shared::clock::Clock;

use super::run_error::RunError;
use super::run_logger::{timed, RunLogger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonImages {
    pub label: String,
    pub images: Vec<ImageRef>,
}

/// Pacing and deadline for the enrollment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentTiming {
    pub person_create_delay: Duration,
    pub training_poll_interval: Duration,
    /// `None` polls until a terminal status.
    pub training_timeout: Option<Duration>,
}

/// Lifecycle of a group within one enrollment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentState {
    Pending,
    Created,
    PersonsEnrolled,
    Training,
    Trained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoFaces,
    BelowHighQuality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrolledPerson {
    pub label: String,
    pub person_id: Uuid,
    pub enrolled: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentReport {
    pub persons: Vec<EnrolledPerson>,
    pub training_polls: usize,
}

/// Creates a person group, enrolls every person's high-quality images,
/// trains the group, and waits for training to finish.
///
/// `Pending -> Created -> PersonsEnrolled -> Training -> Trained`. Any
/// error aborts the run and leaves the state where it stopped.
pub struct EnrollGroupUseCase {
    client: Arc<dyn FaceClient>,
    detector: QualityGatedDetector,
    clock: Arc<dyn Clock>,
    timing: EnrollmentTiming,
    state: EnrollmentState,
}

impl EnrollGroupUseCase {
    pub fn new(
        client: Arc<dyn FaceClient>,
        detector: QualityGatedDetector,
        clock: Arc<dyn Clock>,
        timing: EnrollmentTiming,
    ) -> Self {
        Self {
            client,
            detector,
            clock,
            timing,
            state: EnrollmentState::Pending,
        }
    }

    pub fn state(&self) -> EnrollmentState {
        self.state
    }

    pub fn execute(
        &mut self,
        group: &PersonGroup,
        persons: &[PersonImages],
        logger: &mut dyn RunLogger,
    ) -> Result<EnrollmentReport, RunError> {
        logger.info(&format!("Create a person group ({}).", group.id));
        timed(logger, "create_group", || self.client.create_person_group(group))?;
        self.transition(EnrollmentState::Created);

        let mut enrolled = Vec::with_capacity(persons.len());
        for person in persons {
            enrolled.push(self.enroll_person(group, person, logger)?);
        }
        self.transition(EnrollmentState::PersonsEnrolled);

        logger.info("");
        logger.info(&format!("Train person group {}.", group.id));
        timed(logger, "train", || self.client.train_person_group(&group.id))?;
        self.transition(EnrollmentState::Training);

        let polls = self.wait_for_training(&group.id, logger)?;
        self.transition(EnrollmentState::Trained);
        logger.info("");

        Ok(EnrollmentReport {
            persons: enrolled,
            training_polls: polls,
        })
    }

    fn enroll_person(
        &self,
        group: &PersonGroup,
        person: &PersonImages,
        logger: &mut dyn RunLogger,
    ) -> Result<EnrolledPerson, RunError> {
        self.clock.sleep(self.timing.person_create_delay);
        let created = timed(logger, "create_person", || {
            self.client.create_person(&group.id, &person.label)
        })?;
        logger.info(&format!("Create a person group person '{}'.", person.label));

        let mut result = EnrolledPerson {
            label: person.label.clone(),
            person_id: created.person_id,
            enrolled: Vec::new(),
            skipped: Vec::new(),
        };

        for image in &person.images {
            logger.info("Check whether image is of sufficient quality for recognition");
            let scan = timed(logger, "detect", || {
                self.detector.scan(&image.url, &group.recognition_model)
            })?;
            logger.info(&scan.describe(&image.url));

            if !scan.is_enrollable() {
                let reason = if scan.detected.is_empty() {
                    SkipReason::NoFaces
                } else {
                    SkipReason::BelowHighQuality
                };
                log::warn!("Skipping `{}` for '{}': {:?}", image.name, person.label, reason);
                result.skipped.push((image.name.clone(), reason));
                continue;
            }

            logger.info(&format!(
                "Add face to the person group person({}) from image `{}`",
                person.label, image.name
            ));
            timed(logger, "add_face", || {
                self.client.add_face_from_url(
                    &group.id,
                    created.person_id,
                    &image.url,
                    Some(&image.name),
                )
            })?;
            result.enrolled.push(image.name.clone());
        }

        Ok(result)
    }

    /// Polls training status until it succeeds, sleeping one interval
    /// before each poll. Returns the number of polls made.
    pub fn wait_for_training(
        &self,
        group_id: &PersonGroupId,
        logger: &mut dyn RunLogger,
    ) -> Result<usize, RunError> {
        let interval = self.timing.training_poll_interval;
        let mut waited = Duration::ZERO;
        let mut polls = 0;

        loop {
            self.clock.sleep(interval);
            waited += interval;

            let status = timed(logger, "poll", || self.client.get_training_status(group_id))?;
            polls += 1;
            logger.info(&format!("Training status: {}.", status.status));

            match status.status {
                TrainingStatusKind::Succeeded => return Ok(polls),
                TrainingStatusKind::Failed => {
                    return Err(RunError::TrainingFailed {
                        group_id: group_id.clone(),
                        message: status
                            .message
                            .unwrap_or_else(|| "no failure detail returned".to_string()),
                    });
                }
                TrainingStatusKind::NotStarted | TrainingStatusKind::Running => {
                    if self.timing.training_timeout.is_some_and(|limit| waited >= limit) {
                        return Err(RunError::TrainingTimedOut {
                            group_id: group_id.clone(),
                            polls,
                            waited_secs: waited.as_secs_f64(),
                        });
                    }
                }
            }
        }
    }

    fn transition(&mut self, next: EnrollmentState) {
        log::debug!("Enrollment state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
