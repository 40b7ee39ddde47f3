use std::sync::Arc;

use crate::recognition::domain::face_client::FaceClient;
use crate::recognition::domain::image_ref::ImageRef;
use crate::recognition::domain::person_group::{PersonGroup, PersonGroupId};
use crate::recognition::domain::quality_gated_detector::QualityGatedDetector;
use crate::shared::clock::Clock;
use crate::shared::run_config::RunConfig;

use super::enroll_group_use_case::{
    EnrollGroupUseCase, EnrollmentReport, EnrollmentState, EnrollmentTiming, PersonImages,
};
use super::identify_faces_use_case::{IdentificationReport, IdentifyFacesUseCase};
use super::run_error::RunError;
use super::run_logger::{timed, RunLogger};

#[derive(Debug, Clone, PartialEq)]
pub struct QuickstartReport {
    pub group: PersonGroup,
    pub enrollment: EnrollmentReport,
    pub identification: IdentificationReport,
}

/// Full quickstart flow: enroll the configured persons into a new group,
/// then identify (and verify) the faces of the target image against it.
pub struct QuickstartUseCase {
    client: Arc<dyn FaceClient>,
    clock: Arc<dyn Clock>,
    config: RunConfig,
    verify: bool,
    cleanup: bool,
}

impl QuickstartUseCase {
    pub fn new(client: Arc<dyn FaceClient>, clock: Arc<dyn Clock>, config: RunConfig) -> Self {
        Self {
            client,
            clock,
            config,
            verify: true,
            cleanup: false,
        }
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Delete the person group once the run is over, whatever its outcome,
    /// provided this run created it.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn execute(
        &self,
        group_id: PersonGroupId,
        logger: &mut dyn RunLogger,
    ) -> Result<QuickstartReport, RunError> {
        logger.info("========IDENTIFY FACES========");
        logger.info("");

        let group = PersonGroup {
            name: group_id.to_string(),
            id: group_id,
            recognition_model: self.config.recognition_model.clone(),
        };

        let mut enroll = self.enroll_use_case();
        let result = self.run(&mut enroll, &group, logger);

        if self.cleanup && enroll.state() == EnrollmentState::Pending {
            log::warn!("Person group {} was not created by this run; leaving it", group.id);
        } else if self.cleanup {
            match timed(logger, "delete_group", || self.client.delete_person_group(&group.id)) {
                Ok(()) => log::info!("Deleted person group {}", group.id),
                Err(e) => log::warn!("Could not delete person group {}: {e}", group.id),
            }
        }

        let (enrollment, identification) = result?;
        Ok(QuickstartReport {
            group,
            enrollment,
            identification,
        })
    }

    fn run(
        &self,
        enroll: &mut EnrollGroupUseCase,
        group: &PersonGroup,
        logger: &mut dyn RunLogger,
    ) -> Result<(EnrollmentReport, IdentificationReport), RunError> {
        let enrollment = enroll.execute(group, &self.enrollment_plan(), logger)?;

        let identify = IdentifyFacesUseCase::new(self.client.clone(), self.detector(), self.verify);
        let target = ImageRef::new(
            self.config.target_image.clone(),
            self.config.image_url(&self.config.target_image),
        );
        let identification = identify.execute(group, &target, logger)?;

        Ok((enrollment, identification))
    }

    fn enroll_use_case(&self) -> EnrollGroupUseCase {
        EnrollGroupUseCase::new(
            self.client.clone(),
            self.detector(),
            self.clock.clone(),
            EnrollmentTiming {
                person_create_delay: self.config.person_create_delay(),
                training_poll_interval: self.config.training_poll_interval(),
                training_timeout: self.config.training_timeout(),
            },
        )
    }

    fn detector(&self) -> QualityGatedDetector {
        QualityGatedDetector::new(self.client.clone(), self.config.detection_model.clone())
    }

    fn enrollment_plan(&self) -> Vec<PersonImages> {
        self.config
            .persons
            .iter()
            .map(|(label, images)| PersonImages {
                label: label.clone(),
                images: images
                    .iter()
                    .map(|name| ImageRef::new(name.clone(), self.config.image_url(name)))
                    .collect(),
            })
            .collect()
    }
}
