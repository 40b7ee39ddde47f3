pub mod detected_face;
pub mod face_client;
pub mod identification;
pub mod image_ref;
pub mod person_group;
pub mod quality;
pub mod quality_gated_detector;
