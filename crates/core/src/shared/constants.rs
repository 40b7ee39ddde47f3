pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/Azure-Samples/cognitive-services-sample-data-files/master/Face/images/";

/// Group photo containing some of the sample persons.
pub const DEFAULT_TARGET_IMAGE: &str = "identification1.jpg";

/// Recognition model 4 scores masked faces better than model 3.
pub const RECOGNITION_MODEL: &str = "recognition_04";
/// Detection model that supports the quality-for-recognition attribute.
pub const DETECTION_MODEL: &str = "detection_03";

pub const ENV_KEY: &str = "VISION_KEY";
pub const ENV_ENDPOINT: &str = "VISION_ENDPOINT";

/// Pause before each person creation to stay under the service's TPS limit.
pub const PERSON_CREATE_DELAY_MS: u64 = 250;
pub const TRAINING_POLL_INTERVAL_MS: u64 = 1000;
pub const TRAINING_TIMEOUT_SECS: u64 = 300;

/// Identify accepts at most this many face ids per request.
pub const MAX_IDENTIFY_FACE_IDS: usize = 10;

/// Sample persons, each with two photos, under `DEFAULT_IMAGE_BASE_URL`.
pub const SAMPLE_PERSONS: &[(&str, &[&str])] = &[
    ("Family1-Dad", &["Family1-Dad1.jpg", "Family1-Dad2.jpg"]),
    ("Family1-Mom", &["Family1-Mom1.jpg", "Family1-Mom2.jpg"]),
    ("Family1-Son", &["Family1-Son1.jpg", "Family1-Son2.jpg"]),
    ("Family1-Daughter", &["Family1-Daughter1.jpg", "Family1-Daughter2.jpg"]),
    ("Family2-Lady", &["Family2-Lady1.jpg", "Family2-Lady2.jpg"]),
    ("Family2-Man", &["Family2-Man1.jpg", "Family2-Man2.jpg"]),
];
