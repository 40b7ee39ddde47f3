pub mod enroll_group_use_case;
pub mod identify_faces_use_case;
pub mod quickstart_use_case;
pub mod run_error;
pub mod run_logger;
