pub mod candidate_service;
pub mod upload_service;
