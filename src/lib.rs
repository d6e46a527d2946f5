pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::database::candidate_store::CandidateStore;
use crate::services::{candidate_service::CandidateService, upload_service::UploadService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CandidateStore>,
    pub candidate_service: CandidateService,
    pub upload_service: UploadService,
}

impl AppState {
    pub fn new(store: Arc<dyn CandidateStore>, upload_service: UploadService) -> Self {
        let candidate_service = CandidateService::new(store.clone());

        Self {
            store,
            candidate_service,
            upload_service,
        }
    }
}
