use juici::service::ResponseService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ResponseService>,
    /// Largest request body the upload route accepts
    pub upload_limit_bytes: usize,
}

impl AppState {
    pub fn new<S: ResponseService + 'static>(service: S, upload_limit_bytes: usize) -> Self {
        Self {
            service: Arc::new(service),
            upload_limit_bytes,
        }
    }
}
