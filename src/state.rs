use crate::service::ClassroomService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassroomService>,
}
