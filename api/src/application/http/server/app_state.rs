use std::sync::Arc;

use nutritot_core::application::NutritotService;

use crate::args::ServerArgs;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<ServerArgs>,
    pub service: NutritotService,
}

impl AppState {
    pub fn new(args: Arc<ServerArgs>, service: NutritotService) -> Self {
        Self { args, service }
    }
}
