use std::sync::Arc;

use crate::application::auth::{ApiKeyGuard, ApiPrincipal};
use crate::application::catalog::CatalogService;

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    pub auth: Arc<ApiKeyGuard>,
}

impl ApiState {
    pub fn actor_label(principal: &ApiPrincipal) -> String {
        principal.label.clone()
    }
}
