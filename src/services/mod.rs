use std::sync::Arc;

use actix_web::web;

mod cooldown;
mod proxy;

pub use cooldown::CooldownService;
pub use proxy::ProxyService;

use crate::{config::Config, repositories::CooldownRepository, store::Store};

/// Service Register
pub fn register(store: Store, proxy: ProxyService, config: &Config, cfg: &mut web::ServiceConfig) {
    // create repository
    let cooldown_repository = CooldownRepository::new(store);
    let cooldown_service = CooldownService::new(
        Arc::new(cooldown_repository),
        config.cooldown.window(),
        config.cooldown.retention(),
    );
    cfg.app_data(web::Data::new(cooldown_service));
    cfg.app_data(web::Data::new(proxy));
}
