use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::providers::Providers;
use crate::services::Resolvers;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub resolvers: Arc<Resolvers>,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn DatabaseBackend>) -> Result<Self> {
        let providers = Providers::new(&config.providers)?;
        let resolvers = Resolvers::new(providers, db.clone(), &config);

        Ok(Self {
            config: Arc::new(config),
            db,
            resolvers: Arc::new(resolvers),
        })
    }
}
