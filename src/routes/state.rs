use std::sync::Arc;

use crate::{
    db::{CatalogStore, CounterStore, UserStore},
    services::{auth::AuthSettings, ProfileBuilder, DEFAULT_TOP_N},
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub counters: Arc<dyn CounterStore>,
    pub profile_builder: Arc<ProfileBuilder>,
    pub auth: Arc<AuthSettings>,
    pub default_top_n: usize,
}

impl AppState {
    /// Builds state around one store that backs every storage trait, using
    /// the reference survey configuration
    pub fn new<S>(store: S, auth: AuthSettings) -> Self
    where
        S: CatalogStore + UserStore + CounterStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            catalog: store.clone(),
            users: store.clone(),
            counters: store,
            profile_builder: Arc::new(ProfileBuilder::reference()),
            auth: Arc::new(auth),
            default_top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn with_profile_builder(mut self, builder: ProfileBuilder) -> Self {
        self.profile_builder = Arc::new(builder);
        self
    }
}
