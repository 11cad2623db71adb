//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Es genérico sobre el almacenamiento para
//! que los tests corran contra el store en memoria.

use crate::config::environment::EnvironmentConfig;
use crate::store::EntityStore;

#[derive(Clone)]
pub struct AppState<S: EntityStore> {
    pub store: S,
    pub config: EnvironmentConfig,
}

impl<S: EntityStore> AppState<S> {
    pub fn new(store: S, config: EnvironmentConfig) -> Self {
        Self { store, config }
    }
}
