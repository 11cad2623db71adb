//! Almacenamiento de entidades
//!
//! Este módulo define la abstracción de almacenamiento del sistema: entidades
//! versionadas con control de concurrencia optimista y commits atómicos de
//! varias entidades. Hay dos implementaciones: `MemoryStore` (tests y
//! desarrollo) y `PgEntityStore` (PostgreSQL vía sqlx).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgEntityStore;

/// Trait para tipos persistibles como entidades con id propio.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Nombre de la colección (tabla en PostgreSQL, prefijo en memoria).
    const COLLECTION: &'static str;

    /// Identificador único de la entidad.
    fn id(&self) -> &str;
}

/// Entidad leída junto con su versión para control de concurrencia optimista.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: i64,
}

/// Errores del almacenamiento.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found: {collection}:{id}")]
    NotFound { collection: &'static str, id: String },

    #[error("version conflict on {collection}:{id} (expected {expected}, actual {actual})")]
    VersionConflict {
        collection: &'static str,
        id: String,
        expected: i64,
        actual: i64,
    },

    #[error("entity already exists: {collection}:{id}")]
    AlreadyExists { collection: &'static str, id: String },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e.to_string())
    }
}

/// Operación de escritura type-erased dentro de un commit.
#[derive(Debug)]
pub(crate) enum WriteOp {
    Insert {
        collection: &'static str,
        id: String,
        data: serde_json::Value,
    },
    Update {
        collection: &'static str,
        id: String,
        data: serde_json::Value,
        expected_version: i64,
    },
}

/// Lote de escrituras que el almacenamiento aplica de forma atómica: o se
/// aplican todas las operaciones o ninguna. Las actualizaciones llevan la
/// versión esperada; si alguna no coincide, el commit entero falla con
/// `VersionConflict`.
#[derive(Debug, Default)]
pub struct Commit {
    pub(crate) ops: Vec<WriteOp>,
}

impl Commit {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Agregar una inserción al lote.
    pub fn insert<E: Entity>(mut self, entity: &E) -> Result<Self, StoreError> {
        self.ops.push(WriteOp::Insert {
            collection: E::COLLECTION,
            id: entity.id().to_string(),
            data: serde_json::to_value(entity)?,
        });
        Ok(self)
    }

    /// Agregar una actualización con chequeo de versión al lote.
    pub fn update<E: Entity>(mut self, entity: &E, expected_version: i64) -> Result<Self, StoreError> {
        self.ops.push(WriteOp::Update {
            collection: E::COLLECTION,
            id: entity.id().to_string(),
            data: serde_json::to_value(entity)?,
            expected_version,
        });
        Ok(self)
    }
}

/// Almacenamiento duradero de entidades por colección.
#[async_trait]
pub trait EntityStore: Clone + Send + Sync + 'static {
    /// Leer una entidad por id, con su versión actual.
    async fn get<E: Entity>(&self, id: &str) -> Result<Option<Versioned<E>>, StoreError>;

    /// Insertar una entidad nueva. Falla si el id ya existe.
    async fn insert<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError>;

    /// Insertar o reemplazar sin chequeo de versión.
    async fn save<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError>;

    /// Reemplazar una entidad existente si su versión coincide.
    async fn update<E: Entity>(&self, entity: &E, expected_version: i64)
        -> Result<Versioned<E>, StoreError>;

    /// Eliminar por id. Devuelve true si existía.
    async fn delete<E: Entity>(&self, id: &str) -> Result<bool, StoreError>;

    /// Leer la colección completa.
    async fn find_all<E: Entity>(&self) -> Result<Vec<Versioned<E>>, StoreError>;

    /// Aplicar un lote de escrituras de forma atómica.
    async fn commit(&self, commit: Commit) -> Result<(), StoreError>;
}
