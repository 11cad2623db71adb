//! Almacenamiento en memoria
//!
//! Implementación de `EntityStore` sobre un HashMap con clave
//! `"coleccion:id"`. Se usa en tests y en desarrollo local. El commit toma
//! el write lock una sola vez: valida todas las versiones esperadas y recién
//! entonces aplica las escrituras, así un lote nunca queda a medias.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{Commit, Entity, EntityStore, StoreError, Versioned, WriteOp};

#[derive(Debug)]
struct StoredEntity {
    data: serde_json::Value,
    version: i64,
}

/// Store en memoria compartido vía Arc; clonar comparte el mismo contenido.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntity>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn lock_err() -> StoreError {
        StoreError::Backend("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get<E: Entity>(&self, id: &str) -> Result<Option<Versioned<E>>, StoreError> {
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        match entries.get(&Self::key(E::COLLECTION, id)) {
            Some(stored) => {
                let data: E = serde_json::from_value(stored.data.clone())?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError> {
        let key = Self::key(E::COLLECTION, entity.id());
        let data = serde_json::to_value(entity)?;

        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;
        if entries.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                collection: E::COLLECTION,
                id: entity.id().to_string(),
            });
        }
        entries.insert(key, StoredEntity { data, version: 1 });

        Ok(Versioned {
            data: entity.clone(),
            version: 1,
        })
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError> {
        let key = Self::key(E::COLLECTION, entity.id());
        let data = serde_json::to_value(entity)?;

        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;
        let version = entries.get(&key).map(|s| s.version + 1).unwrap_or(1);
        entries.insert(key, StoredEntity { data, version });

        Ok(Versioned {
            data: entity.clone(),
            version,
        })
    }

    async fn update<E: Entity>(
        &self,
        entity: &E,
        expected_version: i64,
    ) -> Result<Versioned<E>, StoreError> {
        let key = Self::key(E::COLLECTION, entity.id());
        let data = serde_json::to_value(entity)?;

        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;
        let actual = entries
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| StoreError::NotFound {
                collection: E::COLLECTION,
                id: entity.id().to_string(),
            })?;

        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                collection: E::COLLECTION,
                id: entity.id().to_string(),
                expected: expected_version,
                actual,
            });
        }

        let version = actual + 1;
        entries.insert(key, StoredEntity { data, version });

        Ok(Versioned {
            data: entity.clone(),
            version,
        })
    }

    async fn delete<E: Entity>(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;
        Ok(entries.remove(&Self::key(E::COLLECTION, id)).is_some())
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<Versioned<E>>, StoreError> {
        let entries = self.entries.read().map_err(|_| Self::lock_err())?;
        let prefix = format!("{}:", E::COLLECTION);

        let mut results = Vec::new();
        for (key, stored) in entries.iter() {
            if key.starts_with(&prefix) {
                let data: E = serde_json::from_value(stored.data.clone())?;
                results.push(Versioned {
                    data,
                    version: stored.version,
                });
            }
        }
        Ok(results)
    }

    async fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| Self::lock_err())?;

        // Primera pasada: validar todas las precondiciones sin escribir nada
        for op in &commit.ops {
            match *op {
                WriteOp::Insert {
                    collection, ref id, ..
                } => {
                    if entries.contains_key(&Self::key(collection, id)) {
                        return Err(StoreError::AlreadyExists {
                            collection,
                            id: id.clone(),
                        });
                    }
                }
                WriteOp::Update {
                    collection,
                    ref id,
                    expected_version,
                    ..
                } => {
                    let actual = entries
                        .get(&Self::key(collection, id))
                        .map(|s| s.version)
                        .ok_or_else(|| StoreError::NotFound {
                            collection,
                            id: id.clone(),
                        })?;
                    if actual != expected_version {
                        return Err(StoreError::VersionConflict {
                            collection,
                            id: id.clone(),
                            expected: expected_version,
                            actual,
                        });
                    }
                }
            }
        }

        // Segunda pasada: aplicar el lote completo
        for op in commit.ops {
            match op {
                WriteOp::Insert {
                    collection,
                    id,
                    data,
                } => {
                    entries.insert(Self::key(collection, &id), StoredEntity { data, version: 1 });
                }
                WriteOp::Update {
                    collection,
                    id,
                    data,
                    expected_version,
                } => {
                    entries.insert(
                        Self::key(collection, &id),
                        StoredEntity {
                            data,
                            version: expected_version + 1,
                        },
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestEntity {
        id: String,
        value: i32,
    }

    impl Entity for TestEntity {
        const COLLECTION: &'static str = "test_entities";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn entity(id: &str, value: i32) -> TestEntity {
        TestEntity {
            id: id.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = MemoryStore::new();
        let saved = store.insert(&entity("1", 42)).await.unwrap();
        assert_eq!(saved.version, 1);

        let loaded = store.get::<TestEntity>("1").await.unwrap().unwrap();
        assert_eq!(loaded.data.value, 42);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn insert_fails_on_existing() {
        let store = MemoryStore::new();
        store.insert(&entity("1", 1)).await.unwrap();
        let err = store.insert(&entity("1", 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_with_stale_version_fails() {
        let store = MemoryStore::new();
        store.insert(&entity("1", 1)).await.unwrap();
        store.update(&entity("1", 2), 1).await.unwrap();

        let err = store.update(&entity("1", 3), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn commit_applies_all_or_nothing() {
        let store = MemoryStore::new();
        store.insert(&entity("1", 1)).await.unwrap();

        // Lote con versión equivocada: ninguna operación debe aplicarse
        let commit = Commit::new()
            .update(&entity("1", 99), 7)
            .unwrap()
            .insert(&entity("2", 2))
            .unwrap();
        let err = store.commit(commit).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));

        let loaded = store.get::<TestEntity>("1").await.unwrap().unwrap();
        assert_eq!(loaded.data.value, 1);
        assert!(store.get::<TestEntity>("2").await.unwrap().is_none());

        // Lote válido: ambas operaciones visibles
        let commit = Commit::new()
            .update(&entity("1", 10), 1)
            .unwrap()
            .insert(&entity("2", 2))
            .unwrap();
        store.commit(commit).await.unwrap();

        assert_eq!(
            store.get::<TestEntity>("1").await.unwrap().unwrap().data.value,
            10
        );
        assert_eq!(
            store.get::<TestEntity>("2").await.unwrap().unwrap().data.value,
            2
        );
    }

    #[tokio::test]
    async fn find_all_filters_by_collection() {
        let store = MemoryStore::new();
        store.insert(&entity("1", 1)).await.unwrap();
        store.insert(&entity("2", 2)).await.unwrap();

        let all = store.find_all::<TestEntity>().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn delete_returns_whether_existed() {
        let store = MemoryStore::new();
        store.insert(&entity("1", 1)).await.unwrap();
        assert!(store.delete::<TestEntity>("1").await.unwrap());
        assert!(!store.delete::<TestEntity>("1").await.unwrap());
    }
}
