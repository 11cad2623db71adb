//! Almacenamiento en PostgreSQL
//!
//! Implementación de `EntityStore` sobre sqlx. Cada colección es una tabla
//! `(id TEXT PRIMARY KEY, data JSONB, version BIGINT)`; los commits corren
//! dentro de una transacción de base de datos con guardas
//! `WHERE version = $n`, así el perdedor de una carrera recibe
//! `VersionConflict` y nada queda escrito a medias.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Commit, Entity, EntityStore, StoreError, Versioned, WriteOp};

/// Colecciones conocidas del sistema; `ensure_schema` crea una tabla por cada una.
const COLLECTIONS: [&str; 4] = ["vehicles", "customers", "sale_records", "users"];

#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear las tablas de colecciones si no existen, más el índice único de
    /// VIN sobre el JSONB de vehículos (segunda línea de defensa detrás del
    /// chequeo de unicidad del servicio).
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in COLLECTIONS {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id TEXT PRIMARY KEY,
                    data JSONB NOT NULL,
                    version BIGINT NOT NULL DEFAULT 1
                )",
                collection
            );
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(backend_err)?;
        }

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS vehicles_vin_key ON vehicles ((data->>'vin'))",
        )
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;

        Ok(())
    }
}

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn write_err(e: sqlx::Error, collection: &'static str, id: &str) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return StoreError::AlreadyExists {
                collection,
                id: id.to_string(),
            };
        }
    }
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn get<E: Entity>(&self, id: &str) -> Result<Option<Versioned<E>>, StoreError> {
        let sql = format!("SELECT data, version FROM {} WHERE id = $1", E::COLLECTION);
        let row: Option<(serde_json::Value, i64)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?;

        match row {
            Some((data, version)) => Ok(Some(Versioned {
                data: serde_json::from_value(data)?,
                version,
            })),
            None => Ok(None),
        }
    }

    async fn insert<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError> {
        let sql = format!(
            "INSERT INTO {} (id, data, version) VALUES ($1, $2, 1) ON CONFLICT (id) DO NOTHING",
            E::COLLECTION
        );
        let result = sqlx::query(&sql)
            .bind(entity.id())
            .bind(serde_json::to_value(entity)?)
            .execute(&self.pool)
            .await
            .map_err(|e| write_err(e, E::COLLECTION, entity.id()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                collection: E::COLLECTION,
                id: entity.id().to_string(),
            });
        }

        Ok(Versioned {
            data: entity.clone(),
            version: 1,
        })
    }

    async fn save<E: Entity>(&self, entity: &E) -> Result<Versioned<E>, StoreError> {
        let sql = format!(
            "INSERT INTO {table} (id, data, version) VALUES ($1, $2, 1)
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, version = {table}.version + 1
             RETURNING version",
            table = E::COLLECTION
        );
        let (version,): (i64,) = sqlx::query_as(&sql)
            .bind(entity.id())
            .bind(serde_json::to_value(entity)?)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_err(e, E::COLLECTION, entity.id()))?;

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
        let sql = format!(
            "UPDATE {} SET data = $2, version = version + 1
             WHERE id = $1 AND version = $3
             RETURNING version",
            E::COLLECTION
        );
        let row: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(entity.id())
            .bind(serde_json::to_value(entity)?)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_err(e, E::COLLECTION, entity.id()))?;

        match row {
            Some((version,)) => Ok(Versioned {
                data: entity.clone(),
                version,
            }),
            None => Err(stale_or_missing(&self.pool, E::COLLECTION, entity.id(), expected_version).await),
        }
    }

    async fn delete<E: Entity>(&self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::COLLECTION);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<Versioned<E>>, StoreError> {
        let sql = format!("SELECT data, version FROM {}", E::COLLECTION);
        let rows: Vec<(serde_json::Value, i64)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_err)?;

        let mut results = Vec::with_capacity(rows.len());
        for (data, version) in rows {
            results.push(Versioned {
                data: serde_json::from_value(data)?,
                version,
            });
        }
        Ok(results)
    }

    async fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend_err)?;

        for op in &commit.ops {
            match *op {
                WriteOp::Insert {
                    collection,
                    ref id,
                    ref data,
                } => {
                    let sql = format!(
                        "INSERT INTO {} (id, data, version) VALUES ($1, $2, 1) ON CONFLICT (id) DO NOTHING",
                        collection
                    );
                    let result = sqlx::query(&sql)
                        .bind(id)
                        .bind(data)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| write_err(e, collection, id))?;

                    if result.rows_affected() == 0 {
                        tx.rollback().await.map_err(backend_err)?;
                        return Err(StoreError::AlreadyExists {
                            collection,
                            id: id.clone(),
                        });
                    }
                }
                WriteOp::Update {
                    collection,
                    ref id,
                    ref data,
                    expected_version,
                } => {
                    let sql = format!(
                        "UPDATE {} SET data = $2, version = version + 1 WHERE id = $1 AND version = $3",
                        collection
                    );
                    let result = sqlx::query(&sql)
                        .bind(id)
                        .bind(data)
                        .bind(expected_version)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| write_err(e, collection, id))?;

                    if result.rows_affected() == 0 {
                        tx.rollback().await.map_err(backend_err)?;
                        return Err(
                            stale_or_missing(&self.pool, collection, id, expected_version).await
                        );
                    }
                }
            }
        }

        tx.commit().await.map_err(backend_err)?;
        Ok(())
    }
}

/// Distinguir entre fila inexistente y versión desactualizada después de un
/// UPDATE que no afectó filas.
async fn stale_or_missing(
    pool: &PgPool,
    collection: &'static str,
    id: &str,
    expected: i64,
) -> StoreError {
    let sql = format!("SELECT version FROM {} WHERE id = $1", collection);
    match sqlx::query_as::<_, (i64,)>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
    {
        Ok(Some((actual,))) => StoreError::VersionConflict {
            collection,
            id: id.to_string(),
            expected,
            actual,
        },
        Ok(None) => StoreError::NotFound {
            collection,
            id: id.to_string(),
        },
        Err(e) => backend_err(e),
    }
}
