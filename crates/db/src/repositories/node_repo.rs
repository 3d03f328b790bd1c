//! Repository for the shared id registry (`entity_ids` + `entity_types`).

use inkwell_core::entity::EntityType;
use inkwell_core::types::DbId;
use sqlx::PgPool;

/// Allocates ids and resolves them back to their entity type.
pub struct NodeRepo;

impl NodeRepo {
    /// Allocate a fresh id tagged with `kind` inside the caller's transaction.
    pub async fn register(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: EntityType,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO entity_ids (type_id)
             SELECT id FROM entity_types WHERE name = $1
             RETURNING id",
        )
        .bind(kind.as_str())
        .fetch_one(&mut **tx)
        .await
    }

    /// The entity type an id was registered with, if the id exists.
    pub async fn type_of(pool: &PgPool, id: DbId) -> Result<Option<EntityType>, sqlx::Error> {
        let name = sqlx::query_scalar::<_, String>(
            "SELECT t.name FROM entity_ids e
             JOIN entity_types t ON t.id = e.type_id
             WHERE e.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        name.map(|n| parse_type(&n)).transpose()
    }

    /// Entity types for every id in `ids` that exists, in no particular order.
    pub async fn types_of(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<(DbId, EntityType)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (DbId, String)>(
            "SELECT e.id, t.name FROM entity_ids e
             JOIN entity_types t ON t.id = e.type_id
             WHERE e.id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;
        rows.into_iter()
            .map(|(id, name)| parse_type(&name).map(|kind| (id, kind)))
            .collect()
    }
}

fn parse_type(name: &str) -> Result<EntityType, sqlx::Error> {
    name.parse::<EntityType>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
