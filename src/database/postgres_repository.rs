use sqlx::PgPool;

/// Postgres-backed repository. Entity-specific methods live in sibling
/// modules as `impl` blocks on this type.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
