//! Role repository: trait and PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::types::RoleId;
use eatfast_entity::role::{Role, RoleName};

/// Read access to the seeded roles.
#[async_trait]
pub trait RoleRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a role by primary key.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Find a role by name.
    async fn find_by_name(&self, name: RoleName) -> AppResult<Option<Role>>;

    /// Return the roles among `names` that exist, ordered by name.
    async fn list_by_names(&self, names: &[RoleName]) -> AppResult<Vec<Role>>;
}

/// Raw `roles` row; the name is validated into [`RoleName`] on the way out.
#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: RoleId,
    name: String,
    description: Option<String>,
    permissions: Json<Vec<String>>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let name = row.name.parse::<RoleName>().map_err(|_| {
            AppError::database(format!("Unknown role name '{}' in roles table", row.name))
        })?;
        Ok(Role {
            id: row.id,
            name,
            description: row.description,
            permissions: row.permissions.0,
        })
    }
}

/// PostgreSQL-backed role repository.
#[derive(Debug, Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, description, permissions FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by id", e))?
        .map(Role::try_from)
        .transpose()
    }

    async fn find_by_name(&self, name: RoleName) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, description, permissions FROM roles WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by name", e))?
        .map(Role::try_from)
        .transpose()
    }

    async fn list_by_names(&self, names: &[RoleName]) -> AppResult<Vec<Role>> {
        let names: Vec<&str> = names.iter().map(RoleName::as_str).collect();
        sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, description, permissions FROM roles \
             WHERE name = ANY($1) ORDER BY name",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?
        .into_iter()
        .map(Role::try_from)
        .collect()
    }
}
