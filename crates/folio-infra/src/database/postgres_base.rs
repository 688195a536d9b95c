use std::marker::PhantomData;

use sea_orm::{DbConn, DbErr, EntityTrait, PaginatorTrait, PrimaryKeyTrait};

/// Generic PostgreSQL repository over one SeaORM entity.
///
/// Holds the shared pool handle and the primary-key operations every
/// entity needs. Entity-specific queries live in `postgres_repo`.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Find a row by primary key.
    pub(crate) async fn find_model<ID>(&self, id: ID) -> Result<Option<E::Model>, DbErr>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(id).one(&self.db).await
    }

    /// Delete a row by primary key, returning the affected row count.
    pub(crate) async fn delete_model<ID>(&self, id: ID) -> Result<u64, DbErr>
    where
        ID: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Count all rows of the entity.
    pub(crate) async fn count_models(&self) -> Result<u64, DbErr> {
        E::find().count(&self.db).await
    }
}
