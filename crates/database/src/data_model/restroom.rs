use super::DatabaseRow;
use crate::{
    queries::{
        convert_error,
        restroom::{
            delete, get, get_all, get_by_location, insert, update, update_image_filename,
        },
    },
    SqliteDatabaseAutocommit,
};
use async_trait::async_trait;
use model::{
    restroom::{Restroom, RestroomUpdate},
    WithId,
};
use restrooms::database::{RestroomRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

#[derive(Debug, Clone, FromRow)]
pub struct RestroomRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: i32,
    pub image_filename: Option<String>,
}

impl DatabaseRow for RestroomRow {
    type Model = Restroom;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Restroom {
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating,
            image_filename: self.image_filename,
        }
    }
}

#[async_trait]
impl RestroomRepo for SqliteDatabaseAutocommit {
    async fn create(&mut self, restroom: Restroom) -> Result<WithId<Restroom>> {
        insert(&self.pool, restroom).await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Restroom>>> {
        get_all(&self.pool).await
    }

    async fn get(&mut self, id: Id<Restroom>) -> Result<WithId<Restroom>> {
        get(&self.pool, id).await
    }

    async fn get_by_location(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WithId<Restroom>> {
        get_by_location(&self.pool, latitude, longitude).await
    }

    async fn update(
        &mut self,
        id: Id<Restroom>,
        restroom_update: &RestroomUpdate,
    ) -> Result<WithId<Restroom>> {
        // read and write on the same connection, without a lock: concurrent
        // updates of one row are last write wins
        let mut connection = self.pool.acquire().await.map_err(convert_error)?;
        let current = get(&mut *connection, id).await?;
        let patched = current.map(|restroom| restroom.patched(restroom_update));
        update(&mut *connection, patched).await
    }

    async fn update_image_filename(
        &mut self,
        id: Id<Restroom>,
        filename: Option<String>,
    ) -> Result<WithId<Restroom>> {
        update_image_filename(&self.pool, id, filename).await
    }

    async fn delete(&mut self, id: Id<Restroom>) -> Result<WithId<Restroom>> {
        delete(&self.pool, id).await
    }
}
