use std::{error, result};

use async_trait::async_trait;
use model::{
    restroom::{Restroom, RestroomUpdate},
    WithId,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no matching row")]
    NotFound,

    /// A row violated one of the table's check constraints. Unreachable as long
    /// as every write path validates its input first.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Storage operations on restrooms. Every mutating call is committed before it
/// returns.
#[async_trait]
pub trait RestroomRepo {
    /// Inserts a new row and returns it with its generated id.
    async fn create(&mut self, restroom: Restroom) -> Result<WithId<Restroom>>;

    /// All rows in insertion order.
    async fn get_all(&mut self) -> Result<Vec<WithId<Restroom>>>;

    async fn get(&mut self, id: Id<Restroom>) -> Result<WithId<Restroom>>;

    /// Exact match on both coordinates.
    async fn get_by_location(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WithId<Restroom>>;

    /// Applies the fields present and non null in `update` to the stored row.
    async fn update(
        &mut self,
        id: Id<Restroom>,
        update: &RestroomUpdate,
    ) -> Result<WithId<Restroom>>;

    /// Sets the image filename only, bypassing the partial update rules.
    async fn update_image_filename(
        &mut self,
        id: Id<Restroom>,
        filename: Option<String>,
    ) -> Result<WithId<Restroom>>;

    /// Removes the row and returns it as it was right before the deletion.
    async fn delete(&mut self, id: Id<Restroom>) -> Result<WithId<Restroom>>;
}

/// A restroom database. Cloning is cheap; clones share the same storage.
pub trait Database: Clone + Send + Sync + Sized {
    type Autocommit: RestroomRepo + Send;

    fn auto(&self) -> Self::Autocommit;
}
