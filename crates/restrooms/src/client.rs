use model::{
    form::Upload,
    restroom::{Restroom, RestroomCreate, RestroomUpdate},
    WithId,
};
use utility::id::Id;

use crate::{
    database::{Database, RestroomRepo},
    images::ImageStore,
    RequestResult,
};

/// Entry point for everything that reads or changes restrooms.
///
/// Sequences repository calls with the image lifecycle: an image is stored
/// once the owning id exists, replaced when an update brings a new file and
/// removed together with its restroom.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database + 'static,
{
    pub database: D,
    pub images: ImageStore,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D, images: ImageStore) -> Self {
        Self { database, images }
    }

    pub async fn create_restroom(
        &self,
        input: RestroomCreate,
        image: Option<Upload>,
    ) -> RequestResult<WithId<Restroom>> {
        input.validate()?;
        if input.image_filename.is_some() {
            log::debug!("ignoring client supplied image filename on create");
        }

        let mut repo = self.database.auto();
        let restroom = repo.create(input.into_restroom()).await?;
        log::info!("created restroom {}", restroom.id);

        let Some(upload) = image else {
            return Ok(restroom);
        };
        match self.images.store(&restroom.id, &upload).await {
            Ok(filename) => Ok(repo
                .update_image_filename(restroom.id, Some(filename))
                .await?),
            Err(why) => {
                // a failed create leaves no row behind
                log::warn!(
                    "storing the image of restroom {} failed, removing the restroom: {}",
                    restroom.id,
                    why
                );
                repo.delete(restroom.id).await?;
                Err(why.into())
            }
        }
    }

    pub async fn get_restrooms(&self) -> RequestResult<Vec<WithId<Restroom>>> {
        Ok(self.database.auto().get_all().await?)
    }

    pub async fn get_restroom(&self, id: Id<Restroom>) -> RequestResult<WithId<Restroom>> {
        Ok(self.database.auto().get(id).await?)
    }

    pub async fn get_restroom_by_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> RequestResult<WithId<Restroom>> {
        Ok(self
            .database
            .auto()
            .get_by_location(latitude, longitude)
            .await?)
    }

    /// Applies a partial update. With a new image the old file is replaced,
    /// without one the current image is kept no matter what the update says.
    pub async fn update_restroom(
        &self,
        id: Id<Restroom>,
        update: RestroomUpdate,
        image: Option<Upload>,
    ) -> RequestResult<WithId<Restroom>> {
        let update = update.normalized()?.without_image();

        let mut repo = self.database.auto();
        let existing = repo.get(id).await?;

        let current = existing.content.image_filename.as_deref();
        let update = match image {
            Some(upload) => match self.images.replace(&existing.id, current, &upload).await {
                Ok(filename) => update.with_image_filename(filename),
                Err(why) => {
                    // a row never names a file that is gone
                    if let Some(current) = current {
                        if !self.images.exists(current).await {
                            log::warn!(
                                "replacing the image of restroom {} failed after {} was removed",
                                existing.id,
                                current
                            );
                            self.set_image_filename(existing.id, None).await?;
                        }
                    }
                    return Err(why.into());
                }
            },
            None => ImageStore::retain(update, &existing.content),
        };

        log::debug!(
            "updating restroom {} fields {:?}",
            id,
            update.present_fields()
        );
        Ok(repo.update(existing.id, &update).await?)
    }

    /// Sets or clears the image filename without any other change.
    pub async fn set_image_filename(
        &self,
        id: Id<Restroom>,
        filename: Option<String>,
    ) -> RequestResult<WithId<Restroom>> {
        Ok(self
            .database
            .auto()
            .update_image_filename(id, filename)
            .await?)
    }

    /// Deletes the restroom and then its image. Returns the restroom as it
    /// was right before the deletion.
    pub async fn delete_restroom(&self, id: Id<Restroom>) -> RequestResult<WithId<Restroom>> {
        let deleted = self.database.auto().delete(id).await?;
        log::info!("deleted restroom {}", deleted.id);

        if let Some(filename) = &deleted.content.image_filename {
            self.images.remove(filename).await?;
        }
        Ok(deleted)
    }
}
