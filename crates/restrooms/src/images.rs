use std::{
    io,
    path::{Path, PathBuf},
};

use model::{
    form::Upload,
    restroom::{Restroom, RestroomUpdate},
    validation::ValidationError,
};
use thiserror::Error;
use tokio::fs;
use utility::{id::Id, path::basename};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    InvalidFilename(ValidationError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ImageError>;

/// Owns the managed upload directory and ties the files in it to restrooms.
///
/// Files are stored as `{id}_{basename}`. Names coming from clients or from the
/// database are always reduced to their basename before a path is built, so no
/// operation can reach outside of the directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    directory: PathBuf,
}

impl ImageStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn stored_filename(id: &Id<Restroom>, client_name: &str) -> Result<String> {
        basename(client_name)
            .map(|name| format!("{}_{}", id, name))
            .ok_or_else(|| {
                ImageError::InvalidFilename(ValidationError::InvalidFilename {
                    value: client_name.to_owned(),
                })
            })
    }

    /// The location of a stored file inside the managed directory.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        basename(filename).map(|name| self.directory.join(name))
    }

    /// Whether a stored file is present. Unusable names never are.
    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_of(filename) {
            Some(path) => fs::try_exists(path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Writes the upload for the restroom and returns the stored filename.
    ///
    /// The write is not atomic, a concurrent reader may see a partial file.
    pub async fn store(&self, id: &Id<Restroom>, upload: &Upload) -> Result<String> {
        let filename = Self::stored_filename(id, &upload.filename)?;
        fs::create_dir_all(&self.directory).await?;
        fs::write(self.directory.join(&filename), &upload.bytes).await?;
        log::debug!(
            "stored {} bytes for restroom {} as {}",
            upload.bytes.len(),
            id,
            filename
        );
        Ok(filename)
    }

    /// Removes a stored file. A file that is already gone is not an error,
    /// `Ok(false)` is returned instead.
    pub async fn remove(&self, filename: &str) -> Result<bool> {
        let Some(path) = self.path_of(filename) else {
            log::warn!("ignoring unusable image filename '{}'", filename);
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                log::debug!("removed image {}", path.display());
                Ok(true)
            }
            Err(why) if why.kind() == io::ErrorKind::NotFound => {
                log::warn!("image {} does not exist, nothing to remove", path.display());
                Ok(false)
            }
            Err(why) => Err(why.into()),
        }
    }

    /// Removes the current image of a restroom, if any, and stores the upload
    /// in its place.
    pub async fn replace(
        &self,
        id: &Id<Restroom>,
        current: Option<&str>,
        upload: &Upload,
    ) -> Result<String> {
        // fail before touching the old file if the new name is unusable
        Self::stored_filename(id, &upload.filename)?;
        if let Some(current) = current {
            self.remove(current).await?;
        }
        self.store(id, upload).await
    }

    /// Re-applies the image the restroom already has to an update which does
    /// not bring a new file.
    pub fn retain(update: RestroomUpdate, existing: &Restroom) -> RestroomUpdate {
        match &existing.image_filename {
            Some(filename) => update.with_image_filename(filename.clone()),
            None => update.without_image(),
        }
    }
}
