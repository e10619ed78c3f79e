use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    validation::{
        check_latitude, check_longitude, check_name, check_rating, ValidationErrors,
    },
    ExampleData, WithId,
};

/// A restroom as it is stored. The id lives in the surrounding [`WithId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Restroom {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: i32,
    pub image_filename: Option<String>,
}

impl HasId for Restroom {
    type IdType = i64;
}

impl Restroom {
    /// Builds the record that results from applying `update` to `self`.
    ///
    /// Only fields which are present *and* non null in the update replace the
    /// current value. An explicit `null` is a no-op, not a clear.
    pub fn patched(self, update: &RestroomUpdate) -> Self {
        Self {
            name: update.name.clone().flatten().unwrap_or(self.name),
            latitude: update.latitude.flatten().unwrap_or(self.latitude),
            longitude: update.longitude.flatten().unwrap_or(self.longitude),
            rating: update.rating.flatten().unwrap_or(self.rating),
            image_filename: update
                .image_filename
                .clone()
                .flatten()
                .or(self.image_filename),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(check_name(&self.name));
        errors.check(check_latitude(self.latitude));
        errors.check(check_longitude(self.longitude));
        errors.check(check_rating(self.rating));
        errors.into_result()
    }
}

impl ExampleData for Restroom {
    fn example_data() -> Self {
        Self {
            name: "Kiel Hauptbahnhof".to_owned(),
            latitude: 54.3148,
            longitude: 10.1318,
            rating: 4,
            image_filename: Some("1_entrance.jpg".to_owned()),
        }
    }
}

/// Input shape for creating a restroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RestroomCreate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: i32,
    #[serde(default)]
    pub image_filename: Option<String>,
}

impl RestroomCreate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(check_name(&self.name));
        errors.check(check_latitude(self.latitude));
        errors.check(check_longitude(self.longitude));
        errors.check(check_rating(self.rating));
        errors.into_result()
    }

    /// The record to insert. A new record never owns an image yet, its
    /// filename can only be derived once the id is known.
    pub fn into_restroom(self) -> Restroom {
        Restroom {
            name: self.name.trim().to_owned(),
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating,
            image_filename: None,
        }
    }
}

/// Input shape for a partial update.
///
/// Every field distinguishes three states: `None` (key omitted),
/// `Some(None)` (key sent as `null`) and `Some(Some(value))`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestroomUpdate {
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,

    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<Option<f64>>,

    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<Option<f64>>,

    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Option<i32>>,

    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_filename: Option<Option<String>>,
}

impl RestroomUpdate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(Some(name)) = &self.name {
            errors.check(check_name(name));
        }
        if let Some(Some(latitude)) = self.latitude {
            errors.check(check_latitude(latitude));
        }
        if let Some(Some(longitude)) = self.longitude {
            errors.check(check_longitude(longitude));
        }
        if let Some(Some(rating)) = self.rating {
            errors.check(check_rating(rating));
        }
        errors.into_result()
    }

    /// Names of the keys the caller actually supplied, including those sent
    /// as `null`.
    pub fn present_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("rating", self.rating.is_some()),
            ("image_filename", self.image_filename.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }

    /// Drops a client supplied image filename. Stored filenames are only ever
    /// derived by the image store.
    pub fn without_image(self) -> Self {
        Self {
            image_filename: None,
            ..self
        }
    }

    pub fn with_image_filename(self, filename: String) -> Self {
        Self {
            image_filename: Some(Some(filename)),
            ..self
        }
    }

    fn trimmed(self) -> Self {
        Self {
            name: self
                .name
                .map(|name| name.map(|name| name.trim().to_owned())),
            ..self
        }
    }

    /// Validates and normalizes the update.
    pub fn normalized(self) -> Result<Self, ValidationErrors> {
        self.validate()?;
        Ok(self.trimmed())
    }
}

/// Output shape. Stored data is checked once more before it leaves the
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RestroomRead {
    pub id: Id<Restroom>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: i32,
    pub image_filename: Option<String>,
}

impl TryFrom<WithId<Restroom>> for RestroomRead {
    type Error = ValidationErrors;

    fn try_from(value: WithId<Restroom>) -> Result<Self, Self::Error> {
        value.content.validate()?;
        Ok(Self {
            id: value.id,
            name: value.content.name,
            latitude: value.content.latitude,
            longitude: value.content.longitude,
            rating: value.content.rating,
            image_filename: value.content.image_filename,
        })
    }
}

impl ExampleData for RestroomRead {
    fn example_data() -> Self {
        let example = Restroom::example_data();
        Self {
            id: Id::new(1),
            name: example.name,
            latitude: example.latitude,
            longitude: example.longitude,
            rating: example.rating,
            image_filename: example.image_filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn restroom() -> Restroom {
        Restroom {
            name: "Old Town Square".to_owned(),
            latitude: 50.087,
            longitude: 14.421,
            rating: 3,
            image_filename: Some("7_photo.png".to_owned()),
        }
    }

    #[test]
    fn update_distinguishes_omitted_from_null() {
        let update: RestroomUpdate =
            serde_json::from_str(r#"{"rating": 5, "name": null}"#).unwrap();
        assert_eq!(update.rating, Some(Some(5)));
        assert_eq!(update.name, Some(None));
        assert_eq!(update.latitude, None);
        assert_eq!(update.present_fields(), vec!["name", "rating"]);
    }

    #[test]
    fn patching_only_rating_keeps_everything_else() {
        let update = RestroomUpdate {
            rating: Some(Some(5)),
            ..Default::default()
        };
        let patched = restroom().patched(&update);
        assert_eq!(patched.rating, 5);
        assert_eq!(patched.name, restroom().name);
        assert_eq!(patched.latitude.to_bits(), restroom().latitude.to_bits());
        assert_eq!(patched.longitude.to_bits(), restroom().longitude.to_bits());
        assert_eq!(patched.image_filename, restroom().image_filename);
    }

    #[test]
    fn null_fields_are_a_no_op() {
        let update: RestroomUpdate = serde_json::from_str(
            r#"{"name": null, "latitude": null, "image_filename": null}"#,
        )
        .unwrap();
        assert_eq!(restroom().patched(&update), restroom());
    }

    #[test]
    fn update_validation_ignores_null_and_omitted() {
        let update: RestroomUpdate =
            serde_json::from_str(r#"{"latitude": null}"#).unwrap();
        assert!(update.validate().is_ok());

        let update: RestroomUpdate =
            serde_json::from_str(r#"{"latitude": 91.0, "rating": 0}"#).unwrap();
        let errors = update.validate().unwrap_err();
        let fields = errors
            .errors()
            .iter()
            .map(ValidationError::field)
            .collect::<Vec<_>>();
        assert_eq!(fields, vec!["latitude", "rating"]);
    }

    #[test]
    fn create_rejects_wrong_types_at_decode() {
        let result = serde_json::from_str::<RestroomCreate>(
            r#"{"name": "x", "latitude": "north", "longitude": 1.0, "rating": 3}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_never_carries_an_image() {
        let create = RestroomCreate {
            name: "  Harbour  ".to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            rating: 1,
            image_filename: Some("../../etc/passwd".to_owned()),
        };
        assert!(create.validate().is_ok());
        let restroom = create.into_restroom();
        assert_eq!(restroom.name, "Harbour");
        assert_eq!(restroom.image_filename, None);
    }

    #[test]
    fn read_shape_revalidates_stored_data() {
        let broken = WithId::new(
            Id::new(3),
            Restroom {
                rating: 9,
                ..restroom()
            },
        );
        assert!(RestroomRead::try_from(broken).is_err());

        let read = RestroomRead::try_from(WithId::new(Id::new(3), restroom())).unwrap();
        assert_eq!(read.id, Id::new(3));
        assert_eq!(read.image_filename.as_deref(), Some("7_photo.png"));
    }
}
