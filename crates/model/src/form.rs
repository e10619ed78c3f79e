use std::{collections::HashMap, str::FromStr};

use crate::{
    restroom::{RestroomCreate, RestroomUpdate},
    validation::{ValidationError, ValidationErrors},
};

/// A file received from a client, before it is owned by any record.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    /// The name as sent by the client. Untrusted, may contain directories.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The normalized content of an html form posting a restroom.
///
/// Blank values and the literal `null` count as "not supplied", so an
/// untouched input field of a form never overwrites stored data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestroomForm {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<i32>,
    pub image: Option<Upload>,
}

impl RestroomForm {
    pub fn decode(
        fields: &HashMap<String, String>,
        image: Option<Upload>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = supplied(fields, "name").map(str::to_owned);
        let latitude = parse_number(fields, "latitude", &mut errors);
        let longitude = parse_number(fields, "longitude", &mut errors);
        let rating = parse_number(fields, "rating", &mut errors);

        errors.into_result()?;

        Ok(Self {
            name,
            latitude,
            longitude,
            rating,
            image: image.filter(|upload| !upload.filename.trim().is_empty()),
        })
    }

    pub fn into_create(self) -> Result<(RestroomCreate, Option<Upload>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(self.name, "name", &mut errors);
        let latitude = required(self.latitude, "latitude", &mut errors);
        let longitude = required(self.longitude, "longitude", &mut errors);
        let rating = required(self.rating, "rating", &mut errors);

        match (name, latitude, longitude, rating) {
            (Some(name), Some(latitude), Some(longitude), Some(rating)) => {
                let create = RestroomCreate {
                    name,
                    latitude,
                    longitude,
                    rating,
                    image_filename: None,
                };
                create.validate()?;
                Ok((create, self.image))
            }
            _ => Err(errors),
        }
    }

    /// Supplied fields become updates, everything else is left untouched.
    pub fn into_update(self) -> Result<(RestroomUpdate, Option<Upload>), ValidationErrors> {
        let update = RestroomUpdate {
            name: self.name.map(Some),
            latitude: self.latitude.map(Some),
            longitude: self.longitude.map(Some),
            rating: self.rating.map(Some),
            image_filename: None,
        };
        update.validate()?;
        Ok((update, self.image))
    }
}

fn supplied<'a>(fields: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    fields
        .get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty() && *value != "null")
}

fn parse_number<T: FromStr>(
    fields: &HashMap<String, String>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let value = supplied(fields, field)?;
    match value.parse() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.push(ValidationError::InvalidNumber {
                field,
                value: value.to_owned(),
            });
            None
        }
    }
}

fn required<T>(
    value: Option<T>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    if value.is_none() {
        errors.push(ValidationError::Missing { field });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn blank_and_null_values_are_not_supplied() {
        let form = RestroomForm::decode(
            &fields(&[("name", "  "), ("latitude", "null"), ("rating", "")]),
            None,
        )
        .unwrap();
        assert_eq!(form, RestroomForm::default());
    }

    #[test]
    fn numbers_are_parsed_from_text() {
        let form = RestroomForm::decode(
            &fields(&[
                ("name", " Pier 39 "),
                ("latitude", "37.8087"),
                ("longitude", "-122.4098"),
                ("rating", " 4 "),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(form.name.as_deref(), Some("Pier 39"));
        assert_eq!(form.latitude, Some(37.8087));
        assert_eq!(form.longitude, Some(-122.4098));
        assert_eq!(form.rating, Some(4));
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let errors = RestroomForm::decode(
            &fields(&[("latitude", "north"), ("rating", "4.5")]),
            None,
        )
        .unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::InvalidNumber { field: "latitude", .. }
        ));
        assert!(matches!(
            &errors.errors()[1],
            ValidationError::InvalidNumber { field: "rating", value } if value == "4.5"
        ));
    }

    #[test]
    fn upload_without_filename_is_no_upload() {
        let upload = Upload {
            filename: "".to_owned(),
            bytes: vec![],
        };
        let form = RestroomForm::decode(&HashMap::new(), Some(upload)).unwrap();
        assert_eq!(form.image, None);
    }

    #[test]
    fn create_requires_every_field() {
        let errors = RestroomForm::decode(&fields(&[("name", "Dock")]), None)
            .unwrap()
            .into_create()
            .unwrap_err();
        let missing = errors
            .errors()
            .iter()
            .map(ValidationError::field)
            .collect::<Vec<_>>();
        assert_eq!(missing, vec!["latitude", "longitude", "rating"]);
    }

    #[test]
    fn create_checks_ranges() {
        let result = RestroomForm::decode(
            &fields(&[
                ("name", "Dock"),
                ("latitude", "100"),
                ("longitude", "0"),
                ("rating", "3"),
            ]),
            None,
        )
        .unwrap()
        .into_create();
        assert!(result.is_err());
    }

    #[test]
    fn update_only_contains_supplied_fields() {
        let (update, image) = RestroomForm::decode(&fields(&[("rating", "2")]), None)
            .unwrap()
            .into_update()
            .unwrap();
        assert_eq!(update.present_fields(), vec!["rating"]);
        assert_eq!(update.rating, Some(Some(2)));
        assert!(image.is_none());
    }
}
