use model::{restroom::Restroom, WithId};
use restrooms::database::Result;
use sqlx::{Executor, Sqlite};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{restroom::RestroomRow, with_id, with_ids};

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: Id<Restroom>) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, latitude, longitude, rating, image_filename
        FROM
            restrooms
        WHERE id = ?1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Restroom>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, latitude, longitude, rating, image_filename
        FROM
            restrooms
        ORDER BY id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<RestroomRow>| Ok(with_ids(rows)))
}

/// Exact comparison of both coordinates, there is no tolerance.
pub async fn get_by_location<'c, E>(
    executor: E,
    latitude: f64,
    longitude: f64,
) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        SELECT
            id, name, latitude, longitude, rating, image_filename
        FROM
            restrooms
        WHERE latitude = ?1 AND longitude = ?2
        ORDER BY id ASC
        LIMIT 1;
        ",
    )
    .bind(latitude)
    .bind(longitude)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}

pub async fn insert<'c, E>(executor: E, restroom: Restroom) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        INSERT INTO restrooms(
            name,
            latitude,
            longitude,
            rating,
            image_filename
        )
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, name, latitude, longitude, rating, image_filename;
        ",
    )
    .bind(restroom.name)
    .bind(restroom.latitude)
    .bind(restroom.longitude)
    .bind(restroom.rating)
    .bind(restroom.image_filename)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}

/// Overwrites every column of an existing row.
pub async fn update<'c, E>(
    executor: E,
    restroom: WithId<Restroom>,
) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        UPDATE restrooms
        SET name = ?1,
            latitude = ?2,
            longitude = ?3,
            rating = ?4,
            image_filename = ?5
        WHERE id = ?6
        RETURNING id, name, latitude, longitude, rating, image_filename;
        ",
    )
    .bind(restroom.content.name)
    .bind(restroom.content.latitude)
    .bind(restroom.content.longitude)
    .bind(restroom.content.rating)
    .bind(restroom.content.image_filename)
    .bind(restroom.id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}

pub async fn update_image_filename<'c, E>(
    executor: E,
    id: Id<Restroom>,
    filename: Option<String>,
) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        UPDATE restrooms
        SET image_filename = ?1
        WHERE id = ?2
        RETURNING id, name, latitude, longitude, rating, image_filename;
        ",
    )
    .bind(filename)
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Restroom>) -> Result<WithId<Restroom>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        "
        DELETE FROM restrooms
        WHERE id = ?1
        RETURNING id, name, latitude, longitude, rating, image_filename;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RestroomRow| with_id(row))
}
