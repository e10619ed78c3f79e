use database::{DatabaseConnectionInfo, SqliteDatabase};
use model::restroom::{Restroom, RestroomUpdate};
use restrooms::database::{Database, DatabaseError, RestroomRepo};
use utility::id::Id;

async fn database() -> SqliteDatabase {
    SqliteDatabase::connect(DatabaseConnectionInfo::in_memory())
        .await
        .expect("in-memory database")
}

fn restroom(name: &str, latitude: f64, longitude: f64) -> Restroom {
    Restroom {
        name: name.to_owned(),
        latitude,
        longitude,
        rating: 3,
        image_filename: None,
    }
}

#[tokio::test]
async fn create_assigns_fresh_ids() {
    let db = database().await;
    let mut repo = db.auto();

    let first = repo.create(restroom("Harbour", 54.32, 10.13)).await.unwrap();
    let second = repo.create(restroom("Station", 54.31, 10.13)).await.unwrap();

    assert!(first.id.raw() > 0);
    assert!(second.id.raw() > first.id.raw());
    assert_eq!(first.content, restroom("Harbour", 54.32, 10.13));
}

#[tokio::test]
async fn ids_of_deleted_rows_are_not_reused() {
    let db = database().await;
    let mut repo = db.auto();

    let first = repo.create(restroom("Harbour", 1.0, 1.0)).await.unwrap();
    repo.delete(first.id).await.unwrap();
    let second = repo.create(restroom("Harbour", 1.0, 1.0)).await.unwrap();

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn get_all_returns_rows_in_insertion_order() {
    let db = database().await;
    let mut repo = db.auto();
    assert!(repo.get_all().await.unwrap().is_empty());

    for name in ["a", "b", "c"] {
        repo.create(restroom(name, 0.0, 0.0)).await.unwrap();
    }

    let names = repo
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|restroom| restroom.content.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn get_is_stable_without_writes() {
    let db = database().await;
    let mut repo = db.auto();
    let created = repo.create(restroom("Harbour", 1.5, 2.5)).await.unwrap();

    let first = repo.get(created.id).await.unwrap();
    let second = repo.get(created.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, created);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let db = database().await;
    let mut repo = db.auto();
    let id = Id::new(42);

    assert!(matches!(repo.get(id).await, Err(DatabaseError::NotFound)));
    assert!(matches!(
        repo.update(id, &RestroomUpdate::default()).await,
        Err(DatabaseError::NotFound)
    ));
    assert!(matches!(
        repo.update_image_filename(id, Some("42_x.png".to_owned())).await,
        Err(DatabaseError::NotFound)
    ));
    assert!(matches!(repo.delete(id).await, Err(DatabaseError::NotFound)));
}

#[tokio::test]
async fn location_lookup_is_exact() {
    let db = database().await;
    let mut repo = db.auto();

    assert!(matches!(
        repo.get_by_location(999.0, 999.0).await,
        Err(DatabaseError::NotFound)
    ));

    let created = repo.create(restroom("Harbour", 54.3233, 10.1228)).await.unwrap();
    let found = repo.get_by_location(54.3233, 10.1228).await.unwrap();
    assert_eq!(found.id, created.id);

    assert!(matches!(
        repo.get_by_location(54.3233, 10.12281).await,
        Err(DatabaseError::NotFound)
    ));
}

#[tokio::test]
async fn update_applies_only_present_non_null_fields() {
    let db = database().await;
    let mut repo = db.auto();
    let created = repo
        .create(Restroom {
            image_filename: Some("1_photo.png".to_owned()),
            ..restroom("Harbour", 54.3233, 10.1228)
        })
        .await
        .unwrap();

    let update = RestroomUpdate {
        rating: Some(Some(5)),
        name: Some(None),
        ..Default::default()
    };
    let updated = repo.update(created.id, &update).await.unwrap();

    assert_eq!(updated.content.rating, 5);
    assert_eq!(updated.content.name, "Harbour");
    assert_eq!(
        updated.content.latitude.to_bits(),
        created.content.latitude.to_bits()
    );
    assert_eq!(
        updated.content.longitude.to_bits(),
        created.content.longitude.to_bits()
    );
    assert_eq!(updated.content.image_filename.as_deref(), Some("1_photo.png"));
    assert_eq!(repo.get(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_image_filename_changes_nothing_else() {
    let db = database().await;
    let mut repo = db.auto();
    let created = repo.create(restroom("Harbour", 1.0, 2.0)).await.unwrap();

    let updated = repo
        .update_image_filename(created.id, Some(format!("{}_door.jpg", created.id)))
        .await
        .unwrap();
    assert_eq!(
        updated.content,
        Restroom {
            image_filename: Some(format!("{}_door.jpg", created.id)),
            ..created.content.clone()
        }
    );

    let cleared = repo.update_image_filename(created.id, None).await.unwrap();
    assert_eq!(cleared.content, created.content);
}

#[tokio::test]
async fn delete_returns_the_row_as_it_was() {
    let db = database().await;
    let mut repo = db.auto();
    let created = repo.create(restroom("Harbour", 1.0, 2.0)).await.unwrap();

    let deleted = repo.delete(created.id).await.unwrap();
    assert_eq!(deleted, created);
    assert!(matches!(repo.get(created.id).await, Err(DatabaseError::NotFound)));
}

#[tokio::test]
async fn storage_rejects_out_of_range_rows() {
    let db = database().await;
    let mut repo = db.auto();

    for invalid in [
        restroom("Harbour", 90.5, 0.0),
        restroom("Harbour", 0.0, -180.5),
        Restroom {
            rating: 0,
            ..restroom("Harbour", 0.0, 0.0)
        },
        restroom("   ", 0.0, 0.0),
    ] {
        assert!(matches!(
            repo.create(invalid).await,
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }
    assert!(repo.get_all().await.unwrap().is_empty());

    let created = repo.create(restroom("Harbour", 1.0, 2.0)).await.unwrap();
    let update = RestroomUpdate {
        rating: Some(Some(6)),
        ..Default::default()
    };
    assert!(matches!(
        repo.update(created.id, &update).await,
        Err(DatabaseError::ConstraintViolation(_))
    ));
    assert_eq!(repo.get(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("restrooms.db").display());
    let info = || DatabaseConnectionInfo {
        url: url.clone(),
        max_connections: 2,
    };

    let created = SqliteDatabase::connect(info())
        .await
        .unwrap()
        .auto()
        .create(restroom("Harbour", 1.0, 2.0))
        .await
        .unwrap();

    let reopened = SqliteDatabase::connect(info()).await.unwrap();
    assert_eq!(reopened.auto().get(created.id).await.unwrap(), created);
}
