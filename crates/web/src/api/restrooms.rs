use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Router,
};
use model::{
    restroom::{Restroom, RestroomRead},
    WithId,
};
use serde::Deserialize;
use utility::{id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    extract::{BaseUrl, CreateRestroom, UpdateRestroom},
    hateoas, WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/restrooms{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<RestroomRead>))
        .route("/by-location", get(get_restroom_by_location))
        .route(
            "/:id",
            get(get_restroom)
                .patch(update_restroom)
                .delete(delete_restroom),
        )
        .route("/", get(get_restrooms).post(create_restroom))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationQuery {
    #[serde(alias = "lat")]
    latitude: f64,

    #[serde(alias = "lon")]
    longitude: f64,
}

async fn get_restrooms(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
) -> HateoasResult<VecResponse<hateoas::Response<RestroomRead>>> {
    let base_url = Arc::new(base_url);
    restroom_client
        .get_restrooms()
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restrooms| {
            restrooms
                .into_iter()
                .map(|restroom| restroom_hateoas(restroom, base_url.clone()))
                .collect::<RouteResult<Vec<_>>>()
        })
        .map(|data| data.let_owned(|data| VecResponse::non_paginated(data).hateoas().json()))
        .map_err(|why| why.with_method(&Method::GET).with_uri(original_uri.path()))
}

async fn create_restroom(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
    CreateRestroom { input, image }: CreateRestroom,
) -> HateoasResult<RestroomRead> {
    let uploaded_filename = image.as_ref().map(|upload| upload.filename.clone());
    restroom_client
        .create_restroom(input, image)
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restroom| restroom_hateoas_builder(restroom, Arc::new(base_url)))
        .map(|builder| {
            builder
                .debug_info_option("uploadedFilename", uploaded_filename)
                .build()
                .json()
        })
        .map_err(|why| why.with_method(&Method::POST).with_uri(original_uri.path()))
}

async fn get_restroom_by_location(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> HateoasResult<RestroomRead> {
    let Query(LocationQuery {
        latitude,
        longitude,
    }) = query.map_err(|why| {
        RouteErrorResponse::new(why.status())
            .with_message(why.body_text())
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;

    restroom_client
        .get_restroom_by_location(latitude, longitude)
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restroom| restroom_hateoas(restroom, Arc::new(base_url)))
        .map(|response| response.json())
        .map_err(|why| why.with_method(&Method::GET).with_uri(original_uri.path()))
}

async fn get_restroom(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
) -> HateoasResult<RestroomRead> {
    let id = restroom_id(&id)
        .map_err(|why| why.with_method(&Method::GET).with_uri(original_uri.path()))?;

    restroom_client
        .get_restroom(id)
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restroom| restroom_hateoas(restroom, Arc::new(base_url)))
        .map(|response| response.json())
        .map_err(|why| why.with_method(&Method::GET).with_uri(original_uri.path()))
}

async fn update_restroom(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
    UpdateRestroom { update, image }: UpdateRestroom,
) -> HateoasResult<RestroomRead> {
    let id = restroom_id(&id)
        .map_err(|why| why.with_method(&Method::PATCH).with_uri(original_uri.path()))?;

    let received_fields = update.present_fields();
    let uploaded_filename = image.as_ref().map(|upload| upload.filename.clone());
    restroom_client
        .update_restroom(id, update, image)
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restroom| restroom_hateoas_builder(restroom, Arc::new(base_url)))
        .map(|builder| {
            builder
                .debug_info("receivedFields", received_fields)
                .debug_info_option("uploadedFilename", uploaded_filename)
                .build()
                .json()
        })
        .map_err(|why| why.with_method(&Method::PATCH).with_uri(original_uri.path()))
}

async fn delete_restroom(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { restroom_client }): State<WebState>,
    base_url: BaseUrl,
) -> HateoasResult<RestroomRead> {
    let id = restroom_id(&id)
        .map_err(|why| why.with_method(&Method::DELETE).with_uri(original_uri.path()))?;

    restroom_client
        .delete_restroom(id)
        .await
        .map_err(RouteErrorResponse::from)
        .and_then(|restroom| restroom_hateoas(restroom, Arc::new(base_url)))
        .map(|response| response.json())
        .map_err(|why| why.with_method(&Method::DELETE).with_uri(original_uri.path()))
}

fn restroom_id(raw: &str) -> RouteResult<Id<Restroom>> {
    raw.parse().map_err(|_| {
        RouteErrorResponse::bad_request(format!("'{}' is not a valid restroom id.", raw))
    })
}

pub(crate) fn restroom_hateoas(
    restroom: WithId<Restroom>,
    base_url: Arc<BaseUrl>,
) -> RouteResult<hateoas::Response<RestroomRead>> {
    restroom_hateoas_builder(restroom, base_url).map(|builder| builder.build())
}

/// Stored rows are checked once more on their way out, a row that fails is
/// reported as an internal error rather than served.
fn restroom_hateoas_builder(
    restroom: WithId<Restroom>,
    base_url: Arc<BaseUrl>,
) -> RouteResult<hateoas::ResponseBuilder<RestroomRead>> {
    let id = restroom.id;
    let restroom = RestroomRead::try_from(restroom).map_err(|why| {
        RouteErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_message(format!("Restroom {} holds invalid data.", id))
            .with_detailed_information(why.to_string())
    })?;

    let location = resource!(
        "/by-location?latitude={}&longitude={}",
        restroom.latitude,
        restroom.longitude
    );
    let image = restroom
        .image_filename
        .as_ref()
        .map(|filename| format!("/uploads/{}", filename));

    Ok(hateoas::Response::builder(restroom, base_url)
        .link("self", resource!("/{}", id))
        .link("location", location)
        .link_option("image", image))
}
