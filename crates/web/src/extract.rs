use std::{collections::HashMap, convert::Infallible};

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
    Form, Json,
};
use model::{
    form::{RestroomForm, Upload},
    restroom::{RestroomCreate, RestroomUpdate},
};
use serde::de::DeserializeOwned;

use crate::common::{RouteErrorResponse, RouteResult};

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image_file";

/// Scheme, host and path prefix the client used to reach the service,
/// honoring the usual reverse proxy headers.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
            headers.get(name).and_then(|v| v.to_str().ok())
        }

        let proto = header(headers, "x-forwarded-proto")
            .unwrap_or("http")
            .to_string();
        let host = header(headers, "x-forwarded-host")
            .or_else(|| header(headers, "host"))
            .unwrap_or("localhost")
            .to_string();
        let prefix = header(headers, "x-forwarded-prefix")
            .unwrap_or("")
            .trim_end_matches('/')
            .to_string();

        BaseUrl {
            proto,
            host,
            prefix,
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!(
            "{}://{}{}{}",
            self.proto,
            self.host,
            self.prefix,
            path.into()
        )
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BaseUrl::from_headers(&parts.headers))
    }
}

/// Body of a create request, either a json document or a form with an
/// optional image.
#[derive(Debug)]
pub struct CreateRestroom {
    pub input: RestroomCreate,
    pub image: Option<Upload>,
}

/// Body of a partial update, either a json document or a form with an
/// optional replacement image.
#[derive(Debug)]
pub struct UpdateRestroom {
    pub update: RestroomUpdate,
    pub image: Option<Upload>,
}

#[async_trait]
impl<S> FromRequest<S> for CreateRestroom
where
    S: Send + Sync,
{
    type Rejection = RouteErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (method, uri) = (req.method().clone(), req.uri().path().to_owned());
        let decoded = match Body::<RestroomCreate>::decode(req, state).await {
            Ok(Body::Form(form)) => form.into_create().map_err(RouteErrorResponse::from),
            Ok(Body::Json(input)) => input
                .validate()
                .map(|_| (input, None))
                .map_err(RouteErrorResponse::from),
            Err(why) => Err(why),
        };
        decoded
            .map(|(input, image)| Self { input, image })
            .map_err(|why| why.with_method(&method).with_uri(uri))
    }
}

#[async_trait]
impl<S> FromRequest<S> for UpdateRestroom
where
    S: Send + Sync,
{
    type Rejection = RouteErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (method, uri) = (req.method().clone(), req.uri().path().to_owned());
        let decoded = match Body::<RestroomUpdate>::decode(req, state).await {
            Ok(Body::Form(form)) => form.into_update().map_err(RouteErrorResponse::from),
            Ok(Body::Json(update)) => update
                .validate()
                .map(|_| (update, None))
                .map_err(RouteErrorResponse::from),
            Err(why) => Err(why),
        };
        decoded
            .map(|(update, image)| Self { update, image })
            .map_err(|why| why.with_method(&method).with_uri(uri))
    }
}

enum Body<T> {
    Form(RestroomForm),
    Json(T),
}

impl<T> Body<T>
where
    T: DeserializeOwned,
{
    /// Dispatches on the content type. Anything that is not a form is
    /// treated as json.
    async fn decode<S>(req: Request, state: &S) -> RouteResult<Self>
    where
        S: Send + Sync,
    {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|why| {
                RouteErrorResponse::new(why.status()).with_message(why.body_text())
            })?;
            read_multipart(multipart).await.map(Body::Form)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|why| {
                    RouteErrorResponse::new(why.status()).with_message(why.body_text())
                })?;
            Ok(Body::Form(RestroomForm::decode(&fields, None)?))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await.map_err(|why| {
                RouteErrorResponse::new(why.status()).with_message(why.body_text())
            })?;
            Ok(Body::Json(value))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> RouteResult<RestroomForm> {
    let malformed = |why: axum::extract::multipart::MultipartError| {
        RouteErrorResponse::bad_request("The multipart body could not be read.")
            .with_detailed_information(why.to_string())
    };

    let mut fields = HashMap::new();
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        match field.file_name().map(str::to_owned) {
            Some(filename) => {
                let bytes = field.bytes().await.map_err(malformed)?;
                if name == IMAGE_FIELD {
                    image = Some(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                } else {
                    log::debug!("ignoring unexpected file field '{}'", name);
                }
            }
            None => {
                let value = field.text().await.map_err(malformed)?;
                fields.insert(name, value);
            }
        }
    }

    Ok(RestroomForm::decode(&fields, image)?)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn base_url_defaults_to_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.org:8000"));

        let base_url = BaseUrl::from_headers(&headers);
        assert_eq!(
            base_url.full_url("/restrooms/1"),
            "http://example.org:8000/restrooms/1"
        );
    }

    #[test]
    fn base_url_honors_proxy_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("backend:8000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("example.org"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/toilets/"));

        let base_url = BaseUrl::from_headers(&headers);
        assert_eq!(
            base_url.full_url("/restrooms/1"),
            "https://example.org/toilets/restrooms/1"
        );
    }
}
