//! Route table, request dispatch, and the JSON wire schema.
//!
//! One matchit radix tree per HTTP method — O(path-length) lookup, built
//! once at startup. [`App::handle`] is the whole request pipeline: route,
//! decode, call the service, encode. It is deliberately callable without a
//! socket so tests drive it with synthetic `http::Request`s.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use matchit::Router;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::filter::StringFilter;
use crate::service::StringService;
use crate::store::AnalyzedString;

// ── Routes ────────────────────────────────────────────────────────────────────

/// Every endpoint the service exposes. Dispatch is a match on this enum.
#[derive(Clone, Copy, Debug)]
enum Route {
    CreateString,
    GetString,
    ListStrings,
    DeleteString,
    NaturalLanguageFilter,
    Liveness,
    Readiness,
}

/// The application: route table plus the shared string service.
pub struct App {
    routes: HashMap<Method, Router<Route>>,
    service: StringService,
}

impl App {
    pub fn new(service: StringService) -> Self {
        let mut routes: HashMap<Method, Router<Route>> = HashMap::new();

        let mut add = |method: Method, path: &str, route: Route| {
            routes
                .entry(method)
                .or_default()
                .insert(path, route)
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        };

        add(Method::POST, "/strings", Route::CreateString);
        add(Method::GET, "/strings", Route::ListStrings);
        // Static segment takes precedence over the `{value}` parameter.
        add(
            Method::GET,
            "/strings/filter-by-natural-language",
            Route::NaturalLanguageFilter,
        );
        add(Method::GET, "/strings/{value}", Route::GetString);
        add(Method::DELETE, "/strings/{value}", Route::DeleteString);
        add(Method::GET, "/healthz", Route::Liveness);
        add(Method::GET, "/readyz", Route::Readiness);

        Self { routes, service }
    }

    /// Routes one request and produces one response. Never fails — every
    /// error becomes a status code and a JSON detail body.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: hyper::body::Body,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let response = self.dispatch(req).await;

        info!(%method, %path, status = response.status().as_u16(), "request");
        response
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: hyper::body::Body,
    {
        let path = req.uri().path().to_owned();

        let route = match self.routes.get(req.method()) {
            Some(tree) => tree.at(&path).ok().map(|m| {
                let value = m.params.get("value").map(str::to_owned);
                (*m.value, value)
            }),
            None => None,
        };

        let Some((route, raw_value)) = route else {
            // Distinguish an unknown path from a known path with the
            // wrong method.
            let known_elsewhere = self
                .routes
                .iter()
                .any(|(m, tree)| m != req.method() && tree.at(&path).is_ok());
            return if known_elsewhere {
                detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            } else {
                detail_response(StatusCode::NOT_FOUND, "Not found")
            };
        };

        let result = match route {
            Route::CreateString => self.create_string(req).await,
            Route::GetString => self.get_string(raw_value.as_deref()),
            Route::ListStrings => self.list_strings(req.uri().query()),
            Route::DeleteString => self.delete_string(raw_value.as_deref()),
            Route::NaturalLanguageFilter => self.natural_language_filter(req.uri().query()),
            Route::Liveness => Ok(text_response("ok")),
            Route::Readiness => Ok(text_response("ready")),
        };

        result.unwrap_or_else(|err| {
            debug!(%err, "request failed");
            detail_response(err.status(), &err.to_string())
        })
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    /// `POST /strings` — 201 with the analyzed record, 409 on duplicate,
    /// 422 when `value` is missing or not a string, 400 on malformed JSON.
    async fn create_string<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, ApiError>
    where
        B: hyper::body::Body,
    {
        let body = req
            .into_body()
            .collect()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read request body".to_owned()))?
            .to_bytes();

        let payload: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|_| ApiError::BadRequest("Invalid JSON body".to_owned()))?;

        let value = payload
            .get("value")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ApiError::Validation("\"value\" must be a string".to_owned()))?;

        let record = self.service.create(value.to_owned())?;
        json_response(StatusCode::CREATED, &StringResponse::from(record))
    }

    /// `GET /strings/{value}` — 200 | 404. The path segment is
    /// percent-decoded before lookup.
    fn get_string(&self, raw_value: Option<&str>) -> Result<Response<Full<Bytes>>, ApiError> {
        let value = decode_path_segment(raw_value)?;
        let record = self.service.get_by_value(&value).ok_or(ApiError::NotFound)?;
        json_response(StatusCode::OK, &StringResponse::from(record))
    }

    /// `GET /strings` — explicit query-parameter filtering. 400 when the
    /// bounds conflict, 422 for malformed parameter values.
    fn list_strings(&self, query: Option<&str>) -> Result<Response<Full<Bytes>>, ApiError> {
        let filter = filter_from_params(query)?;
        if filter.validate().is_err() {
            // The explicit endpoint predates the 422 convention; kept at
            // 400 for wire compatibility.
            return Err(ApiError::BadRequest(
                "min_length cannot be > max_length".to_owned(),
            ));
        }

        let data: Vec<StringResponse> = self
            .service
            .list(&filter)
            .into_iter()
            .map(StringResponse::from)
            .collect();
        let count = data.len();
        json_response(StatusCode::OK, &ListResponse { data, count, filters_applied: filter })
    }

    /// `DELETE /strings/{value}` — 204 | 404.
    fn delete_string(&self, raw_value: Option<&str>) -> Result<Response<Full<Bytes>>, ApiError> {
        let value = decode_path_segment(raw_value)?;
        if !self.service.delete(&value) {
            return Err(ApiError::NotFound);
        }
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;
        Ok(response)
    }

    /// `GET /strings/filter-by-natural-language?query=…` — parses the
    /// phrase into a filter, rejects conflicting bounds with 422, and
    /// echoes the interpretation back alongside the matches.
    fn natural_language_filter(
        &self,
        query: Option<&str>,
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        let original = query_param(query, "query").unwrap_or_default();
        let filter = StringFilter::parse_query(&original)?;
        filter.validate()?;

        let data: Vec<StringResponse> = self
            .service
            .list(&filter)
            .into_iter()
            .map(StringResponse::from)
            .collect();
        let count = data.len();
        json_response(
            StatusCode::OK,
            &NlResponse {
                data,
                count,
                interpreted_query: InterpretedQuery { original, parsed_filters: filter },
            },
        )
    }
}

// ── Wire schema ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PropertiesBody {
    length: usize,
    is_palindrome: bool,
    unique_characters: usize,
    word_count: usize,
    sha256_hash: String,
    character_frequency_map: HashMap<char, usize>,
}

#[derive(Serialize)]
struct StringResponse {
    id: String,
    value: String,
    properties: PropertiesBody,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AnalyzedString> for StringResponse {
    fn from(record: AnalyzedString) -> Self {
        Self {
            properties: PropertiesBody {
                length: record.length,
                is_palindrome: record.is_palindrome,
                unique_characters: record.unique_characters,
                word_count: record.word_count,
                sha256_hash: record.id.clone(),
                character_frequency_map: record.character_frequency_map,
            },
            id: record.id,
            value: record.value,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize)]
struct ListResponse {
    data: Vec<StringResponse>,
    count: usize,
    filters_applied: StringFilter,
}

#[derive(Serialize)]
struct InterpretedQuery {
    original: String,
    parsed_filters: StringFilter,
}

#[derive(Serialize)]
struct NlResponse {
    data: Vec<StringResponse>,
    count: usize,
    interpreted_query: InterpretedQuery,
}

// ── Query-string handling ─────────────────────────────────────────────────────

/// First occurrence of `name` in the query string, percent-decoded.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.into_owned())
}

/// Builds a [`StringFilter`] from explicit query parameters. Unknown
/// parameters are ignored; malformed values for known parameters are 422.
fn filter_from_params(query: Option<&str>) -> Result<StringFilter, ApiError> {
    let mut filter = StringFilter::default();
    let Some(query) = query else { return Ok(filter) };

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "is_palindrome" => filter.is_palindrome = Some(parse_bool(&value)?),
            "min_length" => filter.min_length = Some(parse_count(&key, &value)?),
            "max_length" => filter.max_length = Some(parse_count(&key, &value)?),
            "word_count" => filter.word_count = Some(parse_count(&key, &value)?),
            "contains_character" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => filter.contains_character = Some(ch),
                    _ => {
                        return Err(ApiError::Validation(
                            "contains_character must be exactly one character".to_owned(),
                        ))
                    }
                }
            }
            _ => {}
        }
    }
    Ok(filter)
}

fn parse_bool(value: &str) -> Result<bool, ApiError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ApiError::Validation(
            "is_palindrome must be a boolean".to_owned(),
        )),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, ApiError> {
    value
        .parse::<usize>()
        .map_err(|_| ApiError::Validation(format!("{key} must be a non-negative integer")))
}

/// Percent-decodes a `{value}` path segment.
fn decode_path_segment(raw: Option<&str>) -> Result<String, ApiError> {
    let raw = raw.ok_or(ApiError::NotFound)?;
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ApiError::BadRequest("Path is not valid UTF-8".to_owned()))
}

// ── Response helpers ──────────────────────────────────────────────────────────

fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let bytes = serde_json::to_vec(body)
        .map_err(|e| ApiError::BadRequest(format!("Failed to encode response: {e}")))?;
    Ok(raw_json(status, bytes))
}

/// `{"detail": "<message>"}` with the given status.
fn detail_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "detail": message });
    // Serializing a literal object cannot fail.
    raw_json(status, serde_json::to_vec(&body).unwrap_or_default())
}

fn raw_json(status: StatusCode, bytes: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

fn text_response(body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
