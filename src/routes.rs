use std::{convert::Infallible, path::PathBuf};

use serde_json::{json, Value};
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    path::Tail,
    reject::{self, Rejection},
    Filter, Reply,
};

use crate::{
    actions::RecipeActions,
    cdn,
    config::Config,
    constants::{CDN_CACHE_CONTROL, CDN_CACHE_STATUS, CDN_PROVIDER, MAX_BODY_BYTES},
    error::{FieldIssue, RecipeError},
    repository::RecipeRepository,
    sitemap,
    store::RecipeStore,
    validation::parse_body,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Body of the 500 response when the store fails during this operation.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch recipes",
            Operation::Get => "Internal Server Error",
            Operation::Create => "Failed to create recipe",
            Operation::Update => "Failed to update recipe",
            Operation::Delete => "Failed to delete recipe",
        }
    }
}

/// A [`RecipeError`] together with the operation it interrupted.
#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub error: RecipeError,
}

impl ApiError {
    pub fn new(operation: Operation, error: RecipeError) -> Self {
        Self { operation, error }
    }

    pub fn status_and_body(&self) -> (StatusCode, Value) {
        match &self.error {
            RecipeError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation Error", "details": e.issues }),
            ),
            RecipeError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Recipe not found" }),
            ),
            RecipeError::Conflict(_) => (
                StatusCode::CONFLICT,
                json!({ "error": "Slug already exists. Please provide a unique slug." }),
            ),
            RecipeError::Store(e) => {
                log::error!("{}: {e}", self.operation.failure_message());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.operation.failure_message() }),
                )
            }
        }
    }
}

impl reject::Reject for ApiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdnError {
    UnsafePath,
    NotFound,
}

impl reject::Reject for CdnError {}

fn with_actions<S>(
    actions: RecipeActions<S>,
) -> impl Filter<Extract = (RecipeActions<S>,), Error = Infallible> + Clone
where
    S: RecipeStore + 'static,
{
    warp::any().map(move || actions.clone())
}

fn json_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::bytes())
}

async fn list_recipes<S: RecipeStore>(actions: RecipeActions<S>) -> Result<impl Reply, Rejection> {
    let recipes = actions
        .list()
        .await
        .map_err(|e| ApiError::new(Operation::List, e))?;

    Ok(warp::reply::json(&recipes))
}

async fn get_recipe<S: RecipeStore>(
    id_or_slug: String,
    actions: RecipeActions<S>,
) -> Result<impl Reply, Rejection> {
    let recipe = actions
        .get(&id_or_slug)
        .await
        .map_err(|e| ApiError::new(Operation::Get, e))?;

    Ok(warp::reply::json(&recipe))
}

async fn create_recipe<S: RecipeStore>(
    body: Bytes,
    actions: RecipeActions<S>,
) -> Result<impl Reply, Rejection> {
    let input = parse_body(&body).map_err(|e| ApiError::new(Operation::Create, e.into()))?;
    let recipe = actions
        .create(&input)
        .await
        .map_err(|e| ApiError::new(Operation::Create, e))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&recipe),
        StatusCode::CREATED,
    ))
}

async fn update_recipe<S: RecipeStore>(
    id_or_slug: String,
    body: Bytes,
    actions: RecipeActions<S>,
) -> Result<impl Reply, Rejection> {
    let input = parse_body(&body).map_err(|e| ApiError::new(Operation::Update, e.into()))?;
    let recipe = actions
        .update(&id_or_slug, &input)
        .await
        .map_err(|e| ApiError::new(Operation::Update, e))?;

    Ok(warp::reply::json(&recipe))
}

async fn delete_recipe<S: RecipeStore>(
    id_or_slug: String,
    actions: RecipeActions<S>,
) -> Result<impl Reply, Rejection> {
    actions
        .delete(&id_or_slug)
        .await
        .map_err(|e| ApiError::new(Operation::Delete, e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// CRUD under `/api/recipes`. Every `{idOrSlug}` segment accepts either.
pub fn recipe_routes<S>(
    actions: RecipeActions<S>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    S: RecipeStore + 'static,
{
    let collection = warp::path!("api" / "recipes");
    let item = warp::path!("api" / "recipes" / String);

    let list = collection
        .and(warp::get())
        .and(with_actions(actions.clone()))
        .and_then(list_recipes::<S>);

    let create = collection
        .and(warp::post())
        .and(json_body())
        .and(with_actions(actions.clone()))
        .and_then(create_recipe::<S>);

    let get = item
        .and(warp::get())
        .and(with_actions(actions.clone()))
        .and_then(get_recipe::<S>);

    let update = item
        .and(warp::put())
        .and(json_body())
        .and(with_actions(actions.clone()))
        .and_then(update_recipe::<S>);

    let delete = item
        .and(warp::delete())
        .and(with_actions(actions))
        .and_then(delete_recipe::<S>);

    list.or(create).or(get).or(update).or(delete)
}

async fn serve_cdn_file(tail: Tail, root: PathBuf) -> Result<impl Reply, Rejection> {
    let path = tail.as_str();
    if !cdn::is_safe_path(path) {
        return Err(reject::custom(CdnError::UnsafePath));
    }

    let contents = tokio::fs::read(root.join(path)).await.map_err(|e| {
        log::debug!("CDN miss for '{path}': {e}");
        reject::custom(CdnError::NotFound)
    })?;

    let reply = warp::reply::with_header(contents, "content-type", cdn::content_type(path));
    let reply = warp::reply::with_header(reply, "cache-control", CDN_CACHE_CONTROL);
    let reply = warp::reply::with_header(reply, "cdn-cache-status", CDN_CACHE_STATUS);

    Ok(warp::reply::with_header(reply, "x-cdn-provider", CDN_PROVIDER))
}

/// Files below `root`, served at `/api/cdn/{path}`.
pub fn cdn_route(
    root: impl Into<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let root = root.into();

    warp::path("api")
        .and(warp::path("cdn"))
        .and(warp::path::tail())
        .and(warp::get())
        .and(warp::any().map(move || root.clone()))
        .and_then(serve_cdn_file)
}

async fn serve_sitemap<S: RecipeStore>(
    repository: RecipeRepository<S>,
    base_url: String,
) -> Result<impl Reply, Rejection> {
    let entries = sitemap::sitemap_entries(&repository, &base_url).await;

    Ok(warp::reply::with_header(
        sitemap::render(&entries),
        "content-type",
        "application/xml",
    ))
}

pub fn sitemap_route<S>(
    repository: RecipeRepository<S>,
    base_url: String,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    S: RecipeStore + 'static,
{
    warp::path!("sitemap.xml")
        .and(warp::get())
        .and(warp::any().map(move || repository.clone()))
        .and(warp::any().map(move || base_url.clone()))
        .and_then(serve_sitemap::<S>)
}

/// Renders rejections as JSON error bodies.
pub async fn recover(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(error) = rejection.find::<ApiError>() {
        error.status_and_body()
    } else if let Some(error) = rejection.find::<CdnError>() {
        match error {
            CdnError::UnsafePath => (StatusCode::BAD_REQUEST, json!({ "error": "Invalid path" })),
            CdnError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "File not found" })),
        }
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "error": "Not Found" }))
    } else if rejection.find::<reject::LengthRequired>().is_some() {
        let issue = FieldIssue::new(vec![], "Request body is required");
        (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Validation Error", "details": [issue] }),
        )
    } else if rejection.find::<reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "error": "Payload Too Large" }),
        )
    } else if rejection.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "error": "Method Not Allowed" }),
        )
    } else {
        log::error!("Unhandled rejection: {rejection:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Internal Server Error" }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Every route of the site with error rendering and request logging.
pub fn routes<S>(
    actions: RecipeActions<S>,
    config: &Config,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    S: RecipeStore + 'static,
{
    let sitemap = sitemap_route(actions.repository().clone(), config.base_url.to_owned());

    recipe_routes(actions)
        .or(cdn_route(config.cdn_root.to_owned()))
        .or(sitemap)
        .recover(recover)
        .with(warp::log("recepti_sdk"))
}
