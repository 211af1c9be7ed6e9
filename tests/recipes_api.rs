use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use recepti_sdk::{
    actions::RecipeActions,
    config::Config,
    error::StoreError,
    memory::MemoryStore,
    routes,
    schema::{NewChildren, NewRecipe, RecipeRecord, RecipeUpdate},
    store::RecipeStore,
};
use serde_json::{json, Value};
use uuid::Uuid;
use warp::{http::StatusCode, Filter, Reply};

const CDN_BASE: &str = "http://localhost:3000";

fn config(cdn_root: PathBuf) -> Config {
    Config {
        database_url: String::from("postgres://unused"),
        cdn_base_url: String::from(CDN_BASE),
        base_url: String::from("https://recepti.hr"),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_max_connections: 1,
        cdn_root: cdn_root.to_string_lossy().into_owned(),
    }
}

fn api<S: RecipeStore + 'static>(
    store: Arc<S>,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    let actions = RecipeActions::new(store, CDN_BASE);
    routes::routes(actions, &config(std::env::temp_dir()))
}

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn pizza() -> Value {
    json!({
        "name": "Pizza Margarita",
        "authorUsername": "chef",
        "category": "GLAVNA_JELA"
    })
}

#[tokio::test]
async fn create_generates_id_and_slug() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&pizza())
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body(&response);
    assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
    assert_eq!(created["category"], "GLAVNA_JELA");

    let suffix = created["slug"]
        .as_str()
        .unwrap()
        .strip_prefix("pizza-margarita-")
        .unwrap();
    assert!(!suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn same_name_twice_gets_two_slugs() {
    let api = api(Arc::new(MemoryStore::new()));

    let mut slugs = vec![];
    for _ in 0..2 {
        let response = warp::test::request()
            .method("POST")
            .path("/api/recipes")
            .json(&pizza())
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        slugs.push(body(&response)["slug"].as_str().unwrap().to_string());
    }

    assert_ne!(slugs[0], slugs[1]);
}

#[tokio::test]
async fn invalid_image_url_is_a_validation_error() {
    let api = api(Arc::new(MemoryStore::new()));
    let mut input = pizza();
    input["mainImageUrl"] = json!("not-a-url");

    let response = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body(&response);
    assert_eq!(error["error"], "Validation Error");
    assert_eq!(error["details"][0]["path"], json!(["mainImageUrl"]));
}

#[tokio::test]
async fn every_violation_is_reported_at_once() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&json!({ "authorUsername": "chef" }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let details = body(&response)["details"].as_array().unwrap().to_owned();
    let paths: Vec<&Value> = details.iter().map(|d| &d["path"]).collect();
    assert_eq!(paths, vec![&json!(["name"]), &json!(["category"])]);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["details"][0]["path"], json!([]));
}

#[tokio::test]
async fn missing_body_is_a_validation_error() {
    let api = api(Arc::new(MemoryStore::new()));

    for (method, path) in [("POST", "/api/recipes"), ("PUT", "/api/recipes/pizza")] {
        let response = warp::test::request()
            .method(method)
            .path(path)
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {path}");
        let body = body(&response);
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(body["details"][0]["path"], json!([]));
    }
}

#[tokio::test]
async fn taken_slug_is_a_conflict() {
    let api = api(Arc::new(MemoryStore::new()));
    let mut input = pizza();
    input["slug"] = json!("pizza");

    let first = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        body(&second),
        json!({ "error": "Slug already exists. Please provide a unique slug." })
    );
}

#[tokio::test]
async fn get_accepts_id_or_slug() {
    let api = api(Arc::new(MemoryStore::new()));
    let mut input = pizza();
    input["ingredients"] = json!([
        { "quantity": "200", "unit": "g", "name": "Mozzarella", "order": 2 },
        { "quantity": "500", "unit": "g", "name": "Brašno", "order": 1 }
    ]);
    input["preparationSteps"] = json!([
        { "stepNumber": 2, "description": "Peći" },
        { "stepNumber": 1, "description": "Umijesiti tijesto" }
    ]);

    let created = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;
    let created = body(&created);
    let id = created["id"].as_str().unwrap();
    let slug = created["slug"].as_str().unwrap();

    for key in [id, slug] {
        let response = warp::test::request()
            .path(&format!("/api/recipes/{key}"))
            .reply(&api)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let recipe = body(&response);
        assert_eq!(recipe["id"], id);
        assert_eq!(recipe["ingredients"][0]["name"], "Brašno");
        assert_eq!(recipe["preparationSteps"][0]["stepNumber"], 1);
    }
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .path("/api/recipes/non-existent-slug")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response), json!({ "error": "Recipe not found" }));
}

#[tokio::test]
async fn list_is_newest_first() {
    let api = api(Arc::new(MemoryStore::new()));

    for name in ["Prvi", "Drugi"] {
        let mut input = pizza();
        input["name"] = json!(name);
        warp::test::request()
            .method("POST")
            .path("/api/recipes")
            .json(&input)
            .reply(&api)
            .await;
    }

    let response = warp::test::request()
        .path("/api/recipes")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = body(&response)
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Drugi", "Prvi"]);
}

#[tokio::test]
async fn update_changes_only_submitted_fields() {
    let api = api(Arc::new(MemoryStore::new()));
    let mut input = pizza();
    input["intro"] = json!("Klasik");
    input["servings"] = json!(4);
    input["difficulty"] = json!("EASY");
    input["mainImageUrl"] = json!("http://localhost:3000/api/cdn/recipes/pizza/hero.webp");

    let created = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;
    let before = body(&created);
    let id = before["id"].as_str().unwrap();

    let response = warp::test::request()
        .method("PUT")
        .path(&format!("/api/recipes/{id}"))
        .json(&json!({ "name": "Updated Recipe Name" }))
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut after = body(&response);
    assert_eq!(after["name"], "Updated Recipe Name");

    after["name"] = before["name"].clone();
    after["updatedAt"] = before["updatedAt"].clone();
    assert_eq!(after, before);
}

#[tokio::test]
async fn update_of_missing_recipe_is_not_found() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .method("PUT")
        .path(&format!("/api/recipes/{}", Uuid::new_v4()))
        .json(&json!({ "name": "Nothing" }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let api = api(store.clone());
    let mut input = pizza();
    input["ingredients"] = json!([{ "quantity": "1", "name": "Rajčica" }]);

    let created = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&input)
        .reply(&api)
        .await;
    let id = body(&created)["id"].as_str().unwrap().to_string();

    let first = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/recipes/{id}"))
        .reply(&api)
        .await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        store.count_children(Uuid::parse_str(&id).unwrap()).await,
        (0, 0)
    );

    let second = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/recipes/{id}"))
        .reply(&api)
        .await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&second), json!({ "error": "Recipe not found" }));
}

struct FailingStore;

#[async_trait]
impl RecipeStore for FailingStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<RecipeRecord>, StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<RecipeRecord>, StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }

    async fn list_recent(&self) -> Result<Vec<RecipeRecord>, StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }

    async fn insert_nested(
        &self,
        _recipe: NewRecipe,
        _children: NewChildren,
    ) -> Result<RecipeRecord, StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }

    async fn update_scalars(
        &self,
        _id: Uuid,
        _update: RecipeUpdate,
    ) -> Result<Option<RecipeRecord>, StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Database(String::from("connection refused")))
    }
}

#[tokio::test]
async fn store_failures_are_generic_500s() {
    let api = api(Arc::new(FailingStore));

    let list = warp::test::request()
        .path("/api/recipes")
        .reply(&api)
        .await;
    assert_eq!(list.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&list), json!({ "error": "Failed to fetch recipes" }));

    let create = warp::test::request()
        .method("POST")
        .path("/api/recipes")
        .json(&pizza())
        .reply(&api)
        .await;
    assert_eq!(create.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&create), json!({ "error": "Failed to create recipe" }));

    let get = warp::test::request()
        .path("/api/recipes/anything")
        .reply(&api)
        .await;
    assert_eq!(get.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&get), json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn sitemap_survives_store_failure() {
    let api = api(Arc::new(FailingStore));

    let response = warp::test::request()
        .path("/sitemap.xml")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let xml = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(xml.contains("<loc>https://recepti.hr</loc>"));
    assert!(xml.contains("<loc>https://recepti.hr/recepti</loc>"));
    assert!(!xml.contains("/recept/"));
}

#[tokio::test]
async fn cdn_serves_files_with_long_cache() {
    let root = std::env::temp_dir().join(format!("recepti-cdn-{}", Uuid::new_v4()));
    std::fs::create_dir_all(root.join("recipes/pizza")).unwrap();
    std::fs::write(root.join("recipes/pizza/hero.webp"), b"RIFF").unwrap();

    let actions = RecipeActions::new(Arc::new(MemoryStore::new()), CDN_BASE);
    let api = routes::routes(actions, &config(root.clone()));

    let response = warp::test::request()
        .path("/api/cdn/recipes/pizza/hero.webp")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/webp");
    assert_eq!(
        response.headers()["cache-control"],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(response.headers()["cdn-cache-status"], "HIT");
    assert_eq!(response.headers()["x-cdn-provider"], "recepti-cdn");
    assert_eq!(response.body().as_ref(), b"RIFF");

    let missing = warp::test::request()
        .path("/api/cdn/recipes/pizza/missing.webp")
        .reply(&api)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let traversal = warp::test::request()
        .path("/api/cdn/../secret.txt")
        .reply(&api)
        .await;
    assert_eq!(traversal.status(), StatusCode::BAD_REQUEST);

    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let api = api(Arc::new(MemoryStore::new()));

    let response = warp::test::request()
        .path("/api/unknown")
        .reply(&api)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
