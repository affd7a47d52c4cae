//! Request-level tests against a seeded throwaway store.

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};
use switchy_database::DatabaseValue;
use switchy_database_connection::init_sqlite_rusqlite;
use tempfile::TempDir;

use crate::{AppState, configure};

/// App state over a store that lives in a temporary directory. The
/// directory is removed when this is dropped.
struct TestStore {
    state: web::Data<AppState>,
    _dir: TempDir,
}

impl TestStore {
    fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = init_sqlite_rusqlite(Some(&dir.path().join("gtd.db"))).unwrap();
        Self {
            state: web::Data::new(AppState { db: Arc::from(db) }),
            _dir: dir,
        }
    }
}

/// `(eventid, iyear, country_txt, gname, nkill)`
async fn seeded(rows: &[(i64, i64, &str, &str, Option<f64>)]) -> TestStore {
    let store = TestStore::empty();
    let db = store.state.db.as_ref();
    db.exec_raw(
        "CREATE TABLE attacks (
            eventid INTEGER PRIMARY KEY, iyear INTEGER,
            latitude REAL, longitude REAL,
            country_txt TEXT, gname TEXT,
            attacktype1_txt TEXT, weaptype1_txt TEXT, targtype1_txt TEXT,
            nkill REAL, nwound REAL, summary TEXT, motive TEXT
        )",
    )
    .await
    .unwrap();

    for (id, year, country, group, nkill) in rows {
        db.exec_raw_params(
            "INSERT INTO attacks (eventid, iyear, country_txt, gname, nkill, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                DatabaseValue::Int64(*id),
                DatabaseValue::Int64(*year),
                DatabaseValue::String((*country).to_string()),
                DatabaseValue::String((*group).to_string()),
                nkill.map_or(DatabaseValue::Null, DatabaseValue::Real64),
                DatabaseValue::Real64(33.0),
                DatabaseValue::Real64(44.0),
            ],
        )
        .await
        .unwrap();
    }

    store
}

async fn sample() -> TestStore {
    seeded(&[
        (1, 2001, "A", "G1", Some(5.0)),
        (2, 2001, "B", "G2", None),
        (3, 2002, "A", "G1", Some(0.0)),
    ])
    .await
}

fn header<'a, B>(resp: &'a actix_web::dev::ServiceResponse<B>, name: &str) -> &'a str {
    resp.headers().get(name).unwrap().to_str().unwrap()
}

#[actix_web::test]
async fn health_reports_version() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;
    let resp: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request())
            .await;
    assert_eq!(resp["healthy"], true);
    assert_eq!(resp["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn attacks_page_carries_total_count_header() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/attacks?year=2001&victims=1&page=1&limit=10")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(header(&resp, "x-total-count"), "1");
    assert_eq!(header(&resp, "x-page"), "1");
    assert_eq!(header(&resp, "x-page-size"), "10");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!([{
            "eventid": 1,
            "latitude": 33.0,
            "longitude": 44.0,
            "iyear": 2001,
            "country_txt": "A",
            "gname": "G1",
            "nkill": 5
        }])
    );
}

#[actix_web::test]
async fn out_of_range_page_is_empty_with_total() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/attacks?page=9&limit=2")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(header(&resp, "x-total-count"), "3");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn malformed_params_are_ignored() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/attacks?bbox=undefined&year=&victims=abc&page=-1&limit=zero")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(header(&resp, "x-total-count"), "3");
    assert_eq!(header(&resp, "x-page"), "1");
    assert_eq!(header(&resp, "x-page-size"), "500");
}

#[actix_web::test]
async fn repeated_keys_keep_first_value() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/attacks?country=A&country=B")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    assert_eq!(header(&resp, "x-total-count"), "2");

    let req = test::TestRequest::get()
        .uri("/api/attacks?country=A&year=2001&year=2001")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header(&resp, "x-total-count"), "1");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["eventid"], 1);
}

#[actix_web::test]
async fn attacks_by_id_returns_full_record_or_empty_object() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let found: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/attacks?id=2").to_request(),
    )
    .await;
    assert_eq!(found["eventid"], 2);
    assert_eq!(found["country_txt"], "B");
    assert!(found["nkill"].is_null());
    assert!(found.get("motive").is_some());

    let missing: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/attacks?id=999").to_request(),
    )
    .await;
    assert_eq!(missing, json!({}));

    let by_path: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/attacks/3").to_request(),
    )
    .await;
    assert_eq!(by_path["eventid"], 3);
}

#[actix_web::test]
async fn search_uses_search_projection_and_nkill_alias() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/search?country=A&nkill=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(header(&resp, "x-total-count"), "1");
    assert_eq!(header(&resp, "x-page-size"), "100");

    let body: Value = test::read_body_json(resp).await;
    let row = &body[0];
    assert_eq!(row["eventid"], 1);
    assert!(row.get("attacktype1_txt").is_some());
    assert!(row.get("latitude").is_none());
}

#[actix_web::test]
async fn filters_and_search_options_are_sorted() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let filters: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/filters").to_request(),
    )
    .await;
    assert_eq!(
        filters,
        json!({
            "years": [2001, 2002],
            "countries": ["A", "B"],
            "groups": ["G1", "G2"]
        })
    );

    let options: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/search/options").to_request(),
    )
    .await;
    assert_eq!(options["years"], json!([2001, 2002]));
    assert_eq!(options["attackTypes"], json!([]));
    assert_eq!(options["weaponTypes"], json!([]));
}

#[actix_web::test]
async fn summary_honours_filters() {
    let store = sample().await;
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let all: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/attacks/summary").to_request(),
    )
    .await;
    assert_eq!(
        all,
        json!({
            "total": 3,
            "deaths": 5,
            "countries": 2,
            "groups": 2,
            "perYear": { "2001": 2, "2002": 1 }
        })
    );

    let country_a: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/attacks/summary?country=A")
            .to_request(),
    )
    .await;
    assert_eq!(country_a["total"], 2);
    assert_eq!(country_a["groups"], 1);
}

#[actix_web::test]
async fn store_failure_is_a_json_500() {
    let store = TestStore::empty();
    let app = test::init_service(
        App::new()
            .app_data(store.state.clone())
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/attacks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Failed to query incidents" }));
}
