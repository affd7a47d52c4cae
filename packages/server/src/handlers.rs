//! HTTP handler functions for the GTD map API.

use actix_web::{HttpRequest, HttpResponse, web};
use gtd_map_database::DbError;
use gtd_map_database::projection::IncidentProjection;
use gtd_map_database::queries;
use gtd_map_database_models::{DEFAULT_MAP_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE};
use gtd_map_incident_models::{IncidentField, MapIncident, SearchIncident};
use gtd_map_server_models::{
    ApiError, ApiHealth, IncidentQueryParams, PAGE_HEADER, PAGE_SIZE_HEADER, TOTAL_COUNT_HEADER,
    parse_int,
};
use serde::Serialize;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/attacks`
///
/// Pages through incidents in the map projection, or returns one full
/// record when `id` is given. The match count is sent in the
/// `x-total-count` header.
pub async fn attacks(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let params = query_params(&req);

    if let Some(id) = params.event_id() {
        return incident_detail(&state, id).await;
    }

    paged::<MapIncident>(&state, &params, DEFAULT_MAP_PAGE_SIZE, "query incidents").await
}

/// `GET /api/attacks/{id}`
pub async fn attack_by_id(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match parse_int(&path) {
        Some(id) => incident_detail(&state, id).await,
        None => empty_object(),
    }
}

/// `GET /api/search`
///
/// Same filters as `/api/attacks`, returned in the search projection.
pub async fn search(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let params = query_params(&req);
    paged::<SearchIncident>(&state, &params, DEFAULT_SEARCH_PAGE_SIZE, "search incidents").await
}

/// `GET /api/attacks/summary`
///
/// Totals, deaths, distinct countries/groups and a per-year histogram for
/// the incidents matching the filter parameters.
pub async fn summary(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let filter = query_params(&req).filter();

    match queries::summarize(state.db.as_ref(), &filter).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => store_failure("summarize incidents", &e),
    }
}

/// `GET /api/filters`
///
/// Options for the map and dashboard dropdowns.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    options(
        &state,
        &[
            IncidentField::Year,
            IncidentField::Country,
            IncidentField::Group,
        ],
    )
    .await
}

/// `GET /api/search/options`
///
/// Options for the search page dropdowns.
pub async fn search_options(state: web::Data<AppState>) -> HttpResponse {
    options(
        &state,
        &[
            IncidentField::Country,
            IncidentField::AttackType,
            IncidentField::WeaponType,
            IncidentField::Year,
        ],
    )
    .await
}

/// Reads the query string leniently. Repeated keys keep their first value;
/// a query string that cannot be split into pairs behaves like an empty one.
fn query_params(req: &HttpRequest) -> IncidentQueryParams {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map_or_else(
            |e| {
                log::debug!("Ignoring unparsable query string {:?}: {e}", req.query_string());
                Vec::new()
            },
            web::Query::into_inner,
        );

    IncidentQueryParams::from_pairs(pairs)
}

async fn paged<T: IncidentProjection + Serialize>(
    state: &AppState,
    params: &IncidentQueryParams,
    default_page_size: u64,
    operation: &str,
) -> HttpResponse {
    let filter = params.filter();
    let pagination = params.pagination(default_page_size);

    match queries::query_incidents::<T>(state.db.as_ref(), &filter, pagination).await {
        Ok(page) => {
            if page.is_out_of_range() {
                log::debug!(
                    "Requested page {} is past the last page {}",
                    page.pagination.page(),
                    page.pagination.last_page(page.total_count),
                );
            }

            HttpResponse::Ok()
                .insert_header((TOTAL_COUNT_HEADER, page.total_count.to_string()))
                .insert_header((PAGE_HEADER, page.pagination.page().to_string()))
                .insert_header((PAGE_SIZE_HEADER, page.pagination.page_size().to_string()))
                .json(page.rows)
        }
        Err(e) => store_failure(operation, &e),
    }
}

async fn incident_detail(state: &AppState, id: i64) -> HttpResponse {
    match queries::get_incident(state.db.as_ref(), id).await {
        Ok(Some(incident)) => HttpResponse::Ok().json(incident),
        Ok(None) => empty_object(),
        Err(e) => store_failure("look up incident", &e),
    }
}

async fn options(state: &AppState, fields: &[IncidentField]) -> HttpResponse {
    match queries::filter_options(state.db.as_ref(), fields).await {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(e) => store_failure("fetch filters", &e),
    }
}

fn empty_object() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({}))
}

fn store_failure(operation: &str, e: &DbError) -> HttpResponse {
    log::error!("Failed to {operation}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(format!("Failed to {operation}")))
}
