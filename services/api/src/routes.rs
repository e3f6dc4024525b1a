//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::WithRejection;
use common::{Identity, database};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{
        CategoryKind, CategoryRequest, CategoryResponse, MessageResponse, PeriodQuery,
        TransactionRequest, TransactionResponse,
    },
    state::AppState,
    stores::{CategoryStore, LedgerStore},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/by-type/:type", get(list_categories_by_type))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .with_state(state.categories.clone())
        .nest("/api/incomes", ledger_routes(state.incomes.clone()))
        .nest("/api/expenses", ledger_routes(state.expenses.clone()))
        .nest("/api/transactions", ledger_routes(state.transactions.clone()))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .merge(protected_routes)
}

fn ledger_routes(store: LedgerStore) -> Router {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/period", get(list_entries_by_period))
        .route("/:id", get(get_entry).put(update_entry).delete(delete_entry))
        .with_state(store)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match database::health_check(&state.db_pool).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "service": "api-service"})),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "unavailable", "service": "api-service"})),
        ),
    }
}

pub async fn list_categories(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = store.list_all(&identity).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

pub async fn list_categories_by_type(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(kind), _): WithRejection<Path<String>, ApiError>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let kind: CategoryKind = kind.parse()?;
    let categories = store.list_by_type(&identity, kind).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

pub async fn get_category(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = store.get_by_id(&identity, id).await?;
    Ok(Json(category.into()))
}

pub async fn create_category(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let category = store.create(&identity, &payload).await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

pub async fn update_category(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryRequest>, ApiError>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = store.update(&identity, id, &payload).await?;
    Ok(Json(category.into()))
}

pub async fn delete_category(
    State(store): State<CategoryStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    store.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}

pub async fn list_entries(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let entries = store.list(&identity).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub async fn list_entries_by_period(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Query(period), _): WithRejection<Query<PeriodQuery>, ApiError>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let entries = store
        .list_by_period(&identity, period.start_date, period.end_date)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

pub async fn get_entry(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<TransactionResponse>> {
    let entry = store.get_by_id(&identity, id).await?;
    Ok(Json(entry.into()))
}

pub async fn create_entry(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let entry = store.create(&identity, &payload).await?;
    Ok((StatusCode::CREATED, Json(TransactionResponse::from(entry))))
}

pub async fn update_entry(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionRequest>, ApiError>,
) -> ApiResult<Json<TransactionResponse>> {
    let entry = store.update(&identity, id, &payload).await?;
    Ok(Json(entry.into()))
}

pub async fn delete_entry(
    State(store): State<LedgerStore>,
    Extension(identity): Extension<Identity>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    store.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("Transaction deleted successfully")))
}
