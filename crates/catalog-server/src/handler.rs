use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use catalog_core::{audit_tree, AuditReport};
use catalog_types::{Category, CategoryUpdate, Part, PartSearch, PartUpdate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

pub async fn home_handler() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn audit_handler(State(state): State<AppState>) -> ApiResult<Json<AuditReport>> {
    let report = state.run(|s| audit_tree(s.store())).await?;
    Ok(Json(report))
}

// ---- categories ----

pub async fn create_category(
    State(state): State<AppState>,
    Json(category): Json<Category>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let created = state
        .run(move |s| s.categories().create(s.store(), category))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.run(|s| s.categories().list(s.store())).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Category>> {
    let category = state
        .run(move |s| s.categories().get(s.store(), &name))
        .await?;
    Ok(Json(category))
}

pub async fn category_children(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Category>>> {
    let children = state
        .run(move |s| s.categories().children(s.store(), &name))
        .await?;
    Ok(Json(children))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(update): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    let category = state
        .run(move |s| s.categories().update(s.store(), &name, update))
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .run(move |s| s.categories().delete(s.store(), &name))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- parts ----

pub async fn create_part(
    State(state): State<AppState>,
    Json(part): Json<Part>,
) -> ApiResult<(StatusCode, Json<Part>)> {
    let created = state.run(move |s| s.parts().create(s.store(), part)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_parts(State(state): State<AppState>) -> ApiResult<Json<Vec<Part>>> {
    let parts = state.run(|s| s.parts().list(s.store())).await?;
    Ok(Json(parts))
}

pub async fn get_part(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> ApiResult<Json<Part>> {
    let part = state
        .run(move |s| s.parts().get(s.store(), &serial_number))
        .await?;
    Ok(Json(part))
}

pub async fn update_part(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
    Json(update): Json<PartUpdate>,
) -> ApiResult<Json<Part>> {
    let part = state
        .run(move |s| s.parts().update(s.store(), &serial_number, update))
        .await?;
    Ok(Json(part))
}

pub async fn delete_part(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .run(move |s| s.parts().delete(s.store(), &serial_number))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Raw search parameters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub room: Option<String>,
    pub bookcase: Option<String>,
    pub shelf: Option<String>,
    pub cuvette: Option<String>,
    pub column: Option<String>,
    pub row: Option<String>,
}

impl SearchParams {
    pub fn into_criteria(self) -> ApiResult<PartSearch> {
        Ok(PartSearch {
            name: present(self.name),
            description: present(self.description),
            category: present(self.category),
            quantity: parse("quantity", self.quantity)?,
            price: parse("price", self.price)?,
            room: present(self.room),
            bookcase: present(self.bookcase),
            shelf: present(self.shelf),
            cuvette: present(self.cuvette),
            column: parse("column", self.column)?,
            row: parse("row", self.row)?,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse<T: std::str::FromStr>(field: &str, value: Option<String>) -> ApiResult<Option<T>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid {field}: {raw:?}"))),
    }
}

pub async fn search_parts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Part>>> {
    let criteria = params.into_criteria()?;
    let parts = state
        .run(move |s| s.parts().search(s.store(), &criteria))
        .await?;
    Ok(Json(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_mean_no_criteria() {
        let params = SearchParams {
            name: Some(String::new()),
            quantity: Some(String::new()),
            ..Default::default()
        };
        assert!(params.into_criteria().unwrap().is_empty());
    }

    #[test]
    fn numeric_params_are_parsed() {
        let params = SearchParams {
            quantity: Some("10".into()),
            price: Some("19.99".into()),
            row: Some("2".into()),
            ..Default::default()
        };
        let criteria = params.into_criteria().unwrap();
        assert_eq!(criteria.quantity, Some(10));
        assert_eq!(criteria.price, Some(19.99));
        assert_eq!(criteria.row, Some(2));
    }

    #[test]
    fn bad_number_is_rejected() {
        let params = SearchParams {
            column: Some("left".into()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_criteria(),
            Err(ApiError::BadRequest(msg)) if msg.contains("column")
        ));
    }
}
