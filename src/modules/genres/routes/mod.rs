use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use bookshelf_http::{
    error::AppError,
    extract::{Json, Path, Query},
};

use super::models::{GenreDto, GenreInput};
use super::service::GenreService;
use crate::pagination::PageQuery;
use crate::utils::LetterQuery;

pub fn router(service: GenreService) -> Router {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route("/page", get(page_genres))
        .route("/name", get(search_by_first_letter))
        .route("/batch", post(create_genres))
        .route("/lookup", post(lookup_genres))
        .route("/by-name/{name}", get(get_by_name))
        .route(
            "/{id}",
            get(get_genre).patch(update_genre).delete(delete_genre),
        )
        .with_state(service)
}

async fn list_genres(State(genres): State<GenreService>) -> Result<Json<Vec<GenreDto>>, AppError> {
    Ok(Json(genres.get_all()?))
}

async fn page_genres(
    State(genres): State<GenreService>,
    query: PageQuery,
) -> Result<Json<Vec<GenreDto>>, AppError> {
    Ok(Json(genres.get_page(&query)?))
}

async fn search_by_first_letter(
    State(genres): State<GenreService>,
    Query(query): Query<LetterQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let letter = query.letter()?;
    Ok(Json(genres.search_by_first_letter(letter)?))
}

async fn get_genre(
    State(genres): State<GenreService>,
    Path(id): Path<i64>,
) -> Result<Json<GenreDto>, AppError> {
    Ok(Json(genres.get_by_id(id)?))
}

async fn get_by_name(
    State(genres): State<GenreService>,
    Path(name): Path<String>,
) -> Result<Json<GenreDto>, AppError> {
    Ok(Json(genres.get_by_name(&name)?))
}

async fn lookup_genres(
    State(genres): State<GenreService>,
    Json(ids): Json<Vec<i64>>,
) -> Result<Json<Vec<GenreDto>>, AppError> {
    Ok(Json(genres.get_all_by_id(&ids)?))
}

async fn create_genre(
    State(genres): State<GenreService>,
    Json(input): Json<GenreInput>,
) -> Result<(StatusCode, Json<GenreDto>), AppError> {
    let id = genres.save(&input)?;
    Ok((StatusCode::CREATED, Json(genres.get_by_id(id)?)))
}

async fn create_genres(
    State(genres): State<GenreService>,
    Json(inputs): Json<Vec<GenreInput>>,
) -> Result<(StatusCode, Json<Vec<i64>>), AppError> {
    Ok((StatusCode::CREATED, Json(genres.save_all(&inputs)?)))
}

async fn update_genre(
    State(genres): State<GenreService>,
    Path(id): Path<i64>,
    Json(input): Json<GenreInput>,
) -> Result<Json<GenreDto>, AppError> {
    genres.update(id, &input)?;
    Ok(Json(genres.get_by_id(id)?))
}

async fn delete_genre(
    State(genres): State<GenreService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    genres.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
