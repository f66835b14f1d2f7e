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

use super::models::{AuthorDto, AuthorInput};
use super::service::AuthorService;
use crate::pagination::PageQuery;
use crate::utils::LetterQuery;

/// Routes mounted under `/api/authors`.
pub fn router(service: AuthorService) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/page", get(page_authors))
        .route("/name", get(search_by_first_letter))
        .route("/batch", post(create_authors))
        .route("/lookup", post(lookup_authors))
        .route("/by-name/{name}", get(get_by_name))
        .route(
            "/{id}",
            get(get_author).patch(update_author).delete(delete_author),
        )
        .route("/{id}/books", get(author_books))
        .route("/{id}/books/count", get(author_book_count))
        .with_state(service)
}

async fn list_authors(State(authors): State<AuthorService>) -> Result<Json<Vec<AuthorDto>>, AppError> {
    Ok(Json(authors.get_all()?))
}

async fn page_authors(
    State(authors): State<AuthorService>,
    query: PageQuery,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    Ok(Json(authors.get_page(&query)?))
}

async fn search_by_first_letter(
    State(authors): State<AuthorService>,
    Query(query): Query<LetterQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let letter = query.letter()?;
    Ok(Json(authors.search_by_first_letter(letter)?))
}

async fn get_author(
    State(authors): State<AuthorService>,
    Path(id): Path<i64>,
) -> Result<Json<AuthorDto>, AppError> {
    Ok(Json(authors.get_by_id(id)?))
}

async fn get_by_name(
    State(authors): State<AuthorService>,
    Path(name): Path<String>,
) -> Result<Json<AuthorDto>, AppError> {
    Ok(Json(authors.get_by_name(&name)?))
}

async fn author_books(
    State(authors): State<AuthorService>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(authors.get_all_books(id)?))
}

async fn author_book_count(
    State(authors): State<AuthorService>,
    Path(id): Path<i64>,
) -> Result<Json<usize>, AppError> {
    Ok(Json(authors.get_book_count(id)?))
}

async fn lookup_authors(
    State(authors): State<AuthorService>,
    Json(ids): Json<Vec<i64>>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    Ok(Json(authors.get_all_by_id(&ids)?))
}

async fn create_author(
    State(authors): State<AuthorService>,
    Json(input): Json<AuthorInput>,
) -> Result<(StatusCode, Json<AuthorDto>), AppError> {
    let id = authors.save(&input)?;
    Ok((StatusCode::CREATED, Json(authors.get_by_id(id)?)))
}

async fn create_authors(
    State(authors): State<AuthorService>,
    Json(inputs): Json<Vec<AuthorInput>>,
) -> Result<(StatusCode, Json<Vec<i64>>), AppError> {
    Ok((StatusCode::CREATED, Json(authors.save_all(&inputs)?)))
}

async fn update_author(
    State(authors): State<AuthorService>,
    Path(id): Path<i64>,
    Json(input): Json<AuthorInput>,
) -> Result<Json<AuthorDto>, AppError> {
    authors.update(id, &input)?;
    Ok(Json(authors.get_by_id(id)?))
}

async fn delete_author(
    State(authors): State<AuthorService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    authors.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
