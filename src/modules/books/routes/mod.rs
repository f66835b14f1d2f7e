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

use super::models::{BookDto, BookPatch, NewBook};
use super::service::BookService;
use crate::pagination::PageQuery;
use crate::utils::LetterQuery;

/// Routes mounted under `/api/books`.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/page", get(page_books))
        .route("/name", get(search_by_first_letter))
        .route("/batch", post(create_books))
        .route("/lookup", post(lookup_books))
        .route("/isbn/{isbn}", get(get_by_isbn))
        .route("/title/{title}", get(get_by_title))
        .route("/genre/{name}", get(books_by_genre))
        .route(
            "/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(service)
}

async fn list_books(State(books): State<BookService>) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(books.get_all()?))
}

async fn page_books(
    State(books): State<BookService>,
    query: PageQuery,
) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(books.get_page(&query)?))
}

async fn search_by_first_letter(
    State(books): State<BookService>,
    Query(query): Query<LetterQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let letter = query.letter()?;
    Ok(Json(books.search_by_first_letter(letter)?))
}

async fn get_book(
    State(books): State<BookService>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(books.get_by_id(id)?))
}

async fn get_by_isbn(
    State(books): State<BookService>,
    Path(isbn): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(books.get_by_isbn(&isbn)?))
}

async fn get_by_title(
    State(books): State<BookService>,
    Path(title): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    Ok(Json(books.get_by_title(&title)?))
}

async fn books_by_genre(
    State(books): State<BookService>,
    Path(name): Path<String>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(books.get_all_by_genre(&name)?))
}

async fn lookup_books(
    State(books): State<BookService>,
    Json(ids): Json<Vec<i64>>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(books.get_all_by_id(&ids)?))
}

async fn create_book(
    State(books): State<BookService>,
    Json(book): Json<NewBook>,
) -> Result<(StatusCode, Json<BookDto>), AppError> {
    let id = books.save(&book)?;
    Ok((StatusCode::CREATED, Json(books.get_by_id(id)?)))
}

async fn create_books(
    State(books): State<BookService>,
    Json(batch): Json<Vec<NewBook>>,
) -> Result<(StatusCode, Json<Vec<i64>>), AppError> {
    Ok((StatusCode::CREATED, Json(books.save_all(&batch)?)))
}

async fn update_book(
    State(books): State<BookService>,
    Path(id): Path<i64>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<BookDto>, AppError> {
    books.update(id, &patch)?;
    Ok(Json(books.get_by_id(id)?))
}

async fn delete_book(
    State(books): State<BookService>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    books.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
