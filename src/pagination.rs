//! Page and sort resolution.
//!
//! Raw request parameters are checked once here and turned into a
//! [`PageRequest`] whose sort column always comes from the entity's own
//! allow-list, so it can be spliced into SQL safely.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::PaginationSettings;
use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts `asc`/`desc` in any casing.
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(CatalogError::invalid_page(format!(
                "sort direction must be ASC or DESC, got '{raw}'"
            )))
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: i64,
    pub page_size: i64,
    #[serde(default)]
    pub sort_direction: Option<String>,
    #[serde(default)]
    pub sort_property: Option<String>,
}

impl PageQuery {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
            sort_direction: None,
            sort_property: None,
        }
    }

    pub fn sorted_by(mut self, property: &str, direction: &str) -> Self {
        self.sort_property = Some(property.to_string());
        self.sort_direction = Some(direction.to_string());
        self
    }
}

/// Extracted straight from the query string. A missing or unparsable
/// parameter is an `InvalidPageRequest`, like any other bad page input.
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| CatalogError::invalid_page(rejection.body_text()))?;
        Ok(query)
    }
}

/// A validated page descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub direction: SortDirection,
    pub property: &'static str,
}

impl PageRequest {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page_number) * i64::from(self.page_size)
    }

    /// `ORDER BY` body; ties fall back to ascending id so pages never overlap.
    pub fn order_by(&self) -> String {
        if self.property == DEFAULT_SORT_PROPERTY {
            format!("id {}", self.direction.as_sql())
        } else {
            format!("{} {}, id ASC", self.property, self.direction.as_sql())
        }
    }
}

pub const DEFAULT_SORT_PROPERTY: &str = "id";

/// Resolves raw [`PageQuery`] values against the configured limits.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    max_page_size: u32,
}

impl Pager {
    pub fn new(max_page_size: u32) -> Self {
        Self { max_page_size }
    }

    pub fn from_settings(settings: &PaginationSettings) -> Self {
        Self::new(settings.max_page_size)
    }

    /// `sortable` lists the column names the entity may be ordered by; it
    /// must contain [`DEFAULT_SORT_PROPERTY`].
    pub fn resolve(
        &self,
        query: &PageQuery,
        entity: EntityKind,
        sortable: &'static [&'static str],
    ) -> CatalogResult<PageRequest> {
        let page_number = u32::try_from(query.page_number).map_err(|_| {
            CatalogError::invalid_page(format!(
                "page number must be between 0 and {}, got {}",
                u32::MAX,
                query.page_number
            ))
        })?;

        if query.page_size < 1 {
            return Err(CatalogError::invalid_page(format!(
                "page size must be at least 1, got {}",
                query.page_size
            )));
        }
        if query.page_size > i64::from(self.max_page_size) {
            return Err(CatalogError::invalid_page(format!(
                "page size must not exceed {}, got {}",
                self.max_page_size, query.page_size
            )));
        }
        // Bounded by max_page_size above.
        let page_size = query.page_size as u32;

        let direction = match query.sort_direction.as_deref() {
            Some(raw) => SortDirection::parse(raw)?,
            None => SortDirection::default(),
        };

        let property = match query.sort_property.as_deref() {
            None => DEFAULT_SORT_PROPERTY,
            Some(raw) => sortable
                .iter()
                .copied()
                .find(|field| *field == raw)
                .ok_or_else(|| CatalogError::InvalidSortField {
                    entity,
                    field: raw.to_string(),
                })?,
        };

        Ok(PageRequest {
            page_number,
            page_size,
            direction,
            property,
        })
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::from_settings(&PaginationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["id", "title", "isbn"];

    fn resolve(query: PageQuery) -> CatalogResult<PageRequest> {
        Pager::default().resolve(&query, EntityKind::Book, FIELDS)
    }

    #[test]
    fn defaults_to_ascending_id() {
        let page = resolve(PageQuery::new(2, 10)).unwrap();
        assert_eq!(page.direction, SortDirection::Asc);
        assert_eq!(page.property, "id");
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.order_by(), "id ASC");
    }

    #[test]
    fn negative_page_number_is_rejected() {
        let err = resolve(PageQuery::new(-1, 10)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPageRequest { .. }));
    }

    #[test]
    fn page_size_must_be_positive_and_bounded() {
        assert!(matches!(
            resolve(PageQuery::new(0, 0)).unwrap_err(),
            CatalogError::InvalidPageRequest { .. }
        ));
        assert!(matches!(
            resolve(PageQuery::new(0, 101)).unwrap_err(),
            CatalogError::InvalidPageRequest { .. }
        ));
        assert!(resolve(PageQuery::new(0, 100)).is_ok());
    }

    #[test]
    fn direction_is_case_insensitive() {
        let page = resolve(PageQuery::new(0, 5).sorted_by("title", "desc")).unwrap();
        assert_eq!(page.direction, SortDirection::Desc);
        assert_eq!(page.order_by(), "title DESC, id ASC");

        let err = resolve(PageQuery::new(0, 5).sorted_by("title", "sideways")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPageRequest { .. }));
    }

    #[test]
    fn unknown_sort_property_is_rejected() {
        let err = resolve(PageQuery::new(0, 5).sorted_by("price", "ASC")).unwrap_err();
        match err {
            CatalogError::InvalidSortField { entity, field } => {
                assert_eq!(entity, EntityKind::Book);
                assert_eq!(field, "price");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sort_property_must_match_exactly() {
        let err = resolve(PageQuery::new(0, 5).sorted_by("title; DROP TABLE books", "ASC"));
        assert!(matches!(err, Err(CatalogError::InvalidSortField { .. })));
    }
}
