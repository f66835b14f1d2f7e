use bookshelf_db::Database;

use super::models::{GenreDto, GenreInput, SORTABLE_FIELDS};
use super::repository;
use crate::error::{CatalogError, CatalogResult, EntityKind, LookupKey};
use crate::pagination::{PageQuery, Pager};
use crate::validation::{self, NamedEntity};

#[derive(Clone)]
pub struct GenreService {
    db: Database,
    pager: Pager,
}

impl GenreService {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self { db, pager }
    }

    pub fn get_by_id(&self, id: i64) -> CatalogResult<GenreDto> {
        self.db.read(|conn| {
            repository::find_by_id(conn, id)?
                .map(GenreDto::from)
                .ok_or_else(|| CatalogError::missing_id(EntityKind::Genre, id))
        })
    }

    pub fn get_by_name(&self, name: &str) -> CatalogResult<GenreDto> {
        self.db.read(|conn| {
            repository::find_by_name(conn, name)?
                .map(GenreDto::from)
                .ok_or_else(|| {
                    CatalogError::not_found(EntityKind::Genre, LookupKey::Name(name.to_string()))
                })
        })
    }

    pub fn search_by_first_letter(&self, letter: char) -> CatalogResult<Vec<String>> {
        self.db
            .read(|conn| Ok(repository::names_starting_with(conn, letter)?))
    }

    pub fn get_all(&self) -> CatalogResult<Vec<GenreDto>> {
        self.db.read(|conn| {
            Ok(repository::find_all(conn)?
                .into_iter()
                .map(GenreDto::from)
                .collect())
        })
    }

    pub fn get_all_by_id(&self, ids: &[i64]) -> CatalogResult<Vec<GenreDto>> {
        ids.iter().map(|&id| self.get_by_id(id)).collect()
    }

    pub fn get_page(&self, query: &PageQuery) -> CatalogResult<Vec<GenreDto>> {
        let page = self
            .pager
            .resolve(query, EntityKind::Genre, SORTABLE_FIELDS)?;
        self.db.read(|conn| {
            Ok(repository::find_page(conn, &page)?
                .into_iter()
                .map(GenreDto::from)
                .collect())
        })
    }

    pub fn save(&self, input: &GenreInput) -> CatalogResult<i64> {
        validation::require_name(&input.name)?;

        let id = self.db.write(|tx| -> CatalogResult<i64> {
            validation::ensure_name_available(tx, NamedEntity::Genre, &input.name, None)?;
            Ok(repository::insert(tx, &input.name)?)
        })?;

        tracing::debug!(entity = "genre", id, name = %input.name, "genre saved");
        Ok(id)
    }

    pub fn save_all(&self, inputs: &[GenreInput]) -> CatalogResult<Vec<i64>> {
        inputs.iter().map(|input| self.save(input)).collect()
    }

    pub fn update(&self, id: i64, input: &GenreInput) -> CatalogResult<()> {
        validation::require_name(&input.name)?;

        self.db.write(|tx| -> CatalogResult<()> {
            validation::ensure_name_available(tx, NamedEntity::Genre, &input.name, Some(id))?;
            if !repository::update_name(tx, id, &input.name)? {
                return Err(CatalogError::missing_id(EntityKind::Genre, id));
            }
            Ok(())
        })?;

        tracing::debug!(entity = "genre", id, "genre updated");
        Ok(())
    }

    /// Books tagged with the genre keep existing; only their tag goes.
    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        self.db.write(|tx| -> CatalogResult<()> {
            if !repository::delete(tx, id)? {
                return Err(CatalogError::missing_id(EntityKind::Genre, id));
            }
            Ok(())
        })?;

        tracing::debug!(entity = "genre", id, "genre deleted");
        Ok(())
    }
}
