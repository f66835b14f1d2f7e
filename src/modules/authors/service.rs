use bookshelf_db::Database;

use super::models::{AuthorDto, AuthorInput, SORTABLE_FIELDS};
use super::repository;
use crate::error::{CatalogError, CatalogResult, EntityKind, LookupKey};
use crate::pagination::{PageQuery, Pager};
use crate::validation::{self, NamedEntity};

/// Business operations on authors.
#[derive(Clone)]
pub struct AuthorService {
    db: Database,
    pager: Pager,
}

impl AuthorService {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self { db, pager }
    }

    pub fn get_by_id(&self, id: i64) -> CatalogResult<AuthorDto> {
        self.db.read(|conn| {
            repository::find_by_id(conn, id)?
                .map(AuthorDto::from)
                .ok_or_else(|| CatalogError::missing_id(EntityKind::Author, id))
        })
    }

    pub fn get_by_name(&self, name: &str) -> CatalogResult<AuthorDto> {
        self.db.read(|conn| {
            repository::find_by_name(conn, name)?
                .map(AuthorDto::from)
                .ok_or_else(|| {
                    CatalogError::not_found(EntityKind::Author, LookupKey::Name(name.to_string()))
                })
        })
    }

    /// Titles of the author's books in association order.
    pub fn get_all_books(&self, id: i64) -> CatalogResult<Vec<String>> {
        Ok(self.get_by_id(id)?.books)
    }

    pub fn get_book_count(&self, id: i64) -> CatalogResult<usize> {
        self.db.read(|conn| {
            if !repository::exists(conn, id)? {
                return Err(CatalogError::missing_id(EntityKind::Author, id));
            }
            Ok(repository::count_books(conn, id)?)
        })
    }

    pub fn search_by_first_letter(&self, letter: char) -> CatalogResult<Vec<String>> {
        self.db
            .read(|conn| Ok(repository::names_starting_with(conn, letter)?))
    }

    pub fn get_all(&self) -> CatalogResult<Vec<AuthorDto>> {
        self.db.read(|conn| {
            Ok(repository::find_all(conn)?
                .into_iter()
                .map(AuthorDto::from)
                .collect())
        })
    }

    /// One lookup per id, in input order; the first missing id fails the call.
    pub fn get_all_by_id(&self, ids: &[i64]) -> CatalogResult<Vec<AuthorDto>> {
        ids.iter().map(|&id| self.get_by_id(id)).collect()
    }

    pub fn get_page(&self, query: &PageQuery) -> CatalogResult<Vec<AuthorDto>> {
        let page = self
            .pager
            .resolve(query, EntityKind::Author, SORTABLE_FIELDS)?;
        self.db.read(|conn| {
            Ok(repository::find_page(conn, &page)?
                .into_iter()
                .map(AuthorDto::from)
                .collect())
        })
    }

    pub fn save(&self, input: &AuthorInput) -> CatalogResult<i64> {
        validation::require_name(&input.name)?;

        let id = self.db.write(|tx| -> CatalogResult<i64> {
            validation::ensure_name_available(tx, NamedEntity::Author, &input.name, None)?;
            Ok(repository::insert(tx, &input.name)?)
        })?;

        tracing::debug!(entity = "author", id, name = %input.name, "author saved");
        Ok(id)
    }

    /// Saves each author in turn. Earlier saves stay committed when a later
    /// one fails.
    pub fn save_all(&self, inputs: &[AuthorInput]) -> CatalogResult<Vec<i64>> {
        inputs.iter().map(|input| self.save(input)).collect()
    }

    /// Rename an author. Its own current name, in any casing, is not a
    /// collision; book associations are left untouched.
    pub fn update(&self, id: i64, input: &AuthorInput) -> CatalogResult<()> {
        validation::require_name(&input.name)?;

        self.db.write(|tx| -> CatalogResult<()> {
            validation::ensure_name_available(tx, NamedEntity::Author, &input.name, Some(id))?;
            if !repository::update_name(tx, id, &input.name)? {
                return Err(CatalogError::missing_id(EntityKind::Author, id));
            }
            Ok(())
        })?;

        tracing::debug!(entity = "author", id, "author updated");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        self.db.write(|tx| -> CatalogResult<()> {
            if !repository::delete(tx, id)? {
                return Err(CatalogError::missing_id(EntityKind::Author, id));
            }
            Ok(())
        })?;

        tracing::debug!(entity = "author", id, "author deleted");
        Ok(())
    }

    pub fn is_name_taken(&self, name: &str, exclude: Option<i64>) -> CatalogResult<bool> {
        self.db.read(|conn| {
            Ok(validation::is_name_taken(
                conn,
                NamedEntity::Author,
                name,
                exclude,
            )?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;

    fn service() -> (AuthorService, Database) {
        let db = testing::migrated_db();
        (AuthorService::new(db.clone(), Pager::default()), db)
    }

    #[test]
    fn get_by_id_returns_requested_author() {
        let (authors, _) = service();
        let id = authors.save(&AuthorInput::new("Ursula K. Le Guin")).unwrap();

        let author = authors.get_by_id(id).unwrap();
        assert_eq!(author.id, id);
        assert_eq!(author.name, "Ursula K. Le Guin");
        assert!(author.books.is_empty());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (authors, _) = service();
        let err = authors.get_by_id(42).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                entity: EntityKind::Author,
                key: LookupKey::Id(42)
            }
        ));
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let (authors, _) = service();
        authors.save(&AuthorInput::new("Tolkien")).unwrap();

        let err = authors.save(&AuthorInput::new("TOLKIEN")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName { ref name, .. } if name == "TOLKIEN"));
        assert_eq!(authors.get_all().unwrap().len(), 1);
    }

    #[test]
    fn blank_name_is_a_validation_error() {
        let (authors, _) = service();
        let err = authors.save(&AuthorInput::new("   ")).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "name", .. }));
    }

    #[test]
    fn get_by_name_is_exact() {
        let (authors, _) = service();
        authors.save(&AuthorInput::new("Terry Pratchett")).unwrap();

        assert_eq!(authors.get_by_name("Terry Pratchett").unwrap().name, "Terry Pratchett");
        assert!(matches!(
            authors.get_by_name("terry pratchett").unwrap_err(),
            CatalogError::NotFound { .. }
        ));
    }

    #[test]
    fn update_keeps_identity_and_books() {
        let (authors, db) = service();
        let id = authors.save(&AuthorInput::new("J. R. R. Tolkein")).unwrap();
        let genre = testing::insert_genre(&db, "Fantasy");
        testing::insert_book(&db, "The Hobbit", "978-0261102217", &[id], &[genre]);

        authors.update(id, &AuthorInput::new("J. R. R. Tolkien")).unwrap();

        let author = authors.get_by_id(id).unwrap();
        assert_eq!(author.id, id);
        assert_eq!(author.name, "J. R. R. Tolkien");
        assert_eq!(author.books, vec!["The Hobbit"]);
    }

    #[test]
    fn update_to_own_name_in_other_case_is_allowed() {
        let (authors, _) = service();
        let id = authors.save(&AuthorInput::new("tolkien")).unwrap();

        authors.update(id, &AuthorInput::new("Tolkien")).unwrap();
        assert_eq!(authors.get_by_id(id).unwrap().name, "Tolkien");
    }

    #[test]
    fn update_to_another_authors_name_conflicts() {
        let (authors, _) = service();
        authors.save(&AuthorInput::new("Tolkien")).unwrap();
        let id = authors.save(&AuthorInput::new("Lewis")).unwrap();

        let err = authors.update(id, &AuthorInput::new("tolkien")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName { .. }));
        assert_eq!(authors.get_by_id(id).unwrap().name, "Lewis");
    }

    #[test]
    fn update_of_missing_author_is_not_found() {
        let (authors, _) = service();
        let err = authors.update(9, &AuthorInput::new("Nobody")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (authors, _) = service();
        let ids = authors
            .save_all(&(1..=7).map(|n| AuthorInput::new(format!("Author {n}"))).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(ids.last(), Some(&7));

        authors.delete(7).unwrap();
        assert!(matches!(
            authors.get_by_id(7).unwrap_err(),
            CatalogError::NotFound { .. }
        ));
        assert!(matches!(authors.delete(7).unwrap_err(), CatalogError::NotFound { .. }));
    }

    #[test]
    fn deleting_an_author_keeps_their_books() {
        let (authors, db) = service();
        let id = authors.save(&AuthorInput::new("Mervyn Peake")).unwrap();
        let genre = testing::insert_genre(&db, "Gothic");
        let book = testing::insert_book(&db, "Titus Groan", "978-0099288749", &[id], &[genre]);

        authors.delete(id).unwrap();

        assert!(testing::book_exists(&db, book));
        assert_eq!(testing::count(&db, "book_author"), 0);
    }

    #[test]
    fn books_listing_and_count_follow_associations() {
        let (authors, db) = service();
        let id = authors.save(&AuthorInput::new("Tolkien")).unwrap();
        let genre = testing::insert_genre(&db, "Fantasy");
        testing::insert_book(&db, "The Hobbit", "1", &[id], &[genre]);
        testing::insert_book(&db, "The Silmarillion", "2", &[id], &[genre]);

        assert_eq!(
            authors.get_all_books(id).unwrap(),
            vec!["The Hobbit", "The Silmarillion"]
        );
        assert_eq!(authors.get_book_count(id).unwrap(), 2);
        assert!(authors.get_book_count(id + 1).is_err());
    }

    #[test]
    fn first_letter_search_is_case_sensitive_and_sorted() {
        let (authors, _) = service();
        for name in ["Tolkien", "Tad Williams", "tanith lee", "Pratchett"] {
            authors.save(&AuthorInput::new(name)).unwrap();
        }

        assert_eq!(
            authors.search_by_first_letter('T').unwrap(),
            vec!["Tad Williams", "Tolkien"]
        );
        assert_eq!(authors.search_by_first_letter('t').unwrap(), vec!["tanith lee"]);
        assert!(authors.search_by_first_letter('Z').unwrap().is_empty());
    }

    #[test]
    fn batch_save_stops_at_first_failure_but_keeps_earlier_rows() {
        let (authors, _) = service();
        let inputs = vec![
            AuthorInput::new("Banks"),
            AuthorInput::new("BANKS"),
            AuthorInput::new("Reynolds"),
        ];

        assert!(authors.save_all(&inputs).is_err());
        let names: Vec<String> = authors.get_all().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Banks"]);
    }

    #[test]
    fn get_all_by_id_preserves_input_order() {
        let (authors, _) = service();
        let a = authors.save(&AuthorInput::new("A")).unwrap();
        let b = authors.save(&AuthorInput::new("B")).unwrap();

        let names: Vec<String> = authors
            .get_all_by_id(&[b, a])
            .unwrap()
            .into_iter()
            .map(|author| author.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(authors.get_all_by_id(&[a, 99]).is_err());
    }

    #[test]
    fn pages_are_sorted_and_bounded() {
        let (authors, _) = service();
        for name in ["Eco", "Calvino", "Borges", "Atwood", "Dick"] {
            authors.save(&AuthorInput::new(name)).unwrap();
        }

        let page = |n, size| {
            authors
                .get_page(&PageQuery::new(n, size).sorted_by("name", "ASC"))
                .unwrap()
                .into_iter()
                .map(|a| a.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(page(0, 2), vec!["Atwood", "Borges"]);
        assert_eq!(page(2, 2), vec!["Eco"]);
        assert!(page(3, 2).is_empty());

        let err = authors
            .get_page(&PageQuery::new(0, 2).sorted_by("title", "ASC"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidSortField { .. }));
    }

    #[test]
    fn concurrent_saves_of_one_name_admit_a_single_author() {
        let (authors, db) = service();

        let results: Vec<CatalogResult<i64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|n| {
                    let authors = authors.clone();
                    scope.spawn(move || {
                        let name = if n % 2 == 0 { "Tolkien" } else { "TOLKIEN" };
                        authors.save(&AuthorInput::new(name))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(CatalogError::DuplicateName { .. }))));
        assert_eq!(testing::count(&db, "authors"), 1);
    }

    #[test]
    fn is_name_taken_honours_exclusion() {
        let (authors, _) = service();
        let id = authors.save(&AuthorInput::new("Tolkien")).unwrap();

        assert!(authors.is_name_taken("tolkien", None).unwrap());
        assert!(!authors.is_name_taken("tolkien", Some(id)).unwrap());
    }
}
