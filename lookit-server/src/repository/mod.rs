use miette::Diagnostic;
use thiserror::Error;

use crate::database::Database;

pub mod study;
pub mod study_type;

pub use study::{Study, StudyQuery, StudyRepository, StudySort};
pub use study_type::{StudyType, StudyTypeRepository};

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Clone)]
pub struct Repository {
    study: StudyRepository,
    study_type: StudyTypeRepository,
}

#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    #[error("invalid argument {0}: {1}")]
    #[diagnostic(code(lookit::error::bad_argument))]
    InvalidArgument(String, String),
    #[error("query failed: {0}")]
    #[diagnostic(code(lookit::error::database))]
    DatabaseError(#[from] sqlx::Error),
    #[error("{entity_type} with ID {id} does not exist")]
    #[diagnostic(code(lookit::error::not_found))]
    NotFound { entity_type: String, id: String },
}

impl Repository {
    pub fn new(database: Database) -> Self {
        Self {
            study: StudyRepository::new(database.clone()),
            study_type: StudyTypeRepository::new(database),
        }
    }

    pub fn study(&self) -> &StudyRepository {
        &self.study
    }

    pub fn study_type(&self) -> &StudyTypeRepository {
        &self.study_type
    }
}
