pub mod genre;
pub mod query;
pub mod submission;
pub mod track;
