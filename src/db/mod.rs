pub mod accessors;
pub mod models;
pub mod pg_types;
