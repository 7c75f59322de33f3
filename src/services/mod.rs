pub mod metadata;
pub mod scratch;
