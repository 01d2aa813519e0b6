/// Text normalizations applied before detection and rewriting.
pub mod preprocess;
/// Parser capability used to validate candidate queries, with a `sqlparser` backend.
pub mod sql_parser;
