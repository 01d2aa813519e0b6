/// Native passthrough rewriting of `database.table` queries.
pub mod transformer;
