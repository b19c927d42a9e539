mod query;
mod repository;

pub use query::{build_set_clause, company_where, job_where, FieldMap, QueryPart, SqlType, SqlValue};
pub use repository::{connect, init_schema, PostgresCompanyRepository, PostgresJobRepository};
