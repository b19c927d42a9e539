mod routes;

pub use routes::{company_router, job_router, RestError};
