use crate::{Auth, CompanyRepository, JobRepository};
use std::sync::Arc;

pub struct ServerConfig {
    pub port: u16,
    pub companies: Arc<dyn CompanyRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub auth: Arc<dyn Auth>,
}
