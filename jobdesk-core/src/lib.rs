pub mod auth;
pub mod config;
pub mod error;
pub mod testing;

pub use auth::{Auth, BearerAuth, NoAuth};
pub use config::ServerConfig;
pub use error::{JobdeskError, Result};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

/// A company together with its job postings, as returned by single-company reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job with the owning company's public fields nested in place of the handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i64,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i64>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Sparse update payload: only supplied fields change. The handle is the key
/// and is never updatable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_employees: Option<i64>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Sparse job update. Neither the id nor the owning company can change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub equity: Option<Decimal>,
}

/// Recognized company filter criteria. Unknown keys are rejected at
/// deserialization, before any SQL is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    #[serde(default)]
    pub name_like: Option<String>,
    #[serde(default)]
    pub min_employees: Option<i64>,
    #[serde(default)]
    pub max_employees: Option<i64>,
}

/// Recognized job filter criteria.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[serde(default)]
    pub title_like: Option<String>,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub has_equity: Option<bool>,
}

#[async_trait::async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create(&self, company: NewCompany) -> Result<Company>;
    async fn list(&self, filter: &CompanyFilter) -> Result<Vec<Company>>;
    async fn get(&self, handle: &str) -> Result<CompanyDetail>;
    async fn update(&self, handle: &str, patch: CompanyPatch) -> Result<Company>;
    async fn remove(&self, handle: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: NewJob) -> Result<Job>;
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>>;
    async fn get(&self, id: i64) -> Result<JobDetail>;
    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job>;
    async fn remove(&self, id: i64) -> Result<()>;
}
