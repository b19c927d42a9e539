use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jobdesk_core::{
    Auth, BearerAuth, Company, CompanyDetail, CompanyFilter, CompanyPatch, CompanyRepository, Job,
    JobDetail, JobFilter, JobPatch, JobRepository, JobdeskError, NewCompany, NewJob, Result,
};
use jobdesk_rest::{company_router, job_router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const ADMIN: &str = "secret";

#[derive(Default)]
struct MemoryCompanies {
    rows: Mutex<Vec<Company>>,
}

#[async_trait]
impl CompanyRepository for MemoryCompanies {
    async fn create(&self, company: NewCompany) -> Result<Company> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.handle == company.handle) {
            return Err(JobdeskError::Conflict(format!("company {}", company.handle)));
        }
        let company = Company {
            handle: company.handle,
            name: company.name,
            description: company.description,
            num_employees: company.num_employees,
            logo_url: company.logo_url,
        };
        rows.push(company.clone());
        Ok(company)
    }

    async fn list(&self, filter: &CompanyFilter) -> Result<Vec<Company>> {
        if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
            if min > max {
                return Err(JobdeskError::InvalidRange { min, max });
            }
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|c| match &filter.name_like {
                Some(needle) => c.name.to_lowercase().contains(&needle.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, handle: &str) -> Result<CompanyDetail> {
        let rows = self.rows.lock().unwrap();
        match rows.iter().find(|c| c.handle == handle) {
            Some(c) => Ok(CompanyDetail {
                company: c.clone(),
                jobs: vec![],
            }),
            None => Err(JobdeskError::NotFound(format!("company {handle}"))),
        }
    }

    async fn update(&self, handle: &str, patch: CompanyPatch) -> Result<Company> {
        if patch.name.is_none()
            && patch.description.is_none()
            && patch.num_employees.is_none()
            && patch.logo_url.is_none()
        {
            return Err(JobdeskError::EmptyUpdate);
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(company) = rows.iter_mut().find(|c| c.handle == handle) else {
            return Err(JobdeskError::NotFound(format!("company {handle}")));
        };
        if let Some(name) = patch.name {
            company.name = name;
        }
        if let Some(description) = patch.description {
            company.description = description;
        }
        if let Some(num_employees) = patch.num_employees {
            company.num_employees = Some(num_employees);
        }
        if let Some(logo_url) = patch.logo_url {
            company.logo_url = Some(logo_url);
        }
        Ok(company.clone())
    }

    async fn remove(&self, handle: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.handle != handle);
        if rows.len() == before {
            return Err(JobdeskError::NotFound(format!("company {handle}")));
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryJobs {
    rows: Mutex<Vec<Job>>,
}

#[async_trait]
impl JobRepository for MemoryJobs {
    async fn create(&self, job: NewJob) -> Result<Job> {
        let mut rows = self.rows.lock().unwrap();
        let job = Job {
            id: rows.len() as i64 + 1,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company_handle: job.company_handle,
        };
        rows.push(job.clone());
        Ok(job)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|j| {
                filter.has_equity != Some(true)
                    || j.equity.map(|e| e > rust_decimal::Decimal::ZERO) == Some(true)
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<JobDetail> {
        let rows = self.rows.lock().unwrap();
        match rows.iter().find(|j| j.id == id) {
            Some(j) => Ok(JobDetail {
                id: j.id,
                title: j.title.clone(),
                salary: j.salary,
                equity: j.equity,
                company: Company {
                    handle: j.company_handle.clone(),
                    name: format!("{} Inc", j.company_handle),
                    description: String::new(),
                    num_employees: None,
                    logo_url: None,
                },
            }),
            None => Err(JobdeskError::NotFound(format!("job {id}"))),
        }
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job> {
        let mut rows = self.rows.lock().unwrap();
        let Some(job) = rows.iter_mut().find(|j| j.id == id) else {
            return Err(JobdeskError::NotFound(format!("job {id}")));
        };
        if let Some(title) = patch.title {
            job.title = title;
        }
        if let Some(salary) = patch.salary {
            job.salary = Some(salary);
        }
        if let Some(equity) = patch.equity {
            job.equity = Some(equity);
        }
        Ok(job.clone())
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|j| j.id != id);
        if rows.len() == before {
            return Err(JobdeskError::NotFound(format!("job {id}")));
        }
        Ok(())
    }
}

/// Treats any bearer token as a recognized, non-admin user.
struct RecognizedUserAuth;

impl Auth for RecognizedUserAuth {
    fn credentials(&self, bearer: Option<&str>) -> Vec<String> {
        match bearer {
            Some(_) => vec!["user".to_string()],
            None => vec![],
        }
    }

    fn is_admin(&self, credentials: &[String]) -> bool {
        credentials.iter().any(|c| c == "admin")
    }
}

fn company_app() -> Router {
    let auth: Arc<dyn Auth> = Arc::new(BearerAuth::new(ADMIN));
    company_router(Arc::new(MemoryCompanies::default()), auth)
}

fn job_app() -> Router {
    let auth: Arc<dyn Auth> = Arc::new(BearerAuth::new(ADMIN));
    job_router(Arc::new(MemoryJobs::default()), auth)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn patch_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn acme() -> Value {
    json!({"handle": "acme", "name": "Acme", "description": "Anvils"})
}

#[tokio::test]
async fn list_companies_starts_empty() {
    let app = company_app();
    let (status, body) = send(&app, get_req("/companies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_requires_a_token() {
    let app = company_app();
    let (status, body) = send(&app, post_json("/companies", None, acme())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["status"], json!(401));
}

#[tokio::test]
async fn create_with_unknown_token_is_401() {
    let app = company_app();
    let (status, _) = send(&app, post_json("/companies", Some("wrong"), acme())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recognized_non_admin_is_403() {
    let auth: Arc<dyn Auth> = Arc::new(RecognizedUserAuth);
    let app = company_router(Arc::new(MemoryCompanies::default()), auth);
    let (status, _) = send(&app, post_json("/companies", Some("any"), acme())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_and_read_company() {
    let app = company_app();
    let (status, body) = send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["handle"], json!("acme"));

    let (status, body) = send(&app, get_req("/companies/acme")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Acme"));
    assert_eq!(body["jobs"], json!([]));
}

#[tokio::test]
async fn duplicate_company_conflicts() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    let (status, _) = send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_company_is_404() {
    let app = company_app();
    let (status, _) = send(&app, get_req("/companies/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inverted_range_is_400() {
    let app = company_app();
    let (status, body) = send(
        &app,
        get_req("/companies?minEmployees=10&maxEmployees=1"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], json!(400));
}

#[tokio::test]
async fn unknown_filter_key_is_400() {
    let app = company_app();
    let (status, _) = send(&app, get_req("/companies?color=red")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn name_filter_narrows_listing() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    send(
        &app,
        post_json(
            "/companies",
            Some(ADMIN),
            json!({"handle": "netly", "name": "Netly", "description": "Nets"}),
        ),
    )
    .await;

    let (status, body) = send(&app, get_req("/companies?nameLike=net")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["handle"], json!("netly"));
}

#[tokio::test]
async fn patch_updates_supplied_fields() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;

    let (status, body) = send(
        &app,
        patch_json("/companies/acme", Some(ADMIN), json!({"name": "Acme Corp"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Acme Corp"));
    assert_eq!(body["description"], json!("Anvils"));
}

#[tokio::test]
async fn empty_patch_is_400() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    let (status, _) = send(&app, patch_json("/companies/acme", Some(ADMIN), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_rejects_unknown_fields() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    let (status, _) = send(
        &app,
        patch_json("/companies/acme", Some(ADMIN), json!({"handle": "hijack"})),
    )
    .await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn delete_company_round_trip() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;

    let (status, body) = send(&app, delete_req("/companies/acme", Some(ADMIN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": "acme"}));

    let (status, _) = send(&app, delete_req("/companies/acme", Some(ADMIN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_with_unknown_token_is_401() {
    let app = company_app();
    send(&app, post_json("/companies", Some(ADMIN), acme())).await;
    let (status, _) = send(&app, delete_req("/companies/acme", Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn equity_filter_narrows_job_listing() {
    let app = job_app();
    send(
        &app,
        post_json(
            "/jobs",
            Some(ADMIN),
            json!({"title": "Vested", "equity": "0.05", "companyHandle": "acme"}),
        ),
    )
    .await;
    send(
        &app,
        post_json(
            "/jobs",
            Some(ADMIN),
            json!({"title": "Salaried", "equity": "0", "companyHandle": "acme"}),
        ),
    )
    .await;

    let (status, body) = send(&app, get_req("/jobs?hasEquity=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], json!("Vested"));
    assert_eq!(body[0]["equity"], json!("0.05"));
}

#[tokio::test]
async fn job_detail_nests_company() {
    let app = job_app();
    let (_, created) = send(
        &app,
        post_json(
            "/jobs",
            Some(ADMIN),
            json!({"title": "Builder", "companyHandle": "nest"}),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        get_req(&format!("/jobs/{}", created["id"].as_i64().unwrap())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["handle"], json!("nest"));
}

#[tokio::test]
async fn missing_job_is_404() {
    let app = job_app();
    let (status, _) = send(&app, get_req("/jobs/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
