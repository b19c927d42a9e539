use crate::query::{build_set_clause, company_where, job_where, FieldMap, QueryPart};
use async_trait::async_trait;
use jobdesk_core::{
    Company, CompanyDetail, CompanyFilter, CompanyPatch, CompanyRepository, Job, JobDetail,
    JobFilter, JobPatch, JobRepository, JobdeskError, NewCompany, NewJob, Result,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::debug;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";
const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Logical (camelCase) field names that differ from their physical columns.
const COMPANY_TRANSLATIONS: &[(&str, &str)] = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];
const JOB_TRANSLATIONS: &[(&str, &str)] = &[];

fn db_err(e: sqlx::Error) -> JobdeskError {
    JobdeskError::Storage(e.to_string())
}

/// Connect and make sure the schema exists.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPool::connect(database_url).await.map_err(db_err)?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS companies (
            handle TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            num_employees BIGINT,
            logo_url TEXT
        )",
    )
    .execute(pool)
    .await
    .map_err(db_err)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS jobs (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            salary BIGINT CHECK (salary >= 0),
            equity NUMERIC CHECK (equity <= 1.0),
            company_handle TEXT NOT NULL
                REFERENCES companies (handle) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .map_err(db_err)?;

    Ok(())
}

fn row_to_company(row: &sqlx::postgres::PgRow) -> Result<Company> {
    Ok(Company {
        handle: row.try_get("handle").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        num_employees: row.try_get("num_employees").map_err(db_err)?,
        logo_url: row.try_get("logo_url").map_err(db_err)?,
    })
}

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<Job> {
    Ok(Job {
        id: row.try_get("id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        salary: row.try_get("salary").map_err(db_err)?,
        equity: row.try_get::<Option<Decimal>, _>("equity").map_err(db_err)?,
        company_handle: row.try_get("company_handle").map_err(db_err)?,
    })
}

pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn create(&self, company: NewCompany) -> Result<Company> {
        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COMPANY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&company.handle)
            .bind(&company.name)
            .bind(&company.description)
            .bind(company.num_employees)
            .bind(company.logo_url.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    JobdeskError::Conflict(format!("company {}", company.handle))
                }
                _ => db_err(e),
            })?;
        row_to_company(&row)
    }

    async fn list(&self, filter: &CompanyFilter) -> Result<Vec<Company>> {
        let base = format!("SELECT {COMPANY_COLUMNS} FROM companies");
        let (sql, part) = match company_where(filter) {
            Ok(part) => (format!("{base} WHERE {} ORDER BY name", part.clause), part),
            // No actionable criteria means the unfiltered listing.
            Err(JobdeskError::NoFilterCriteria) => {
                (format!("{base} ORDER BY name"), QueryPart::empty())
            }
            Err(e) => return Err(e),
        };
        debug!(%sql, "listing companies");

        let rows = part
            .bind(sqlx::query(&sql))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(row_to_company).collect()
    }

    async fn get(&self, handle: &str) -> Result<CompanyDetail> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
        let row = sqlx::query(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let company = match row {
            Some(r) => row_to_company(&r)?,
            None => return Err(JobdeskError::NotFound(format!("company {handle}"))),
        };

        let jobs_sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY title, id"
        );
        let rows = sqlx::query(&jobs_sql)
            .bind(handle)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let jobs = rows.iter().map(row_to_job).collect::<Result<Vec<_>>>()?;

        Ok(CompanyDetail { company, jobs })
    }

    async fn update(&self, handle: &str, patch: CompanyPatch) -> Result<Company> {
        let mut fields = FieldMap::new();
        if let Some(name) = patch.name {
            fields.push("name", name);
        }
        if let Some(description) = patch.description {
            fields.push("description", description);
        }
        if let Some(num_employees) = patch.num_employees {
            fields.push("numEmployees", num_employees);
        }
        if let Some(logo_url) = patch.logo_url {
            fields.push("logoUrl", logo_url);
        }

        let part = build_set_clause(&fields, COMPANY_TRANSLATIONS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_COLUMNS}",
            part.clause,
            part.values.len() + 1
        );
        debug!(%sql, handle, "updating company");

        let row = part
            .bind(sqlx::query(&sql))
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(r) => row_to_company(&r),
            None => Err(JobdeskError::NotFound(format!("company {handle}"))),
        }
    }

    async fn remove(&self, handle: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
            .bind(handle)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(JobdeskError::NotFound(format!("company {handle}")));
        }
        Ok(())
    }
}

pub struct PostgresJobRepository {
    pool: PgPool,
}

impl PostgresJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn create(&self, job: NewJob) -> Result<Job> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {JOB_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&job.title)
            .bind(job.salary)
            .bind(job.equity)
            .bind(&job.company_handle)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    JobdeskError::NotFound(format!("company {}", job.company_handle))
                }
                _ => db_err(e),
            })?;
        row_to_job(&row)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let base = format!("SELECT {JOB_COLUMNS} FROM jobs");
        let (sql, part) = match job_where(filter) {
            Ok(part) => (
                format!("{base} WHERE {} ORDER BY title, id", part.clause),
                part,
            ),
            Err(JobdeskError::NoFilterCriteria) => {
                (format!("{base} ORDER BY title, id"), QueryPart::empty())
            }
            Err(e) => return Err(e),
        };
        debug!(%sql, "listing jobs");

        let rows = part
            .bind(sqlx::query(&sql))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(row_to_job).collect()
    }

    async fn get(&self, id: i64) -> Result<JobDetail> {
        let row = sqlx::query(
            "SELECT j.id, j.title, j.salary, j.equity,
                    c.handle, c.name, c.description, c.num_employees, c.logo_url
             FROM jobs j
             JOIN companies c ON c.handle = j.company_handle
             WHERE j.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            None => Err(JobdeskError::NotFound(format!("job {id}"))),
            Some(r) => Ok(JobDetail {
                id: r.try_get("id").map_err(db_err)?,
                title: r.try_get("title").map_err(db_err)?,
                salary: r.try_get("salary").map_err(db_err)?,
                equity: r.try_get::<Option<Decimal>, _>("equity").map_err(db_err)?,
                company: row_to_company(&r)?,
            }),
        }
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job> {
        let mut fields = FieldMap::new();
        if let Some(title) = patch.title {
            fields.push("title", title);
        }
        if let Some(salary) = patch.salary {
            fields.push("salary", salary);
        }
        if let Some(equity) = patch.equity {
            fields.push("equity", equity);
        }

        let part = build_set_clause(&fields, JOB_TRANSLATIONS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            part.clause,
            part.values.len() + 1
        );
        debug!(%sql, id, "updating job");

        let row = part
            .bind(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(r) => row_to_job(&r),
            None => Err(JobdeskError::NotFound(format!("job {id}"))),
        }
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(JobdeskError::NotFound(format!("job {id}")));
        }
        Ok(())
    }
}
