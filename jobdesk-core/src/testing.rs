use crate::{
    CompanyFilter, CompanyPatch, CompanyRepository, JobFilter, JobPatch, JobRepository,
    JobdeskError, NewCompany, NewJob,
};

fn sample_company(handle: &str) -> NewCompany {
    NewCompany {
        handle: handle.to_string(),
        name: format!("{handle} Inc"),
        description: format!("About {handle}"),
        num_employees: Some(100),
        logo_url: None,
    }
}

fn sample_job(company_handle: &str, title: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        salary: Some(90000),
        equity: Some("0.05".parse().unwrap()),
        company_handle: company_handle.to_string(),
    }
}

// ---- Company Repository Certification Tests ----

pub async fn test_create_company_round_trip(repo: &dyn CompanyRepository) {
    let created = repo.create(sample_company("acme")).await.unwrap();
    assert_eq!(created.handle, "acme");
    assert_eq!(created.name, "acme Inc");
    assert_eq!(created.num_employees, Some(100));

    let detail = repo.get("acme").await.unwrap();
    assert_eq!(detail.company, created);
    assert!(detail.jobs.is_empty());
}

pub async fn test_duplicate_handle_conflicts(repo: &dyn CompanyRepository) {
    repo.create(sample_company("dup")).await.unwrap();
    let err = repo.create(sample_company("dup")).await.unwrap_err();
    assert!(matches!(err, JobdeskError::Conflict(_)), "got {err:?}");
}

pub async fn test_get_missing_company_is_not_found(repo: &dyn CompanyRepository) {
    let err = repo.get("nope").await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");
}

pub async fn test_list_companies_unfiltered(repo: &dyn CompanyRepository) {
    repo.create(sample_company("beta")).await.unwrap();
    repo.create(sample_company("alpha")).await.unwrap();

    let all = repo.list(&CompanyFilter::default()).await.unwrap();
    let handles: Vec<&str> = all.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, vec!["alpha", "beta"]);
}

pub async fn test_list_companies_by_name(repo: &dyn CompanyRepository) {
    repo.create(sample_company("netflix")).await.unwrap();
    repo.create(sample_company("postgres")).await.unwrap();

    let filter = CompanyFilter {
        name_like: Some("NET".to_string()),
        ..Default::default()
    };
    let found = repo.list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle, "netflix");
}

pub async fn test_list_companies_by_employee_range(repo: &dyn CompanyRepository) {
    let mut small = sample_company("small");
    small.num_employees = Some(5);
    let mut big = sample_company("big");
    big.num_employees = Some(5000);
    repo.create(small).await.unwrap();
    repo.create(big).await.unwrap();

    let filter = CompanyFilter {
        min_employees: Some(1),
        max_employees: Some(10),
        ..Default::default()
    };
    let found = repo.list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].handle, "small");
}

pub async fn test_inverted_range_is_rejected(repo: &dyn CompanyRepository) {
    let filter = CompanyFilter {
        min_employees: Some(10),
        max_employees: Some(1),
        ..Default::default()
    };
    let err = repo.list(&filter).await.unwrap_err();
    assert!(
        matches!(err, JobdeskError::InvalidRange { min: 10, max: 1 }),
        "got {err:?}"
    );
}

pub async fn test_update_company_touches_only_supplied_fields(repo: &dyn CompanyRepository) {
    repo.create(sample_company("patchy")).await.unwrap();

    let patch = CompanyPatch {
        name: Some("Patchy LLC".to_string()),
        ..Default::default()
    };
    let updated = repo.update("patchy", patch).await.unwrap();
    assert_eq!(updated.name, "Patchy LLC");
    assert_eq!(updated.description, "About patchy");
    assert_eq!(updated.num_employees, Some(100));
}

pub async fn test_empty_patch_is_rejected(repo: &dyn CompanyRepository) {
    repo.create(sample_company("stuck")).await.unwrap();
    let err = repo.update("stuck", CompanyPatch::default()).await.unwrap_err();
    assert!(matches!(err, JobdeskError::EmptyUpdate), "got {err:?}");
}

pub async fn test_update_missing_company_is_not_found(repo: &dyn CompanyRepository) {
    let patch = CompanyPatch {
        name: Some("Ghost".to_string()),
        ..Default::default()
    };
    let err = repo.update("ghost", patch).await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");
}

pub async fn test_remove_company(repo: &dyn CompanyRepository) {
    repo.create(sample_company("gone")).await.unwrap();
    repo.remove("gone").await.unwrap();

    let err = repo.get("gone").await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");

    let err = repo.remove("gone").await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");
}

// ---- Job Repository Certification Tests ----

pub async fn test_create_job_round_trip(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("acme")).await.unwrap();
    let created = jobs.create(sample_job("acme", "Engineer")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.title, "Engineer");
    assert_eq!(created.company_handle, "acme");
    assert_eq!(created.equity, Some("0.05".parse().unwrap()));
}

pub async fn test_job_detail_nests_company(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("nest")).await.unwrap();
    let created = jobs.create(sample_job("nest", "Builder")).await.unwrap();

    let detail = jobs.get(created.id).await.unwrap();
    assert_eq!(detail.title, "Builder");
    assert_eq!(detail.company.handle, "nest");
    assert_eq!(detail.company.name, "nest Inc");
}

pub async fn test_company_detail_nests_jobs(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("hive")).await.unwrap();
    jobs.create(sample_job("hive", "Keeper")).await.unwrap();
    jobs.create(sample_job("hive", "Drone")).await.unwrap();

    let detail = companies.get("hive").await.unwrap();
    assert_eq!(detail.jobs.len(), 2);
    let titles: Vec<&str> = detail.jobs.iter().map(|j| j.title.as_str()).collect();
    assert!(titles.contains(&"Keeper"));
    assert!(titles.contains(&"Drone"));
}

pub async fn test_list_jobs_by_title_and_salary(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("acme")).await.unwrap();
    let mut junior = sample_job("acme", "Junior Engineer");
    junior.salary = Some(50000);
    let mut senior = sample_job("acme", "Senior Engineer");
    senior.salary = Some(150000);
    jobs.create(junior).await.unwrap();
    jobs.create(senior).await.unwrap();

    let filter = JobFilter {
        title_like: Some("engineer".to_string()),
        min_salary: Some(100000),
        ..Default::default()
    };
    let found = jobs.list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Senior Engineer");
}

pub async fn test_list_jobs_by_equity(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("acme")).await.unwrap();
    let mut no_equity = sample_job("acme", "Salaried");
    no_equity.equity = Some("0".parse().unwrap());
    jobs.create(no_equity).await.unwrap();
    jobs.create(sample_job("acme", "Vested")).await.unwrap();

    let filter = JobFilter {
        has_equity: Some(true),
        ..Default::default()
    };
    let found = jobs.list(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Vested");

    // A false flag contributes nothing, so the listing is unfiltered.
    let filter = JobFilter {
        has_equity: Some(false),
        ..Default::default()
    };
    let found = jobs.list(&filter).await.unwrap();
    assert_eq!(found.len(), 2);
}

pub async fn test_update_job(companies: &dyn CompanyRepository, jobs: &dyn JobRepository) {
    companies.create(sample_company("acme")).await.unwrap();
    let created = jobs.create(sample_job("acme", "Temp")).await.unwrap();

    let patch = JobPatch {
        title: Some("Permanent".to_string()),
        salary: Some(110000),
        ..Default::default()
    };
    let updated = jobs.update(created.id, patch).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Permanent");
    assert_eq!(updated.salary, Some(110000));
    assert_eq!(updated.equity, created.equity);
}

pub async fn test_remove_job(companies: &dyn CompanyRepository, jobs: &dyn JobRepository) {
    companies.create(sample_company("acme")).await.unwrap();
    let created = jobs.create(sample_job("acme", "Fleeting")).await.unwrap();

    jobs.remove(created.id).await.unwrap();
    let err = jobs.get(created.id).await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");
}

pub async fn test_removing_company_cascades_to_jobs(
    companies: &dyn CompanyRepository,
    jobs: &dyn JobRepository,
) {
    companies.create(sample_company("doomed")).await.unwrap();
    let created = jobs.create(sample_job("doomed", "Short")).await.unwrap();

    companies.remove("doomed").await.unwrap();
    let err = jobs.get(created.id).await.unwrap_err();
    assert!(matches!(err, JobdeskError::NotFound(_)), "got {err:?}");
}
