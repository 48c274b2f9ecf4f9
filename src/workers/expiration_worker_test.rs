use super::*;
use crate::domain::models::pdf_report::PdfReport;
use crate::domain::models::scan_task::{ScanOptions, ScanTask};
use crate::domain::models::shared_estimate::SharedEstimate;
use crate::domain::repositories::scan_task_repository::ScanTaskRepository;
use crate::infrastructure::database::test_connection;
use crate::infrastructure::repositories::pdf_report_repo_impl::PdfReportRepositoryImpl;
use crate::infrastructure::repositories::scan_task_repo_impl::ScanTaskRepositoryImpl;
use crate::infrastructure::repositories::shared_estimate_repo_impl::SharedEstimateRepositoryImpl;
use crate::infrastructure::storage::InMemoryStorage;
use uuid::Uuid;

struct Fixture {
    worker: ExpirationWorker,
    shared: Arc<SharedEstimateRepositoryImpl>,
    reports: Arc<PdfReportRepositoryImpl>,
    storage: Arc<InMemoryStorage>,
    scan: ScanTask,
}

async fn fixture() -> Fixture {
    let db = test_connection().await;
    let scan = ScanTask::new(
        Uuid::new_v4(),
        "https://acme.test/".to_string(),
        ScanOptions::default(),
    );
    ScanTaskRepositoryImpl::new(db.clone())
        .create(&scan)
        .await
        .unwrap();

    let shared = Arc::new(SharedEstimateRepositoryImpl::new(db.clone()));
    let reports = Arc::new(PdfReportRepositoryImpl::new(db));
    let storage = Arc::new(InMemoryStorage::new());
    let worker = ExpirationWorker::new(
        shared.clone(),
        reports.clone(),
        storage.clone(),
        Duration::from_secs(3600),
    );
    Fixture {
        worker,
        shared,
        reports,
        storage,
        scan,
    }
}

#[tokio::test]
async fn test_cleanup_removes_only_expired_data() {
    let f = fixture().await;
    let hours = chrono::Duration::hours;

    let expired_link = SharedEstimate::new(f.scan.id, f.scan.owner_id, None, None, hours(-1));
    let live_link = SharedEstimate::new(f.scan.id, f.scan.owner_id, None, None, hours(24));
    f.shared.create(&expired_link).await.unwrap();
    f.shared.create(&live_link).await.unwrap();

    let expired_report = PdfReport::new(f.scan.id, f.scan.owner_id, 8, hours(-2));
    let live_report = PdfReport::new(f.scan.id, f.scan.owner_id, 8, hours(24));
    for report in [&expired_report, &live_report] {
        f.storage.save(&report.storage_key, b"%PDF-1.3").await.unwrap();
        f.reports.create(report).await.unwrap();
    }

    let stats = f.worker.cleanup_expired(Utc::now().into()).await;
    assert_eq!(
        stats,
        CleanupStats {
            shared_estimates: 1,
            reports: 1
        }
    );

    assert!(f.shared.find_by_token(&expired_link.token).await.unwrap().is_none());
    assert!(f.shared.find_by_token(&live_link.token).await.unwrap().is_some());
    assert!(f.reports.find_by_id(expired_report.id).await.unwrap().is_none());
    assert!(!f.storage.exists(&expired_report.storage_key).await.unwrap());
    assert!(f.reports.find_by_id(live_report.id).await.unwrap().is_some());
    assert!(f.storage.exists(&live_report.storage_key).await.unwrap());
}

#[tokio::test]
async fn test_cleanup_with_nothing_expired() {
    let f = fixture().await;
    let stats = f.worker.cleanup_expired(Utc::now().into()).await;
    assert_eq!(stats, CleanupStats::default());
}

#[tokio::test]
async fn test_worker_stops_on_shutdown() {
    let f = fixture().await;
    let token = f.worker.shutdown_token();
    let handle = f.worker.start();

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
}
