use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::CleanupPolicy;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, Report};
use crate::features::reports::repository::ReportRepository;
use crate::features::sections::SectionRepository;
use crate::features::users::UserRepository;
use crate::modules::storage::{unique_key, ObjectStore};
use crate::shared::constants::REPORTS_PREFIX;

/// Service for report operations
///
/// Owns the blob-then-row ordering: a report row is only written after its
/// file landed in the object store, and row deletion always attempts the
/// blob deletion first.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    users: Arc<dyn UserRepository>,
    sections: Arc<dyn SectionRepository>,
    store: Arc<dyn ObjectStore>,
    cleanup_policy: CleanupPolicy,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        users: Arc<dyn UserRepository>,
        sections: Arc<dyn SectionRepository>,
        store: Arc<dyn ObjectStore>,
        cleanup_policy: CleanupPolicy,
    ) -> Self {
        Self {
            reports,
            users,
            sections,
            store,
            cleanup_policy,
        }
    }

    /// Upload a report file and persist its metadata
    ///
    /// Both foreign keys are validated before anything is written; a failed
    /// upload aborts the operation with no row.
    pub async fn save_report(
        &self,
        data: Vec<u8>,
        file_name: &str,
        content_type: &str,
        section_id: i32,
        user_id: i32,
    ) -> Result<Report> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", user_id)))?;

        let section = self
            .sections
            .find_by_id(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Section {} does not exist", section_id)))?;

        let key = unique_key(REPORTS_PREFIX, file_name);
        let file_path = self.store.put(&key, data, content_type).await?;

        let report = self
            .reports
            .insert(NewReport {
                file_name: file_name.to_string(),
                file_path,
                section_id: section.id,
                user_id: user.id,
            })
            .await?;

        info!(
            "Saved report {} ('{}') for section {} / user {}",
            report.id, report.file_name, section.id, user.id
        );

        Ok(report)
    }

    /// All reports of a section; the section itself must exist
    pub async fn reports_by_section(&self, section_id: i32) -> Result<Vec<Report>> {
        self.sections
            .find_by_id(section_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Section {} does not exist", section_id)))?;

        self.reports.find_by_section(section_id).await
    }

    /// Lookup a single report; absence is not an error
    pub async fn report_by_id(&self, report_id: i32) -> Result<Option<Report>> {
        self.reports.find_by_id(report_id).await
    }

    /// Cascade used when a user is removed upstream
    pub async fn delete_by_user(&self, user_id: i32) -> Result<()> {
        let reports = self.reports.find_by_user(user_id).await?;

        for report in reports {
            self.cleanup_blob(&report.file_path).await?;
            self.reports.delete_by_id(report.id).await?;
        }

        Ok(())
    }

    /// Cascade used when a section is removed upstream
    pub async fn delete_by_section(&self, section_id: i32) -> Result<()> {
        let reports = self.reports.find_by_section(section_id).await?;

        for report in reports {
            self.cleanup_blob(&report.file_path).await?;
            self.reports.delete_by_id(report.id).await?;
        }

        Ok(())
    }

    /// Delete a single report; `Ok(false)` when the id does not exist
    pub async fn delete_by_report_idx(&self, idx: i32) -> Result<bool> {
        let Some(report) = self.reports.find_by_id(idx).await? else {
            return Ok(false);
        };

        self.cleanup_blob(&report.file_path).await?;
        self.reports.delete_by_id(report.id).await?;

        info!("Deleted report {} ('{}')", report.id, report.file_name);
        Ok(true)
    }

    /// Delete the blob behind a persisted URL, honoring the cleanup policy.
    ///
    /// Under `BestEffort` a failed blob deletion is logged and the row
    /// deletion proceeds; under `Strict` the error propagates and the row
    /// stays behind.
    async fn cleanup_blob(&self, file_path: &str) -> Result<()> {
        let deletion = match self.store.key_from_url(file_path) {
            Some(key) => self.store.delete(&key).await,
            None => Err(AppError::Storage(format!(
                "URL '{}' does not belong to the configured store",
                file_path
            ))),
        };

        match deletion {
            Ok(()) => Ok(()),
            Err(e) => match self.cleanup_policy {
                CleanupPolicy::BestEffort => {
                    warn!("Blob cleanup failed for '{}': {}", file_path, e);
                    Ok(())
                }
                CleanupPolicy::Strict => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        FakeObjectStore, InMemoryReports, InMemorySections, InMemoryUsers,
    };

    fn service_with(
        reports: Arc<InMemoryReports>,
        users: Arc<InMemoryUsers>,
        sections: Arc<InMemorySections>,
        store: Arc<FakeObjectStore>,
        policy: CleanupPolicy,
    ) -> ReportService {
        ReportService::new(reports, users, sections, store, policy)
    }

    fn seeded() -> (
        Arc<InMemoryReports>,
        Arc<InMemoryUsers>,
        Arc<InMemorySections>,
        Arc<FakeObjectStore>,
    ) {
        let reports = Arc::new(InMemoryReports::new());
        let users = Arc::new(InMemoryUsers::with_ids(&[1]));
        let sections = Arc::new(InMemorySections::with_ids(&[5]));
        let store = Arc::new(FakeObjectStore::new());
        (reports, users, sections, store)
    }

    #[tokio::test]
    async fn save_report_unknown_user_writes_nothing() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let result = service
            .save_report(b"pdf".to_vec(), "survey.pdf", "application/pdf", 5, 99)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(reports.len(), 0);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn save_report_unknown_section_writes_nothing() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let result = service
            .save_report(b"pdf".to_vec(), "survey.pdf", "application/pdf", 42, 1)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(reports.len(), 0);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn save_report_uploads_blob_then_row() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let report = service
            .save_report(b"pdf".to_vec(), "survey.pdf", "application/pdf", 5, 1)
            .await
            .unwrap();

        assert_eq!(report.file_name, "survey.pdf");
        assert_eq!(report.section_id, 5);
        assert_eq!(report.user_id, 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(store.object_count(), 1);

        // The persisted URL resolves back to the stored blob
        let key = store.key_from_url(&report.file_path).unwrap();
        assert!(key.starts_with("reports/"));
        assert!(key.ends_with("_survey.pdf"));
        assert!(store.contains_key(&key));
    }

    #[tokio::test]
    async fn save_report_upload_failure_aborts_without_row() {
        let (reports, users, sections, store) = seeded();
        store.fail_puts();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let result = service
            .save_report(b"pdf".to_vec(), "survey.pdf", "application/pdf", 5, 1)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(reports.len(), 0);
    }

    #[tokio::test]
    async fn delete_by_report_idx_is_idempotent_in_effect() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let report = service
            .save_report(b"pdf".to_vec(), "survey.pdf", "application/pdf", 5, 1)
            .await
            .unwrap();

        assert!(service.delete_by_report_idx(report.id).await.unwrap());
        assert_eq!(reports.len(), 0);
        assert_eq!(store.delete_attempts(), 1);

        // Second call finds nothing and attempts nothing
        assert!(!service.delete_by_report_idx(report.id).await.unwrap());
        assert_eq!(store.delete_attempts(), 1);
    }

    #[tokio::test]
    async fn section_cascade_survives_failing_blob_deletes() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        let mut file_paths = Vec::new();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            let report = service
                .save_report(b"pdf".to_vec(), name, "application/pdf", 5, 1)
                .await
                .unwrap();
            file_paths.push(report.file_path);
        }

        // One of the three blob deletes will fail
        let failing_key = store.key_from_url(&file_paths[1]).unwrap();
        store.fail_delete_of(&failing_key);
        store.reset_delete_attempts();

        service.delete_by_section(5).await.unwrap();

        assert_eq!(reports.len(), 0);
        assert_eq!(store.delete_attempts(), 3);
    }

    #[tokio::test]
    async fn strict_policy_keeps_row_when_blob_delete_fails() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::Strict,
        );

        let report = service
            .save_report(b"pdf".to_vec(), "a.pdf", "application/pdf", 5, 1)
            .await
            .unwrap();

        let key = store.key_from_url(&report.file_path).unwrap();
        store.fail_delete_of(&key);

        let result = service.delete_by_section(5).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(reports.len(), 1);
    }

    #[tokio::test]
    async fn user_cascade_only_touches_that_users_reports() {
        let reports = Arc::new(InMemoryReports::new());
        let users = Arc::new(InMemoryUsers::with_ids(&[1, 2]));
        let sections = Arc::new(InMemorySections::with_ids(&[5]));
        let store = Arc::new(FakeObjectStore::new());
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store.clone(),
            CleanupPolicy::BestEffort,
        );

        service
            .save_report(b"pdf".to_vec(), "mine.pdf", "application/pdf", 5, 1)
            .await
            .unwrap();
        let kept = service
            .save_report(b"pdf".to_vec(), "theirs.pdf", "application/pdf", 5, 2)
            .await
            .unwrap();

        service.delete_by_user(1).await.unwrap();

        let remaining = reports.find_by_section(5).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[tokio::test]
    async fn reports_by_section_requires_existing_section() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(reports, users, sections, store, CleanupPolicy::BestEffort);

        let result = service.reports_by_section(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn reports_by_section_returns_insertion_order() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(
            reports.clone(),
            users,
            sections,
            store,
            CleanupPolicy::BestEffort,
        );

        for name in ["first.pdf", "second.pdf"] {
            service
                .save_report(b"pdf".to_vec(), name, "application/pdf", 5, 1)
                .await
                .unwrap();
        }

        let listed = service.reports_by_section(5).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].file_name, "first.pdf");
        assert_eq!(listed[1].file_name, "second.pdf");
    }

    #[tokio::test]
    async fn report_by_id_absence_is_not_an_error() {
        let (reports, users, sections, store) = seeded();
        let service = service_with(reports, users, sections, store, CleanupPolicy::BestEffort);

        assert!(service.report_by_id(999).await.unwrap().is_none());
    }
}
