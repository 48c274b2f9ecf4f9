// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Scan tasks
        manager
            .create_table(
                Table::create()
                    .table(ScanTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScanTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScanTasks::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(ScanTasks::Url).string().not_null())
                    .col(ColumnDef::new(ScanTasks::BackendTaskId).string())
                    .col(ColumnDef::new(ScanTasks::Status).string().not_null())
                    .col(
                        ColumnDef::new(ScanTasks::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScanTasks::PagesScanned)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScanTasks::EstimatedTotalPages)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ScanTasks::CurrentUrl).string())
                    .col(ColumnDef::new(ScanTasks::ErrorMessage).text())
                    .col(ColumnDef::new(ScanTasks::Options).json().not_null())
                    .col(
                        ColumnDef::new(ScanTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ScanTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ScanTasks::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScanTasks::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scan_tasks_owner_created")
                    .table(ScanTasks::Table)
                    .col(ScanTasks::OwnerId)
                    .col(ScanTasks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scan_tasks_status")
                    .table(ScanTasks::Table)
                    .col(ScanTasks::Status)
                    .to_owned(),
            )
            .await?;

        // Audit results, one per completed scan
        manager
            .create_table(
                Table::create()
                    .table(AuditResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditResults::ScanId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditResults::GlobalScore).integer().not_null())
                    .col(ColumnDef::new(AuditResults::SeoScore).integer().not_null())
                    .col(
                        ColumnDef::new(AuditResults::TechnicalScore)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditResults::ContentScore).integer().not_null())
                    .col(
                        ColumnDef::new(AuditResults::PerformanceScore)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuditResults::CriticalIssues)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AuditResults::HighIssues).integer().not_null())
                    .col(ColumnDef::new(AuditResults::MediumIssues).integer().not_null())
                    .col(ColumnDef::new(AuditResults::LowIssues).integer().not_null())
                    .col(ColumnDef::new(AuditResults::PageStats).json().not_null())
                    .col(ColumnDef::new(AuditResults::Pages).json().not_null())
                    .col(
                        ColumnDef::new(AuditResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_results_scan")
                            .from(AuditResults::Table, AuditResults::ScanId)
                            .to(ScanTasks::Table, ScanTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Notifications
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Notifications::ScanId).uuid())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_owner")
                    .table(Notifications::Table)
                    .col(Notifications::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Shared estimates
        manager
            .create_table(
                Table::create()
                    .table(SharedEstimates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedEstimates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SharedEstimates::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SharedEstimates::ScanId).uuid().not_null())
                    .col(ColumnDef::new(SharedEstimates::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(SharedEstimates::RecipientEmail).string())
                    .col(ColumnDef::new(SharedEstimates::Message).text())
                    .col(
                        ColumnDef::new(SharedEstimates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SharedEstimates::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shared_estimates_scan")
                            .from(SharedEstimates::Table, SharedEstimates::ScanId)
                            .to(ScanTasks::Table, ScanTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // PDF reports
        manager
            .create_table(
                Table::create()
                    .table(PdfReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PdfReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PdfReports::ScanId).uuid().not_null())
                    .col(ColumnDef::new(PdfReports::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(PdfReports::StorageKey).string().not_null())
                    .col(ColumnDef::new(PdfReports::SizeBytes).big_integer().not_null())
                    .col(
                        ColumnDef::new(PdfReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PdfReports::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pdf_reports_scan")
                            .from(PdfReports::Table, PdfReports::ScanId)
                            .to(ScanTasks::Table, ScanTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PdfReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SharedEstimates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScanTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScanTasks {
    Table,
    Id,
    OwnerId,
    Url,
    BackendTaskId,
    Status,
    Progress,
    PagesScanned,
    EstimatedTotalPages,
    CurrentUrl,
    ErrorMessage,
    Options,
    CreatedAt,
    UpdatedAt,
    StartedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum AuditResults {
    Table,
    ScanId,
    GlobalScore,
    SeoScore,
    TechnicalScore,
    ContentScore,
    PerformanceScore,
    CriticalIssues,
    HighIssues,
    MediumIssues,
    LowIssues,
    PageStats,
    Pages,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    OwnerId,
    ScanId,
    Kind,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SharedEstimates {
    Table,
    Id,
    Token,
    ScanId,
    OwnerId,
    RecipientEmail,
    Message,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum PdfReports {
    Table,
    Id,
    ScanId,
    OwnerId,
    StorageKey,
    SizeBytes,
    CreatedAt,
    ExpiresAt,
}
