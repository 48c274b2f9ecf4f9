// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit_result::AuditResult;
use crate::domain::models::estimate::{format_cents, CostEstimate};
use crate::domain::models::scan_task::ScanTask;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;
/// 报告中列出的页面数上限
const MAX_LISTED_PAGES: usize = 50;

/// 报告生成错误
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// 报告中的一行文本
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
}

impl ReportLine {
    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 14.0,
            bold: true,
        }
    }

    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 10.0,
            bold: false,
        }
    }

    fn blank() -> Self {
        Self::body("")
    }
}

/// 组织报告内容
///
/// 与渲染分离，便于单独测试报告包含的信息。
pub fn build_report_lines(
    task: &ScanTask,
    result: &AuditResult,
    estimate: &CostEstimate,
) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine {
            text: "SEO Audit Report".to_string(),
            font_size: 20.0,
            bold: true,
        },
        ReportLine::body(format!("Website: {}", task.url)),
        ReportLine::body(format!(
            "Date: {}",
            result.created_at.format("%Y-%m-%d %H:%M UTC")
        )),
        ReportLine::body(format!("Pages analysed: {}", result.page_stats.total_pages)),
        ReportLine::blank(),
        ReportLine::heading("Scores"),
        ReportLine::body(format!("Global: {}/100", result.scores.global)),
        ReportLine::body(format!("SEO: {}/100", result.scores.seo)),
        ReportLine::body(format!("Technical: {}/100", result.scores.technical)),
        ReportLine::body(format!("Content: {}/100", result.scores.content)),
        ReportLine::body(format!("Performance: {}/100", result.scores.performance)),
        ReportLine::blank(),
        ReportLine::heading("Issues"),
        ReportLine::body(format!("Critical: {}", result.issues.critical)),
        ReportLine::body(format!("High: {}", result.issues.high)),
        ReportLine::body(format!("Medium: {}", result.issues.medium)),
        ReportLine::body(format!("Low: {}", result.issues.low)),
        ReportLine::blank(),
        ReportLine::heading("Optimization estimate"),
    ];

    if estimate.items.is_empty() {
        lines.push(ReportLine::body("No optimization work required."));
    }
    for item in &estimate.items {
        lines.push(ReportLine::body(format!(
            "{}: {} x {} = {}",
            item.category,
            item.unit_count,
            format_cents(item.unit_price_cents, &estimate.currency),
            format_cents(item.total_cents, &estimate.currency),
        )));
    }
    lines.push(ReportLine {
        text: format!(
            "Total: {}",
            format_cents(estimate.total_cents, &estimate.currency)
        ),
        font_size: 11.0,
        bold: true,
    });

    if !result.pages.is_empty() {
        lines.push(ReportLine::blank());
        lines.push(ReportLine::heading("Pages"));
        for page in result.pages.iter().take(MAX_LISTED_PAGES) {
            lines.push(ReportLine::body(format!(
                "[{}] {} ({} ms, {} issues)",
                page.status_code, page.url, page.load_time_ms, page.issue_count
            )));
        }
        if result.pages.len() > MAX_LISTED_PAGES {
            lines.push(ReportLine::body(format!(
                "... and {} more",
                result.pages.len() - MAX_LISTED_PAGES
            )));
        }
    }

    lines
}

/// 将报告渲染为 A4 PDF
///
/// 内置字体只覆盖 WinAnsi 字符集，文本先转写为 ASCII。
pub fn render_pdf(title: &str, lines: &[ReportLine]) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        deunicode::deunicode(title),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Render(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in lines {
        if y < MARGIN_MM {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.text.is_empty() {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(
                deunicode::deunicode(&line.text),
                line.font_size,
                Mm(MARGIN_MM),
                Mm(y),
                font,
            );
        }
        y -= LINE_HEIGHT_MM.max(line.font_size * 0.5);
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::Render(e.to_string()))
}
