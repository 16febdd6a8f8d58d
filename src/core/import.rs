use crate::core::mapping::map_row;
use crate::domain::model::{CsvRow, ImportSummary, LeadType};
use crate::domain::ports::LeadRepository;

/// 逐列匯入：每列一次 `create`，等前一列完成才處理下一列。
///
/// 單列失敗只記錄為 `Linha N: 訊息`（N 為含標題列的 CSV 行號），不會中斷整批。
pub async fn import_leads<R>(repository: &R, rows: &[CsvRow], lead_type: LeadType) -> ImportSummary
where
    R: LeadRepository + ?Sized,
{
    let mut summary = ImportSummary::default();

    for (index, row) in rows.iter().enumerate() {
        let line = index + 2;
        let mut lead = map_row(row, lead_type);
        lead.ensure_single_primary();

        match repository.create(lead).await {
            Ok(created) => {
                tracing::debug!("Line {} imported as lead {}", line, created.id);
                summary.imported += 1;
            }
            Err(e) => {
                tracing::warn!("⚠️ Line {} failed: {}", line, e);
                summary.errors.push(format!("Linha {}: {}", line, e));
            }
        }
    }

    tracing::info!(
        "📥 Import finished: {} imported, {} failed",
        summary.imported,
        summary.failed()
    );

    summary
}
