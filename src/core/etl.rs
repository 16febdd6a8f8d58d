use crate::core::csv_codec::parse_csv;
use crate::core::export::leads_to_csv;
use crate::core::import::import_leads;
use crate::domain::model::{ImportSummary, LeadType};
use crate::domain::ports::{ConfigProvider, LeadRepository, Storage};
use crate::utils::error::Result;

/// 串起檔案存取、CSV 編解碼與持久化端的匯入/匯出流程
pub struct LeadEtlEngine<S: Storage, R: LeadRepository, C: ConfigProvider> {
    storage: S,
    repository: R,
    config: C,
}

impl<S: Storage, R: LeadRepository, C: ConfigProvider> LeadEtlEngine<S, R, C> {
    pub fn new(storage: S, repository: R, config: C) -> Self {
        Self {
            storage,
            repository,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// 讀檔、解碼或解析失敗時整批回傳錯誤，此時尚未寫入任何資料列
    pub async fn import_file(&self, path: &str, lead_type: Option<LeadType>) -> Result<ImportSummary> {
        tracing::info!("📂 Reading leads from {}", path);
        let bytes = self.storage.read_file(path).await?;
        let text = String::from_utf8(bytes)?;

        let rows = parse_csv(&text)?;
        tracing::info!("Parsed {} data rows", rows.len());

        let lead_type = lead_type.unwrap_or_else(|| self.config.default_lead_type());
        tracing::debug!("Default lead type: {}", lead_type);

        Ok(import_leads(&self.repository, &rows, lead_type).await)
    }

    /// 匯出並寫入 `{output_path}/{filename}`，回傳輸出路徑
    pub async fn export_file(&self, lead_type: Option<LeadType>) -> Result<String> {
        let leads = self.repository.list(lead_type).await?;
        tracing::info!("📤 Exporting {} leads", leads.len());

        let csv = leads_to_csv(&leads, self.config.export_delimiter());
        let output_path = format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            self.config.export_filename()
        );

        self.storage.write_file(&output_path, csv.as_bytes()).await?;
        tracing::debug!("Wrote {} bytes to {}", csv.len(), output_path);

        Ok(output_path)
    }
}
