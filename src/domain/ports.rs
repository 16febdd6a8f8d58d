use crate::domain::model::{Delimiter, Lead, LeadType, NewLead};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn default_lead_type(&self) -> LeadType;
    fn export_delimiter(&self) -> Delimiter;
    fn output_path(&self) -> &str;
    fn export_filename(&self) -> &str;
}

/// 外部持久化端：負責寫入 lead 與其電話/email 子表
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: NewLead) -> Result<Lead>;
    async fn list(&self, lead_type: Option<LeadType>) -> Result<Vec<Lead>>;
}
