use crate::core::{Lead, LeadRepository, LeadType, NewLead, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 僅存在記憶體中的 lead 儲存，用於 `--dry-run` 與測試
#[derive(Debug, Default)]
pub struct MemoryLeadRepository {
    leads: Mutex<Vec<Lead>>,
}

impl MemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: Mutex::new(leads),
        }
    }

    pub async fn snapshot(&self) -> Vec<Lead> {
        self.leads.lock().await.clone()
    }
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn create(&self, lead: NewLead) -> Result<Lead> {
        let created = Lead {
            id: Uuid::new_v4().to_string(),
            created_at: Some(Utc::now()),
            fields: lead,
        };
        self.leads.lock().await.push(created.clone());
        Ok(created)
    }

    async fn list(&self, lead_type: Option<LeadType>) -> Result<Vec<Lead>> {
        let leads = self.leads.lock().await;
        Ok(leads
            .iter()
            .filter(|lead| lead_type.map_or(true, |t| lead.fields.lead_type == t))
            .cloned()
            .collect())
    }
}
