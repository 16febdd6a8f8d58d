use crate::core::{Lead, LeadRepository, LeadType, NewLead, Result, Storage};
use crate::utils::error::LeadError;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 以單一 JSON 陣列檔保存 lead，首次存取時才載入
pub struct JsonFileLeadRepository<S: Storage> {
    storage: S,
    path: String,
    leads: Mutex<Option<Vec<Lead>>>,
}

impl<S: Storage> JsonFileLeadRepository<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            leads: Mutex::new(None),
        }
    }

    async fn load(&self) -> Result<Vec<Lead>> {
        match self.storage.read_file(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(LeadError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Lead store {} not found, starting empty", self.path);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_loaded<'a>(&self, slot: &'a mut Option<Vec<Lead>>) -> Result<&'a mut Vec<Lead>> {
        if slot.is_none() {
            *slot = Some(self.load().await?);
        }
        Ok(slot.get_or_insert_with(Vec::new))
    }
}

#[async_trait]
impl<S: Storage> LeadRepository for JsonFileLeadRepository<S> {
    async fn create(&self, lead: NewLead) -> Result<Lead> {
        let mut guard = self.leads.lock().await;
        let leads = self.ensure_loaded(&mut guard).await?;

        let created = Lead {
            id: Uuid::new_v4().to_string(),
            created_at: Some(Utc::now()),
            fields: lead,
        };
        leads.push(created.clone());

        let persisted = match serde_json::to_vec_pretty(&*leads) {
            Ok(data) => self.storage.write_file(&self.path, &data).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = persisted {
            // 寫檔失敗時回復快取，避免記憶體與檔案不一致
            leads.pop();
            return Err(e);
        }

        Ok(created)
    }

    async fn list(&self, lead_type: Option<LeadType>) -> Result<Vec<Lead>> {
        let mut guard = self.leads.lock().await;
        let leads = self.ensure_loaded(&mut guard).await?;

        Ok(leads
            .iter()
            .filter(|lead| lead_type.map_or(true, |t| lead.fields.lead_type == t))
            .cloned()
            .collect())
    }
}
