use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 一筆 CSV 資料列：正規化後的欄名 → 儲存格內容，保留欄位出現順序
pub type CsvRow = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    #[default]
    Cliente,
    Fornecedor,
}

impl LeadType {
    /// 舊版匯出檔使用的類型代碼，讀入時視為 `cliente`
    pub const LEGACY_TOKEN: &'static str = "prospect";

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadType::Cliente => "cliente",
            LeadType::Fornecedor => "fornecedor",
        }
    }

    /// 解析類型代碼（不分大小寫），包含舊版代碼；無法辨識時回傳 None
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "cliente" => Some(LeadType::Cliente),
            "fornecedor" => Some(LeadType::Fornecedor),
            Self::LEGACY_TOKEN => Some(LeadType::Cliente),
            _ => None,
        }
    }
}

impl fmt::Display for LeadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LeadType::from_token(s).ok_or_else(|| {
            format!(
                "unknown lead type '{}', expected 'cliente' or 'fornecedor'",
                s
            )
        })
    }
}

/// 匯出 CSV 的欄位分隔符號
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[serde(rename = ",", alias = "comma")]
    Comma,
    #[default]
    #[serde(rename = ";", alias = "semicolon")]
    Semicolon,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.as_char() as u8
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "," | "comma" => Ok(Delimiter::Comma),
            ";" | "semicolon" => Ok(Delimiter::Semicolon),
            other => Err(format!(
                "unsupported delimiter '{}', expected ',' or ';'",
                other
            )),
        }
    }
}

/// 電話與 email 共用的「主要聯絡方式」行為
pub trait Contact {
    fn value(&self) -> &str;
    fn is_primary(&self) -> bool;
    fn set_primary(&mut self, primary: bool);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPhone {
    pub phone: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl LeadPhone {
    pub fn new(phone: impl Into<String>, is_primary: bool) -> Self {
        Self {
            phone: phone.into(),
            is_primary,
        }
    }
}

impl Contact for LeadPhone {
    fn value(&self) -> &str {
        &self.phone
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn set_primary(&mut self, primary: bool) {
        self.is_primary = primary;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadEmail {
    pub email: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl LeadEmail {
    pub fn new(email: impl Into<String>, is_primary: bool) -> Self {
        Self {
            email: email.into(),
            is_primary,
        }
    }
}

impl Contact for LeadEmail {
    fn value(&self) -> &str {
        &self.email
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn set_primary(&mut self, primary: bool) {
        self.is_primary = primary;
    }
}

/// 保證最多一筆主要聯絡方式：保留第一個標記為主要者，
/// 若全部未標記且清單非空，則將第一筆提升為主要。
pub fn ensure_single_primary<C: Contact>(contacts: &mut [C]) {
    let primary_index = contacts
        .iter()
        .position(|contact| contact.is_primary())
        .unwrap_or(0);

    for (index, contact) in contacts.iter_mut().enumerate() {
        contact.set_primary(index == primary_index);
    }
}

pub fn primary_value<C: Contact>(contacts: &[C]) -> Option<&str> {
    contacts
        .iter()
        .find(|contact| contact.is_primary())
        .map(|contact| contact.value())
}

/// 尚未寫入的 lead，交給持久化端建立
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewLead {
    pub lead_type: LeadType,
    pub company_name: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub cnae_or_activity: Option<String>,
    pub avg_revenue: Option<f64>,
    pub avg_employees: Option<i64>,
    pub partners: Option<String>,
    /// 以換行分隔的多位決策者
    pub decision_makers: Option<String>,
    #[serde(default)]
    pub phones: Vec<LeadPhone>,
    #[serde(default)]
    pub emails: Vec<LeadEmail>,
}

impl NewLead {
    pub fn new(lead_type: LeadType) -> Self {
        Self {
            lead_type,
            ..Default::default()
        }
    }

    /// 寫入前套用主要聯絡方式的規則，電話與 email 各自獨立處理
    pub fn ensure_single_primary(&mut self) {
        ensure_single_primary(&mut self.phones);
        ensure_single_primary(&mut self.emails);
    }

    pub fn primary_phone(&self) -> Option<&str> {
        primary_value(&self.phones)
    }

    pub fn primary_email(&self) -> Option<&str> {
        primary_value(&self.emails)
    }
}

/// 已由持久化端建立的 lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: NewLead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}
