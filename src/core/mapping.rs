use crate::core::numeric::{parse_int_or_null, parse_money_to_number};
use crate::domain::model::{CsvRow, LeadEmail, LeadPhone, LeadType, NewLead};
use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

// 各欄位可接受的欄名，依優先順序排列（英文新版 / 葡文舊版）
pub const COMPANY_NAME_ALIASES: &[&str] = &["company_name", "nome_da_empresa", "nome_empresa"];
pub const CNPJ_ALIASES: &[&str] = &["cnpj", "cnpj_cpf", "documento"];
pub const ADDRESS_ALIASES: &[&str] = &["address", "endereco"];
pub const ACTIVITY_ALIASES: &[&str] = &["cnae_or_activity", "cnae", "atividade", "cnae_atividade"];
pub const AVG_REVENUE_ALIASES: &[&str] = &["avg_revenue", "faturamento_medio", "faturamento"];
pub const AVG_EMPLOYEES_ALIASES: &[&str] = &["avg_employees", "media_funcionarios", "funcionarios"];
pub const PARTNERS_ALIASES: &[&str] = &["partners", "socios"];
pub const DECISION_MAKERS_ALIASES: &[&str] =
    &["decision_makers", "decisores", "tomadores_de_decisao"];
pub const LEAD_TYPE_ALIASES: &[&str] = &["lead_type", "tipo_lead"];

const LIST_SEPARATORS: &[char] = &[',', ';', '|'];

pub const PHONES_ALIASES: &[&str] = &["phones", "telefones"];
pub const PHONE_PRIMARY_ALIASES: &[&str] = &["phone_primary", "telefone_principal"];
pub const EMAILS_ALIASES: &[&str] = &["emails"];
pub const EMAIL_PRIMARY_ALIASES: &[&str] = &["email_primary", "email_principal"];

fn indexed_phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:phone|telefone)_(\d+)$").expect("indexed phone pattern is valid")
    })
}

fn indexed_email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^email_(\d+)$").expect("indexed email pattern is valid"))
}

/// 依別名順序取第一個非空白的值
pub fn pick<'a>(row: &'a CsvRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn pick_string(row: &CsvRow, aliases: &[&str]) -> Option<String> {
    pick(row, aliases).map(str::to_string)
}

/// `phone_1`、`phone_2`、`phone_10`… 依編號（同號再依欄名）排序後的值
fn indexed_values<'a>(row: &'a CsvRow, pattern: &Regex) -> Vec<&'a str> {
    let mut indexed: Vec<(u64, &str, &str)> = row
        .iter()
        .filter_map(|(column, value)| {
            let captures = pattern.captures(column)?;
            let number = captures[1].parse::<u64>().ok()?;
            Some((number, column.as_str(), value.as_str()))
        })
        .collect();

    indexed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    indexed.into_iter().map(|(_, _, value)| value).collect()
}

/// 合併單一分隔欄位與編號欄位：分隔欄位在前，去空白、去空值、保留首次出現順序去重
fn collect_contacts(row: &CsvRow, list_aliases: &[&str], indexed: &Regex) -> Vec<String> {
    let from_list = pick(row, list_aliases)
        .into_iter()
        .flat_map(|value| value.split(LIST_SEPARATORS));
    let from_indexed = indexed_values(row, indexed).into_iter();

    let unique: IndexSet<String> = from_list
        .chain(from_indexed)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    unique.into_iter().collect()
}

fn resolve_lead_type(row: &CsvRow, default: LeadType) -> LeadType {
    pick(row, LEAD_TYPE_ALIASES)
        .and_then(LeadType::from_token)
        .unwrap_or(default)
}

/// 匯出時以 ` | ` 串接的決策者，讀回時還原成換行分隔
fn decision_makers_from_cell(value: &str) -> Option<String> {
    let names: Vec<&str> = value
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join("\n"))
    }
}

/// 將一筆 CSV 資料列轉為待建立的 lead。
///
/// 數值欄位解析失敗一律視為空值，不會中斷匯入。主要聯絡方式只依
/// `*_primary` 欄位做完全比對，未命中時全部保持非主要；補上第一筆為
/// 主要的規則在寫入前才套用（見 [`NewLead::ensure_single_primary`]）。
pub fn map_row(row: &CsvRow, default_type: LeadType) -> NewLead {
    let phone_primary = pick(row, PHONE_PRIMARY_ALIASES);
    let email_primary = pick(row, EMAIL_PRIMARY_ALIASES);

    let phones = collect_contacts(row, PHONES_ALIASES, indexed_phone_pattern())
        .into_iter()
        .map(|phone| {
            let is_primary = phone_primary == Some(phone.as_str());
            LeadPhone::new(phone, is_primary)
        })
        .collect();

    let emails = collect_contacts(row, EMAILS_ALIASES, indexed_email_pattern())
        .into_iter()
        .map(|email| {
            let is_primary = email_primary == Some(email.as_str());
            LeadEmail::new(email, is_primary)
        })
        .collect();

    NewLead {
        lead_type: resolve_lead_type(row, default_type),
        company_name: pick_string(row, COMPANY_NAME_ALIASES),
        cnpj: pick_string(row, CNPJ_ALIASES),
        address: pick_string(row, ADDRESS_ALIASES),
        cnae_or_activity: pick_string(row, ACTIVITY_ALIASES),
        avg_revenue: pick(row, AVG_REVENUE_ALIASES).and_then(parse_money_to_number),
        avg_employees: pick(row, AVG_EMPLOYEES_ALIASES).and_then(parse_int_or_null),
        partners: pick_string(row, PARTNERS_ALIASES),
        decision_makers: pick(row, DECISION_MAKERS_ALIASES).and_then(decision_makers_from_cell),
        phones,
        emails,
    }
}
