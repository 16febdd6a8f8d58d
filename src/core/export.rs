use crate::core::csv_codec::to_csv;
use crate::core::numeric::format_money;
use crate::domain::model::{primary_value, Contact, CsvRow, Delimiter, Lead};

/// 匯出欄位，順序固定
pub const EXPORT_COLUMNS: &[&str] = &[
    "id",
    "lead_type",
    "company_name",
    "cnpj",
    "address",
    "cnae_or_activity",
    "avg_revenue",
    "avg_employees",
    "partners",
    "decision_makers",
    "phones",
    "phone_primary",
    "emails",
    "email_primary",
];

const MULTI_VALUE_SEPARATOR: &str = " | ";

fn join_contacts<C: Contact>(contacts: &[C]) -> String {
    contacts
        .iter()
        .map(|contact| contact.value())
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_SEPARATOR)
}

/// 換行改為 ` | `，匯出檔每筆 lead 保持單行
fn join_lines(text: &str) -> String {
    text.split(|c| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_SEPARATOR)
}

pub fn lead_to_row(lead: &Lead) -> CsvRow {
    let fields = &lead.fields;
    let text = |value: &Option<String>| value.as_deref().map(join_lines).unwrap_or_default();

    let cells = [
        lead.id.clone(),
        fields.lead_type.as_str().to_string(),
        text(&fields.company_name),
        text(&fields.cnpj),
        text(&fields.address),
        text(&fields.cnae_or_activity),
        fields.avg_revenue.map(format_money).unwrap_or_default(),
        fields
            .avg_employees
            .map(|value| value.to_string())
            .unwrap_or_default(),
        text(&fields.partners),
        text(&fields.decision_makers),
        join_contacts(&fields.phones),
        primary_value(&fields.phones).unwrap_or_default().to_string(),
        join_contacts(&fields.emails),
        primary_value(&fields.emails).unwrap_or_default().to_string(),
    ];

    EXPORT_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .zip(cells)
        .collect()
}

pub fn leads_to_csv(leads: &[Lead], delimiter: Delimiter) -> String {
    let rows: Vec<CsvRow> = leads.iter().map(lead_to_row).collect();
    to_csv(&rows, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::csv_codec::parse_csv;
    use crate::core::mapping::map_row;
    use crate::domain::model::{LeadEmail, LeadPhone, LeadType, NewLead};

    fn sample_lead() -> Lead {
        Lead {
            id: "7f1c".to_string(),
            created_at: None,
            fields: NewLead {
                lead_type: LeadType::Fornecedor,
                company_name: Some("Silva & Filhos".to_string()),
                cnpj: Some("12.345.678/0001-90".to_string()),
                address: None,
                cnae_or_activity: Some("6920-6/01".to_string()),
                avg_revenue: Some(150000.0),
                avg_employees: Some(12),
                partners: None,
                decision_makers: Some("Ana\nCarla\n".to_string()),
                phones: vec![LeadPhone::new("111", false), LeadPhone::new("222", true)],
                emails: vec![LeadEmail::new("a@x.com", true)],
            },
        }
    }

    #[test]
    fn test_lead_to_row_columns_and_values() {
        let row = lead_to_row(&sample_lead());

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, EXPORT_COLUMNS);
        assert_eq!(row["lead_type"], "fornecedor");
        assert_eq!(row["address"], "");
        assert_eq!(row["avg_revenue"], "150000");
        assert_eq!(row["avg_employees"], "12");
        assert_eq!(row["decision_makers"], "Ana | Carla");
        assert_eq!(row["phones"], "111 | 222");
        assert_eq!(row["phone_primary"], "222");
        assert_eq!(row["emails"], "a@x.com");
        assert_eq!(row["email_primary"], "a@x.com");
    }

    #[test]
    fn test_leads_to_csv_semicolon_output() {
        let csv = leads_to_csv(&[sample_lead()], Delimiter::Semicolon);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], EXPORT_COLUMNS.join(";"));
        assert!(lines[1].starts_with("7f1c;fornecedor;Silva & Filhos;"));
    }

    #[test]
    fn test_export_reimports_to_same_lead() {
        let original = sample_lead();
        let csv = leads_to_csv(std::slice::from_ref(&original), Delimiter::Semicolon);

        let rows = parse_csv(&csv).unwrap();
        let mut reimported = map_row(&rows[0], LeadType::Cliente);
        reimported.ensure_single_primary();

        assert_eq!(reimported.lead_type, LeadType::Fornecedor);
        assert_eq!(reimported.company_name, original.fields.company_name);
        assert_eq!(reimported.avg_revenue, Some(150000.0));
        assert_eq!(reimported.decision_makers.as_deref(), Some("Ana\nCarla"));
        assert_eq!(reimported.phones, original.fields.phones);
        assert_eq!(reimported.emails, original.fields.emails);
    }

    #[test]
    fn test_fractional_revenue_survives_reimport() {
        let mut lead = sample_lead();
        lead.fields.avg_revenue = Some(1234.56);

        let row = lead_to_row(&lead);
        assert_eq!(row["avg_revenue"], "1234,56");

        let rows = parse_csv(&leads_to_csv(&[lead], Delimiter::Semicolon)).unwrap();
        assert_eq!(map_row(&rows[0], LeadType::Cliente).avg_revenue, Some(1234.56));
    }

    #[test]
    fn test_multiline_text_fields_stay_on_one_line() {
        let mut lead = sample_lead();
        lead.fields.address = Some("Rua A, 10\nSala 2".to_string());
        lead.fields.partners = Some("Ana\rBruno\r\nCarla".to_string());

        let row = lead_to_row(&lead);
        assert_eq!(row["address"], "Rua A, 10 | Sala 2");
        assert_eq!(row["partners"], "Ana | Bruno | Carla");

        let csv = leads_to_csv(&[lead, sample_lead()], Delimiter::Semicolon);
        assert_eq!(csv.split('\n').count(), 3);

        let rows = parse_csv(&csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["address"], "Rua A, 10 | Sala 2");
        assert_eq!(rows[1]["id"], "7f1c");
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(leads_to_csv(&[], Delimiter::Semicolon), "");
    }
}
