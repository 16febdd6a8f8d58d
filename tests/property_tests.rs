use leads_etl::domain::model::ensure_single_primary;
use leads_etl::{
    parse_csv, parse_int_or_null, parse_money_to_number, to_csv, CsvRow, Delimiter, LeadPhone,
};
use proptest::prelude::*;

/// 共用同一組欄名的資料列，值不含分隔符號、引號或換行
fn plain_rows() -> impl Strategy<Value = Vec<CsvRow>> {
    prop::collection::btree_set("[a-z][a-z_]{0,7}", 2..=5).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        let cell = prop_oneof![
            Just(String::new()),
            "[A-Za-z0-9@.]([A-Za-z0-9 @.-]{0,10}[A-Za-z0-9@.])?",
        ];
        prop::collection::vec(prop::collection::vec(cell, keys.len()), 1..6).prop_map(
            move |table| {
                table
                    .into_iter()
                    .map(|values| keys.iter().cloned().zip(values).collect())
                    .collect()
            },
        )
    })
}

proptest! {
    #[test]
    fn semicolon_export_parses_back_to_same_rows(rows in plain_rows()) {
        let text = to_csv(&rows, Delimiter::Semicolon);
        let parsed = parse_csv(&text).unwrap();
        prop_assert_eq!(parsed, rows);
    }

    #[test]
    fn parse_csv_never_panics(text in "\\PC*") {
        let _ = parse_csv(&text);
    }

    #[test]
    fn every_parsed_row_has_every_header(text in "[a-c,;\"\n ]{0,40}") {
        if let Ok(rows) = parse_csv(&text) {
            if let Some(first) = rows.first() {
                let keys: Vec<&String> = first.keys().collect();
                for row in &rows {
                    prop_assert_eq!(row.keys().collect::<Vec<_>>(), keys.clone());
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn numeric_parsers_never_panic(text in "\\PC*") {
        let _ = parse_money_to_number(&text);
        let _ = parse_int_or_null(&text);
    }

    #[test]
    fn plain_integers_parse_exactly(value in -1_000_000i64..=1_000_000i64) {
        prop_assert_eq!(parse_int_or_null(&value.to_string()), Some(value));
    }

    #[test]
    fn exactly_one_primary_after_promotion(flags in prop::collection::vec(any::<bool>(), 1..8)) {
        let mut phones: Vec<LeadPhone> = flags
            .iter()
            .enumerate()
            .map(|(i, flag)| LeadPhone::new(i.to_string(), *flag))
            .collect();

        ensure_single_primary(&mut phones);

        let primaries: Vec<usize> = phones
            .iter()
            .enumerate()
            .filter(|(_, phone)| phone.is_primary)
            .map(|(i, _)| i)
            .collect();
        let expected = flags.iter().position(|flag| *flag).unwrap_or(0);
        prop_assert_eq!(primaries, vec![expected]);
    }
}
