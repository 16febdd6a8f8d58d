use crate::domain::model::{CsvRow, Delimiter};
use crate::utils::error::Result;
use indexmap::IndexSet;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn non_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("non-word pattern is valid"))
}

/// 葡文重音字母折回 ASCII，避免 `Endereço` 被剝成 `endereo`
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// 欄名正規化：去頭尾空白、轉小寫、空白改為底線、移除非字元符號
pub fn normalize_header(header: &str) -> String {
    let folded: String = header
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .collect();
    let underscored = whitespace_pattern().replace_all(&folded, "_");
    non_word_pattern().replace_all(&underscored, "").into_owned()
}

/// 只看第一行：分號嚴格多於逗號才用分號
pub fn detect_delimiter(line: &str) -> Delimiter {
    let commas = line.matches(',').count();
    let semicolons = line.matches(';').count();
    if semicolons > commas {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

/// 分隔符號後、開頭引號前的空白移除，讓手動編輯的 `1, "x,y"` 仍是引號欄位
fn strip_space_before_quotes(line: &str, delimiter: Delimiter) -> Cow<'_, str> {
    if !line.contains('"') {
        return Cow::Borrowed(line);
    }

    let separator = delimiter.as_char();
    let mut out = String::with_capacity(line.len());
    let mut pending = String::new();
    let mut field_start = true;
    let mut quoted = false;
    let mut in_quotes = false;

    for c in line.chars() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            }
            out.push(c);
            continue;
        }

        if field_start {
            if c == ' ' || c == '\t' {
                pending.push(c);
                continue;
            }
            field_start = false;
            quoted = c == '"';
            if quoted {
                in_quotes = true;
                pending.clear();
                out.push(c);
                continue;
            }
            out.push_str(&pending);
            pending.clear();
        } else if quoted && c == '"' {
            // `""` 跳脫
            in_quotes = true;
            out.push(c);
            continue;
        }

        if c == separator {
            field_start = true;
        }
        out.push(c);
    }
    out.push_str(&pending);

    Cow::Owned(out)
}

/// 以 csv reader 拆解單一行。引號不跨行；未閉合的引號會一路吃到行尾。
fn split_fields(line: &str, delimiter: Delimiter) -> Result<Vec<String>> {
    let line = strip_space_before_quotes(line, delimiter);
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .trim(::csv::Trim::All)
        .from_reader(line.as_bytes());

    let mut record = ::csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(Vec::new());
    }

    Ok(record.iter().map(str::to_string).collect())
}

pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text
        .split(|c| c == '\r' || c == '\n')
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Ok(Vec::new());
    };

    let delimiter = detect_delimiter(header_line);
    let headers: Vec<String> = split_fields(header_line, delimiter)?
        .iter()
        .map(|header| normalize_header(header))
        .collect();

    tracing::debug!(
        "Detected delimiter '{}' with {} columns",
        delimiter.as_char(),
        headers.iter().filter(|h| !h.is_empty()).count()
    );

    let mut rows = Vec::new();
    for line in lines {
        let cells = split_fields(line, delimiter)?;
        let mut row = CsvRow::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            // 正規化後為空的欄名連同整欄一起丟棄
            if header.is_empty() {
                continue;
            }
            let value = cells.get(index).cloned().unwrap_or_default();
            row.insert(header.clone(), value);
        }

        rows.push(row);
    }

    Ok(rows)
}

fn escape_cell(value: &str, delimiter: Delimiter) -> Cow<'_, str> {
    let needs_quotes = value.contains(delimiter.as_char())
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// 欄位為所有資料列鍵的聯集，依首次出現順序排列；不含結尾換行
pub fn to_csv(rows: &[CsvRow], delimiter: Delimiter) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let headers: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();
    let separator = delimiter.as_char().to_string();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|header| escape_cell(header, delimiter))
            .collect::<Vec<_>>()
            .join(&separator),
    );

    for row in rows {
        lines.push(
            headers
                .iter()
                .map(|header| {
                    let value = row.get(*header).map(String::as_str).unwrap_or("");
                    escape_cell(value, delimiter)
                })
                .collect::<Vec<_>>()
                .join(&separator),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Company Name "), "company_name");
        assert_eq!(normalize_header("Nome da   Empresa"), "nome_da_empresa");
        assert_eq!(normalize_header("E-mail (principal)"), "email_principal");
        assert_eq!(normalize_header("Endereço"), "endereco");
        assert_eq!(normalize_header("Sócios"), "socios");
        assert_eq!(normalize_header("###"), "");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("a;b;c"), Delimiter::Semicolon);
        assert_eq!(detect_delimiter("a;b,c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("abc"), Delimiter::Comma);
    }

    #[test]
    fn test_parse_comma_and_semicolon_files() {
        let comma = parse_csv("a,b,c\n1,2,3").unwrap();
        assert_eq!(comma, vec![row(&[("a", "1"), ("b", "2"), ("c", "3")])]);

        let semicolon = parse_csv("a;b;c\n1;2,5;3").unwrap();
        assert_eq!(semicolon, vec![row(&[("a", "1"), ("b", "2,5"), ("c", "3")])]);
    }

    #[test]
    fn test_tie_defaults_to_comma() {
        // 同數量時以逗號切分，`a;b` 正規化後成為 `ab`
        let rows = parse_csv("a;b,c\nx;y,z").unwrap();
        assert_eq!(rows, vec![row(&[("ab", "x;y"), ("c", "z")])]);
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        let rows = parse_csv("a,b\n1,\"x,y\"").unwrap();
        assert_eq!(rows, vec![row(&[("a", "1"), ("b", "x,y")])]);
    }

    #[test]
    fn test_space_before_quoted_field() {
        let rows = parse_csv("a,b,c\n1, \"x,y\" ,z\n2,\t\"say \"\"hi\"\"\",w").unwrap();

        assert_eq!(rows[0], row(&[("a", "1"), ("b", "x,y"), ("c", "z")]));
        assert_eq!(rows[1], row(&[("a", "2"), ("b", "say \"hi\""), ("c", "w")]));
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let rows = parse_csv("a,b\n1,5\" tall").unwrap();
        assert_eq!(rows[0], row(&[("a", "1"), ("b", "5\" tall")]));
    }

    #[test]
    fn test_escaped_quotes() {
        let rows = parse_csv("quote\n\"He said \"\"hi\"\"\"").unwrap();
        assert_eq!(rows[0]["quote"], "He said \"hi\"");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("   \n\r\n  \r").unwrap().is_empty());
        assert!(parse_csv("a,b\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn test_mixed_line_endings_and_bom() {
        let rows = parse_csv("\u{feff}a,b\r\n1,2\r3,4\n5,6\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&[("a", "3"), ("b", "4")]));
        assert_eq!(rows[2], row(&[("a", "5"), ("b", "6")]));
    }

    #[test]
    fn test_short_long_rows_and_dropped_headers() {
        let rows = parse_csv("a,###,c\n1,skip\n1,2,3,4").unwrap();

        assert_eq!(rows[0], row(&[("a", "1"), ("c", "")]));
        assert_eq!(rows[1], row(&[("a", "1"), ("c", "3")]));
        assert!(!rows[1].contains_key(""));
    }

    #[test]
    fn test_values_are_trimmed() {
        let rows = parse_csv(" Name , City \n  Ana  ,\" Recife \"").unwrap();
        assert_eq!(rows[0], row(&[("name", "Ana"), ("city", "Recife")]));
    }

    #[test]
    fn test_unterminated_quote_is_lenient() {
        let rows = parse_csv("a,b\n1,\"open, never closed").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "open, never closed");
    }

    #[test]
    fn test_to_csv_header_union_in_first_seen_order() {
        let rows = vec![
            row(&[("id", "1"), ("name", "Ana")]),
            row(&[("name", "Bia"), ("city", "Natal")]),
        ];

        let csv = to_csv(&rows, Delimiter::Semicolon);

        assert_eq!(csv, "id;name;city\n1;Ana;\n;Bia;Natal");
    }

    #[test]
    fn test_to_csv_escaping() {
        let rows = vec![row(&[
            ("a", "x;y"),
            ("b", "say \"hi\""),
            ("c", "line1\nline2"),
            ("d", "x,y"),
        ])];

        let csv = to_csv(&rows, Delimiter::Semicolon);
        assert_eq!(
            csv,
            "a;b;c;d\n\"x;y\";\"say \"\"hi\"\"\";\"line1\nline2\";x,y"
        );

        let comma = to_csv(&rows, Delimiter::Comma);
        assert!(comma.ends_with(",\"x,y\""));
    }

    #[test]
    fn test_to_csv_empty() {
        assert_eq!(to_csv(&[], Delimiter::Semicolon), "");
    }

    #[test]
    fn test_round_trip_with_escaped_cells() {
        let rows = vec![
            row(&[("company_name", "Silva; Filhos"), ("notes", "He said \"hi\"")]),
            row(&[("company_name", "ACME"), ("notes", "")]),
        ];

        let parsed = parse_csv(&to_csv(&rows, Delimiter::Semicolon)).unwrap();

        assert_eq!(parsed, rows);
    }
}
