/// 巴西格式金額：`.` 為千分位、`,` 為小數點。空白或無法解析時回傳 None。
pub fn parse_money_to_number(input: &str) -> Option<f64> {
    if input.trim().is_empty() {
        return None;
    }

    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = cleaned.replace('.', "").replacen(',', ".", 1);

    if normalized.is_empty() {
        return None;
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// 整數欄位：非有限數值回傳 None，小數部分向零截斷
pub fn parse_int_or_null(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(value.trunc() as i64)
}

/// 匯出金額時以 `,` 作為小數點，與 [`parse_money_to_number`] 對稱
pub fn format_money(value: f64) -> String {
    value.to_string().replace('.', ",")
}
