//! 將欄位設定（索引、字母或標題名稱）轉換成輸出欄位索引清單。
//!
//! 純函式，不做任何 I/O；相同輸入永遠得到相同結果。

use crate::domain::model::ColumnSpec;
use crate::utils::validation::Outcome;

pub const NO_COLUMNS_PROVIDED: &str = "no input indexes provided";
pub const HEADERS_REQUIRED: &str = "in_headers must be provided with out_headers";

/// 試算表欄位字母轉成從 0 開始的索引（雙射 26 進位："A" -> 0、"AA" -> 26）。
///
/// 非英文字母的字元會被略過；沒有任何字母或數值溢位時回傳 `None`。
pub fn column_letter_to_index(code: &str) -> Option<usize> {
    let mut number: usize = 0;
    let mut letters = 0;

    for ch in code.chars().filter(char::is_ascii_alphabetic) {
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        number = number.checked_mul(26)?.checked_add(digit)?;
        letters += 1;
    }

    if letters == 0 {
        None
    } else {
        Some(number - 1)
    }
}

/// `column_letter_to_index` 的反函式，用於錯誤訊息
pub fn index_to_column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// 解析欄位設定。失敗時仍回傳已成功解析的部分索引。
pub fn resolve(spec: Option<&ColumnSpec>, header_row: Option<&[String]>) -> Outcome<Vec<usize>> {
    match spec {
        Some(ColumnSpec::Indexes(indexes)) if !indexes.is_empty() => Outcome::ok(indexes.clone()),
        Some(ColumnSpec::Letters(letters)) if !letters.is_empty() => resolve_letters(letters),
        Some(ColumnSpec::Headers(names)) if !names.is_empty() => match header_row {
            Some(headers) => resolve_headers(names, headers),
            None => Outcome::failed(Vec::new(), HEADERS_REQUIRED),
        },
        _ => Outcome::failed(Vec::new(), NO_COLUMNS_PROVIDED),
    }
}

fn resolve_letters(letters: &[String]) -> Outcome<Vec<usize>> {
    let mut indexes = Vec::with_capacity(letters.len());
    let mut invalid = Vec::new();

    for code in letters {
        match column_letter_to_index(code) {
            Some(index) => indexes.push(index),
            None => invalid.push(code),
        }
    }

    if invalid.is_empty() {
        Outcome::ok(indexes)
    } else {
        Outcome::failed(
            indexes,
            format!("column letters {:?} do not name a spreadsheet column", invalid),
        )
    }
}

fn resolve_headers(names: &[String], headers: &[String]) -> Outcome<Vec<usize>> {
    let mut indexes = Vec::with_capacity(names.len());
    let mut unmatched = Vec::new();

    for name in names {
        // 重複的標題以第一個出現的為準
        match headers.iter().position(|header| header == name) {
            Some(index) => indexes.push(index),
            None => unmatched.push(name),
        }
    }

    if unmatched.is_empty() {
        Outcome::ok(indexes)
    } else {
        Outcome::failed(
            indexes,
            format!(
                "some headers {:?} matched nothing in original headers {:?}",
                unmatched, headers
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_letter_codes() {
        assert_eq!(column_letter_to_index("A"), Some(0));
        assert_eq!(column_letter_to_index("B"), Some(1));
        assert_eq!(column_letter_to_index("Z"), Some(25));
        assert_eq!(column_letter_to_index("AA"), Some(26));
        assert_eq!(column_letter_to_index("AB"), Some(27));
        assert_eq!(column_letter_to_index("AZ"), Some(51));
        assert_eq!(column_letter_to_index("BA"), Some(52));
        assert_eq!(column_letter_to_index("XFD"), Some(16383));
    }

    #[test]
    fn test_letter_codes_ignore_case_and_non_letters() {
        assert_eq!(column_letter_to_index("ab"), Some(27));
        assert_eq!(column_letter_to_index(" A-B "), Some(27));
        assert_eq!(column_letter_to_index("C3"), Some(2));
        assert_eq!(column_letter_to_index("123"), None);
        assert_eq!(column_letter_to_index(""), None);
    }

    #[test]
    fn test_letter_code_overflow() {
        let code = "Z".repeat(40);
        assert_eq!(column_letter_to_index(&code), None);
    }

    #[test]
    fn test_index_to_column_letter_inverts() {
        for (index, letters) in [(0, "A"), (25, "Z"), (26, "AA"), (27, "AB"), (701, "ZZ"), (702, "AAA")] {
            assert_eq!(index_to_column_letter(index), letters);
            assert_eq!(column_letter_to_index(letters), Some(index));
        }
    }

    #[test]
    fn test_indexes_returned_verbatim() {
        let spec = ColumnSpec::Indexes(vec![3, 0, 3, 7]);
        let outcome = resolve(Some(&spec), None);

        assert!(outcome.is_ok());
        assert_eq!(outcome.value, vec![3, 0, 3, 7]);
    }

    #[test]
    fn test_letters_resolved_in_order() {
        let spec = ColumnSpec::Letters(strings(&["C", "A", "AB"]));
        let outcome = resolve(Some(&spec), None);

        assert!(outcome.is_ok());
        assert_eq!(outcome.value, vec![2, 0, 27]);
    }

    #[test]
    fn test_letters_without_letters_fail_with_partial_result() {
        let spec = ColumnSpec::Letters(strings(&["B", "42"]));
        let outcome = resolve(Some(&spec), None);

        assert!(!outcome.is_ok());
        assert_eq!(outcome.value, vec![1]);
        assert!(outcome.error().unwrap().contains("42"));
    }

    #[test]
    fn test_headers_first_match_wins() {
        let header = strings(&["id", "name", "id"]);
        let spec = ColumnSpec::Headers(strings(&["id"]));
        let outcome = resolve(Some(&spec), Some(&header));

        assert!(outcome.is_ok());
        assert_eq!(outcome.value, vec![0]);
    }

    #[test]
    fn test_headers_case_sensitive_and_duplicates_allowed() {
        let header = strings(&["id", "name", "email"]);
        let spec = ColumnSpec::Headers(strings(&["email", "id", "email"]));
        let outcome = resolve(Some(&spec), Some(&header));
        assert_eq!(outcome.value, vec![2, 0, 2]);

        let spec = ColumnSpec::Headers(strings(&["Name"]));
        assert!(!resolve(Some(&spec), Some(&header)).is_ok());
    }

    #[test]
    fn test_headers_unmatched_reports_every_name() {
        let header = strings(&["id", "name"]);
        let spec = ColumnSpec::Headers(strings(&["missing", "name", "absent"]));
        let outcome = resolve(Some(&spec), Some(&header));

        assert!(!outcome.is_ok());
        assert_eq!(outcome.value, vec![1]);

        let error = outcome.error().unwrap();
        assert!(error.contains("missing"));
        assert!(error.contains("absent"));
        assert!(error.contains(r#"["id", "name"]"#));
    }

    #[test]
    fn test_headers_missing_returns_empty() {
        let header = strings(&["id", "name"]);
        let spec = ColumnSpec::Headers(strings(&["missing"]));
        let outcome = resolve(Some(&spec), Some(&header));

        assert!(!outcome.is_ok());
        assert!(outcome.value.is_empty());
        assert!(outcome.error().unwrap().contains("missing"));
    }

    #[test]
    fn test_headers_require_header_row() {
        let spec = ColumnSpec::Headers(strings(&["id"]));
        let outcome = resolve(Some(&spec), None);

        assert_eq!(outcome.error().as_deref(), Some(HEADERS_REQUIRED));
    }

    #[test]
    fn test_nothing_provided() {
        let outcome = resolve(None, None);
        assert_eq!(outcome.error().as_deref(), Some(NO_COLUMNS_PROVIDED));
        assert!(outcome.value.is_empty());

        let outcome = resolve(Some(&ColumnSpec::Letters(vec![])), None);
        assert_eq!(outcome.error().as_deref(), Some(NO_COLUMNS_PROVIDED));
    }

    #[test]
    fn test_indexes_take_precedence_over_letters() {
        let spec = ColumnSpec::from_lists(Some(vec![1]), Some(strings(&["C", "A"])), None);
        let outcome = resolve(spec.as_ref(), None);

        assert_eq!(outcome.value, vec![1]);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let header = strings(&["a", "b", "c"]);
        let spec = ColumnSpec::Headers(strings(&["c", "a"]));
        assert_eq!(
            resolve(Some(&spec), Some(&header)),
            resolve(Some(&spec), Some(&header))
        );
    }
}
