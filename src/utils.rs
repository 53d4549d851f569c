use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w가-힣]").expect("hardcoded regex should be valid"));

const UNICODE_MINUS: char = '\u{2212}';

/// Maps the Unicode minus sign and full-width digits to their ASCII forms.
fn to_ascii_numeral(c: char) -> char {
    match c {
        UNICODE_MINUS => '-',
        '\u{FF10}'..='\u{FF19}' => char::from(b'0' + (c as u32 - 0xFF10) as u8),
        _ => c,
    }
}

/// Canonical form of a free-text account label.
///
/// Whitespace and every character that is neither a word character nor a
/// Hangul syllable is removed, so `"Ⅱ. 유 동 부 채"` and `"Ⅱ유동부채"` compare
/// equal. The function is idempotent.
pub fn normalize_account_name(name: &str) -> String {
    NON_WORD.replace_all(name, "").into_owned()
}

/// Coerces a spreadsheet cell into a signed integer amount.
///
/// Blank and null cells are zero. Otherwise the text is trimmed, the Unicode
/// minus sign and full-width digits are mapped to ASCII, everything except
/// ASCII digits and `-` is stripped, and the remainder is parsed. Anything
/// that still fails to parse (stray dashes, overflow, no digits) is zero.
pub fn to_number(cell: Option<&str>) -> i64 {
    let Some(raw) = cell else {
        return 0;
    };

    let cleaned: String = raw
        .trim()
        .chars()
        .map(to_ascii_numeral)
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    cleaned.parse::<i64>().unwrap_or(0)
}

/// Reads an amount that the source layout may split across two adjacent
/// columns. The primary column wins whenever it coerces to a nonzero value.
pub fn pick_value(primary: Option<&str>, secondary: Option<&str>) -> i64 {
    match to_number(primary) {
        0 => to_number(secondary),
        value => value,
    }
}

/// Rounds to two decimal places, the precision ratios are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_whitespace_and_symbols() {
        assert_eq!(normalize_account_name("Ⅰ. 유 동 자 산"), "Ⅰ유동자산");
        assert_eq!(normalize_account_name("  (1) 매출액\t\n"), "1매출액");
        assert_eq!(normalize_account_name("부채 총계 *"), "부채총계");
        assert_eq!(normalize_account_name("Net_Income 2023"), "Net_Income2023");
        assert_eq!(normalize_account_name(""), "");
        assert_eq!(normalize_account_name(" \t- . "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Ⅱ. 유동부채",
            "  당기 총 제조비용 ",
            "(주)테스트・회사",
            "Cash & Equivalents",
            "\u{3000}감가상각비\u{3000}",
        ];

        for sample in samples {
            let once = normalize_account_name(sample);
            let twice = normalize_account_name(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
            assert!(!once.chars().any(char::is_whitespace));
        }
    }

    #[test]
    fn test_to_number_handles_noise() {
        assert_eq!(to_number(None), 0);
        assert_eq!(to_number(Some("")), 0);
        assert_eq!(to_number(Some("   ")), 0);
        assert_eq!(to_number(Some("1,234,567")), 1_234_567);
        assert_eq!(to_number(Some(" ₩ 1,000 ")), 1000);
        assert_eq!(to_number(Some("\u{2212}2,500")), -2500);
        assert_eq!(to_number(Some("-300")), -300);
        assert_eq!(to_number(Some("abc")), 0);
        assert_eq!(to_number(Some("-")), 0);
        assert_eq!(to_number(Some("1-2")), 0);
        assert_eq!(to_number(Some("99999999999999999999999")), 0);
    }

    #[test]
    fn test_to_number_full_width_digits() {
        assert_eq!(to_number(Some("１,０００")), 1000);
        assert_eq!(to_number(Some("\u{2212}２５０")), -250);
        assert_eq!(pick_value(Some("０"), Some("７")), 7);
    }

    #[test]
    fn test_pick_value_prefers_primary() {
        assert_eq!(pick_value(Some("1,000"), Some("999")), 1000);
        assert_eq!(pick_value(Some(""), Some("500")), 500);
        assert_eq!(pick_value(None, Some("500")), 500);
        assert_eq!(pick_value(Some("0"), Some("42")), 42);
        assert_eq!(pick_value(None, None), 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(200.0), 200.0);
    }
}
