//! Normalization of titles, author names, and identifiers.
//!
//! Every function here is pure, total over arbitrary input, and idempotent:
//! `normalize(normalize(x)) == normalize(x)`. Identifier normalizers return
//! `None` on anything that fails validation rather than a best-effort value.

/// Leading articles stripped from titles before comparison.
const TITLE_ARTICLES: &[&str] = &["the ", "a ", "an "];

/// Normalize a title for matching: lowercase, strip punctuation, collapse
/// whitespace, drop leading articles. Blank input yields the empty string.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let mut normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    // Strip to a fixed point so stacked articles cannot survive one pass.
    loop {
        let before = normalized.len();
        for article in TITLE_ARTICLES {
            if let Some(rest) = normalized.strip_prefix(article) {
                normalized = rest.trim_start().to_string();
            }
        }
        if normalized.len() == before {
            break;
        }
    }

    normalized
}

/// Normalize an author name to "Family, Given" form.
///
/// Input already in comma form is re-cased and re-spaced. "Given Family"
/// is reordered with the final token taken as the family name. A single
/// token is title-cased as-is.
pub fn normalize_person_name(author: &str) -> String {
    let collapsed = author.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return String::new();
    }

    if let Some((family, given)) = collapsed.split_once(',') {
        let family = title_case(family.trim());
        let given = title_case(given.trim());
        if given.is_empty() {
            return family;
        }
        return format!("{family}, {given}");
    }

    let parts: Vec<&str> = collapsed.split(' ').collect();
    if parts.len() >= 2 {
        let family = title_case(parts[parts.len() - 1]);
        let given = title_case(&parts[..parts.len() - 1].join(" "));
        return format!("{family}, {given}");
    }

    title_case(&collapsed)
}

/// Normalize an ISBN-13: strip hyphens and whitespace, then require exactly
/// 13 digits with a valid check digit. Anything else (including ISBN-10) is
/// `None`; use [`isbn10_to_isbn13`] to convert an ISBN-10 first.
pub fn normalize_isbn13(isbn: &str) -> Option<String> {
    let cleaned: String = isbn
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if cleaned.len() != 13 || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !isbn13_check_digit_valid(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Convert an ISBN-10 to its ISBN-13 form: prefix "978" and recompute the
/// check digit. Requires 10 characters after cleaning, the first nine being
/// digits; the trailing ISBN-10 check digit (possibly "X") is discarded
/// without verification, so the output checksum is always valid.
pub fn isbn10_to_isbn13(isbn: &str) -> Option<String> {
    let cleaned: String = isbn
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    if cleaned.len() != 10 || !cleaned.bytes().take(9).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let last = cleaned.as_bytes()[9];
    if !last.is_ascii_digit() && last != b'X' {
        return None;
    }

    let mut digits = format!("978{}", &cleaned[..9]);
    let check = (10 - isbn13_weighted_sum(&digits) % 10) % 10;
    digits.push(char::from(b'0' + check as u8));
    Some(digits)
}

/// Normalize an ASIN: trim, uppercase, require exactly 10 ASCII
/// alphanumerics.
pub fn normalize_asin(asin: &str) -> Option<String> {
    let cleaned = asin.trim().to_uppercase();
    if cleaned.len() == 10 && cleaned.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Some(cleaned)
    } else {
        None
    }
}

/// ISBN-13 weighted checksum: alternating 1/3 weights, sum divisible by 10.
fn isbn13_check_digit_valid(digits: &str) -> bool {
    isbn13_weighted_sum(digits) % 10 == 0
}

fn isbn13_weighted_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 0 { d } else { d * 3 }
        })
        .sum()
}

/// Title-case each alphabetic run: first letter upper, rest lower.
/// Punctuation (dots in initials, hyphens, apostrophes) starts a new run,
/// so "j.k. rowling" becomes "J.K. Rowling".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_basic() {
        assert_eq!(normalize_title("The Great Gatsby"), "great gatsby");
        assert_eq!(normalize_title("A Tale of Two Cities"), "tale of two cities");
        assert_eq!(normalize_title("An Unkindness of Ghosts"), "unkindness of ghosts");
        assert_eq!(normalize_title("Dune"), "dune");
    }

    #[test]
    fn test_normalize_title_punctuation_and_whitespace() {
        assert_eq!(normalize_title("  The  GREAT   Gatsby!!  "), "great gatsby");
        assert_eq!(normalize_title("Harry Potter & the Goblet"), "harry potter the goblet");
        assert_eq!(normalize_title("Don't Panic"), "dont panic");
    }

    #[test]
    fn test_normalize_title_blank() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("   "), "");
        assert_eq!(normalize_title("!!!"), "");
    }

    #[test]
    fn test_normalize_title_idempotent() {
        for raw in ["The Great Gatsby", "A A Strange Case", "the the end", "1984"] {
            let once = normalize_title(raw);
            assert_eq!(normalize_title(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_person_name_reorders() {
        assert_eq!(normalize_person_name("John Smith"), "Smith, John");
        assert_eq!(normalize_person_name("jim butcher"), "Butcher, Jim");
        assert_eq!(normalize_person_name("Ursula K. Le Guin"), "Guin, Ursula K. Le");
    }

    #[test]
    fn test_normalize_person_name_comma_form() {
        assert_eq!(normalize_person_name("Smith, John"), "Smith, John");
        assert_eq!(normalize_person_name("smith,john"), "Smith, John");
        assert_eq!(normalize_person_name("Smith,  "), "Smith");
    }

    #[test]
    fn test_normalize_person_name_initials() {
        assert_eq!(normalize_person_name("J.K. Rowling"), "Rowling, J.K.");
        assert_eq!(normalize_person_name("Rowling, J.K."), "Rowling, J.K.");
    }

    #[test]
    fn test_normalize_person_name_single_name() {
        assert_eq!(normalize_person_name("Cher"), "Cher");
        assert_eq!(normalize_person_name(""), "");
    }

    #[test]
    fn test_normalize_person_name_idempotent() {
        for raw in ["John Smith", "J.K. Rowling", "Cher", "Le Guin, Ursula K."] {
            let once = normalize_person_name(raw);
            assert_eq!(normalize_person_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_normalize_isbn13_valid() {
        assert_eq!(
            normalize_isbn13("978-0-7432-7356-5").as_deref(),
            Some("9780743273565")
        );
        assert_eq!(
            normalize_isbn13(" 978 0441013593 ").as_deref(),
            Some("9780441013593")
        );
    }

    #[test]
    fn test_normalize_isbn13_rejects_invalid() {
        // ISBN-10 is not converted here
        assert_eq!(normalize_isbn13("0743273567"), None);
        assert_eq!(normalize_isbn13("12345"), None);
        assert_eq!(normalize_isbn13(""), None);
        assert_eq!(normalize_isbn13("97807432735ab"), None);
        // right length, wrong check digit
        assert_eq!(normalize_isbn13("9780743273566"), None);
    }

    #[test]
    fn test_isbn10_to_isbn13() {
        assert_eq!(
            isbn10_to_isbn13("0441013597").as_deref(),
            Some("9780441013593")
        );
        assert_eq!(
            isbn10_to_isbn13("0-7432-7356-7").as_deref(),
            Some("9780743273565")
        );
        // trailing X check digit is accepted and discarded
        assert_eq!(
            isbn10_to_isbn13("043942089X").as_deref(),
            Some("9780439420891")
        );
    }

    #[test]
    fn test_isbn10_to_isbn13_rejects_invalid() {
        assert_eq!(isbn10_to_isbn13("12345"), None);
        assert_eq!(isbn10_to_isbn13("9780441013593"), None);
        assert_eq!(isbn10_to_isbn13("abcdefghij"), None);
        assert_eq!(isbn10_to_isbn13(""), None);
    }

    #[test]
    fn test_normalize_asin() {
        assert_eq!(normalize_asin("b001234567").as_deref(), Some("B001234567"));
        assert_eq!(normalize_asin(" B08XYZ1234 ").as_deref(), Some("B08XYZ1234"));
        assert_eq!(normalize_asin("123"), None);
        assert_eq!(normalize_asin(""), None);
        assert_eq!(normalize_asin("B00123456!"), None);
    }

    #[test]
    fn test_identifier_normalizers_idempotent() {
        let isbn = normalize_isbn13("978-0-7432-7356-5").unwrap();
        assert_eq!(normalize_isbn13(&isbn).as_deref(), Some(isbn.as_str()));

        let asin = normalize_asin("b001234567").unwrap();
        assert_eq!(normalize_asin(&asin).as_deref(), Some(asin.as_str()));
    }

    #[test]
    fn test_title_case_runs() {
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("McDONALD"), "Mcdonald");
        assert_eq!(title_case("j.k."), "J.K.");
    }
}
