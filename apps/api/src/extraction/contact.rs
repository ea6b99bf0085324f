//! Candidate name and contact-field heuristics over extracted CV text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::cv::ContactInfo;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    // North-American number with optional +1/1 prefix and common separators
    static ref PHONE_RE: Regex =
        Regex::new(r"(?:\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})\b")
            .unwrap();
}

/// Guesses the candidate name: the first of the first 10 non-empty lines
/// that is 3–99 characters long and contains no digit. Advisory only — CVs
/// that open with a headline instead of a name will fool this.
pub fn extract_candidate_name(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(10)
        .find(|line| {
            let len = line.chars().count();
            (3..=99).contains(&len) && !line.chars().any(|c| c.is_ascii_digit())
        })
        .map(str::to_string)
}

/// Pulls the first email address and first phone-shaped token out of the
/// text. The phone number is normalized to a `+1-XXX-XXX-XXXX` display form.
/// Returns `None` when neither field is present.
pub fn extract_contact_info(content: &str) -> Option<ContactInfo> {
    let email = EMAIL_RE.find(content).map(|m| m.as_str().to_string());

    let phone = PHONE_RE.captures(content).map(|caps| {
        format!(
            "+1-{}-{}-{}",
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
            caps.get(3).map_or("", |m| m.as_str()),
        )
    });

    let info = ContactInfo { email, phone };
    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_first_line() {
        let content = "Jane Doe\nSenior Backend Engineer\njane@example.com";
        assert_eq!(extract_candidate_name(content), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_name_skips_blank_and_digit_lines() {
        let content = "\n\n  \n123 Main St\nJohn Smith\n";
        assert_eq!(
            extract_candidate_name(content),
            Some("John Smith".to_string())
        );
    }

    #[test]
    fn test_name_skips_too_short_lines() {
        let content = "JD\nAlice Wong";
        assert_eq!(
            extract_candidate_name(content),
            Some("Alice Wong".to_string())
        );
    }

    #[test]
    fn test_name_rejects_overlong_line() {
        let long = "x".repeat(100);
        assert_eq!(extract_candidate_name(&long), None);
    }

    #[test]
    fn test_name_only_scans_first_ten_nonempty_lines() {
        let mut content = String::new();
        for i in 0..10 {
            content.push_str(&format!("line number {i}\n"));
        }
        content.push_str("Actual Name\n");
        // the ten digit-bearing lines exhaust the scan window
        assert_eq!(extract_candidate_name(&content), None);
    }

    #[test]
    fn test_name_none_when_all_lines_have_digits() {
        assert_eq!(extract_candidate_name("call 555\nroom 12"), None);
    }

    #[test]
    fn test_email_extracted() {
        let info = extract_contact_info("reach me at jane.doe+cv@example.co.uk thanks").unwrap();
        assert_eq!(info.email.as_deref(), Some("jane.doe+cv@example.co.uk"));
        assert!(info.phone.is_none());
    }

    #[test]
    fn test_phone_normalized_plain() {
        let info = extract_contact_info("phone: 5551234567").unwrap();
        assert_eq!(info.phone.as_deref(), Some("+1-555-123-4567"));
    }

    #[test]
    fn test_phone_normalized_with_separators() {
        let info = extract_contact_info("call (555) 123-4567 today").unwrap();
        assert_eq!(info.phone.as_deref(), Some("+1-555-123-4567"));
    }

    #[test]
    fn test_phone_normalized_with_country_code() {
        let info = extract_contact_info("+1 555.123.4567").unwrap();
        assert_eq!(info.phone.as_deref(), Some("+1-555-123-4567"));
    }

    #[test]
    fn test_first_email_wins() {
        let info = extract_contact_info("a@x.com then b@y.com").unwrap();
        assert_eq!(info.email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_no_contact_fields_yields_none() {
        assert_eq!(extract_contact_info("nothing to see here"), None);
    }

    #[test]
    fn test_both_fields_extracted() {
        let info = extract_contact_info("jane@example.com / 555-123-4567").unwrap();
        assert_eq!(info.email.as_deref(), Some("jane@example.com"));
        assert_eq!(info.phone.as_deref(), Some("+1-555-123-4567"));
    }
}
