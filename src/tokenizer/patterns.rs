//! Structured-token extractors for the email, url and phone modes.
//!
//! Extractors return raw tokens; stopword filtering happens in the analyzer.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex");
    static ref URL: Regex = Regex::new(r#"https?://[^\s<>"']+"#).expect("valid regex");
    static ref PHONE: Regex = Regex::new(
        r"(?:\+?(\d{1,3})[\s.-]?)?\(?(\d{3})\)?[\s.-]?(\d{3})[\s.-]?(\d{4})"
    )
    .expect("valid regex");
    static ref SHORT_NUMBER: Regex = Regex::new(r"^\d{3,4}$").expect("valid regex");
}

/// Full address, local part, domain, then every domain label longer than one char
pub(crate) fn email_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in EMAIL.find_iter(text) {
        let address = m.as_str().to_lowercase();
        let Some((local, domain)) = address.rsplit_once('@') else {
            continue;
        };
        let local = local.to_string();
        let domain = domain.to_string();
        let labels: Vec<String> = domain
            .split('.')
            .filter(|label| label.chars().count() > 1)
            .map(str::to_string)
            .collect();
        tokens.push(address.clone());
        tokens.push(local);
        tokens.push(domain);
        tokens.extend(labels);
    }
    tokens
}

/// Full URL, host, host labels, then path segments longer than one char
pub(crate) fn url_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in URL.find_iter(text) {
        let raw = m
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}'));
        let full = raw.to_lowercase();
        tokens.push(full.clone());

        let Ok(parsed) = url::Url::parse(&full) else {
            continue;
        };
        if let Some(host) = parsed.host_str() {
            tokens.push(host.to_string());
            tokens.extend(
                host.split('.')
                    .filter(|label| !label.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(segments) = parsed.path_segments() {
            tokens.extend(
                segments
                    .filter(|segment| segment.chars().count() > 1)
                    .map(str::to_string),
            );
        }
    }
    tokens
}

/// Full match, digits only, area code, exchange and last four, de-duplicated
pub(crate) fn phone_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for caps in PHONE.captures_iter(text) {
        let Some(full) = caps.get(0) else {
            continue;
        };
        let full = full.as_str().trim();
        tokens.push(full.to_string());
        tokens.push(full.chars().filter(char::is_ascii_digit).collect());
        for group in 2..=4 {
            if let Some(part) = caps.get(group) {
                tokens.push(part.as_str().to_string());
            }
        }
    }

    if tokens.is_empty() {
        let trimmed = text.trim();
        if SHORT_NUMBER.is_match(trimmed) {
            tokens.push(trimmed.to_string());
        }
    }

    dedup_preserving_order(tokens)
}

pub(crate) fn dedup_preserving_order(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tokens.len());
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
