use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{LineMatch, ParsedLine};

static TIMESTAMP_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z][a-z]{2} [0-9]{1,2}, [0-9]{2}:[0-9]{2} [A-Z]{3})\s+([A-Za-zæøåÆØÅ ]+?)\s*-\s*(.*)$")
        .expect("timestamp status regex")
});
static STATUS_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Completed|In progress|Update|Scheduled|Resolved|Investigating)[:\-]?\s*")
        .expect("status keyword regex")
});

/// One stage of the line classifier. Matchers run in order and the first
/// one returning `Some` wins.
pub trait LineMatcher: Send + Sync {
    fn try_match(&self, line: &str) -> Option<LineMatch>;
}

/// `Jan 16, 08:34 CET Resolved - message`
pub struct TimestampStatusMatcher;

impl LineMatcher for TimestampStatusMatcher {
    fn try_match(&self, line: &str) -> Option<LineMatch> {
        let caps = TIMESTAMP_STATUS.captures(line)?;
        Some(LineMatch::Matched {
            title: format!("{} {}", &caps[1], &caps[2]),
            message: caps[3].to_string(),
        })
    }
}

/// `Update: message`, `Resolved - message`, `Investigating message`
pub struct StatusKeywordMatcher;

impl LineMatcher for StatusKeywordMatcher {
    fn try_match(&self, line: &str) -> Option<LineMatch> {
        let caps = STATUS_KEYWORD.captures(line)?;
        let prefix = caps.get(0)?;
        Some(LineMatch::Matched {
            title: caps[1].to_string(),
            message: line[prefix.end()..].trim().to_string(),
        })
    }
}

static DEFAULT_MATCHERS: Lazy<Vec<Box<dyn LineMatcher>>> = Lazy::new(|| {
    vec![
        Box::new(TimestampStatusMatcher) as Box<dyn LineMatcher>,
        Box::new(StatusKeywordMatcher),
    ]
});

pub fn match_line(matchers: &[Box<dyn LineMatcher>], line: &str) -> LineMatch {
    matchers
        .iter()
        .find_map(|matcher| matcher.try_match(line))
        .unwrap_or_else(|| LineMatch::Unmatched {
            message: line.to_string(),
        })
}

pub fn classify_line(line: &str) -> ParsedLine {
    match_line(&DEFAULT_MATCHERS, line).into()
}

pub fn classify_lines(lines: &[String]) -> Vec<ParsedLine> {
    lines.iter().map(|line| classify_line(line)).collect()
}
