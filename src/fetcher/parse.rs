use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};

use super::FeedError;
use crate::model::FeedEntry;

/// Read every `<item>` of an RSS document. Missing children become empty
/// strings, and unreadable dates become `None` rather than an error.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let doc = Document::parse(xml)?;
    let entries = doc
        .descendants()
        .filter(|node| node.has_tag_name("item"))
        .map(entry_from_item)
        .collect();
    Ok(entries)
}

fn entry_from_item(item: Node<'_, '_>) -> FeedEntry {
    let published_raw = child_text(item, "pubDate").unwrap_or_default();
    let published_at = parse_timestamp(&published_raw);
    let maintenance_end_at = child_text(item, "maintenanceEndDate")
        .as_deref()
        .and_then(parse_timestamp);

    FeedEntry {
        title: child_text(item, "title").unwrap_or_default(),
        published_raw,
        published_at,
        maintenance_end_at,
        description: child_text(item, "description").unwrap_or_default(),
    }
}

/// Concatenated text of the first child element with `name`, CDATA included.
fn child_text(parent: Node<'_, '_>, name: &str) -> Option<String> {
    let child = parent
        .children()
        .find(|node| node.is_element() && node.has_tag_name(name))?;
    let text = child
        .descendants()
        .filter(|node| node.is_text())
        .filter_map(|node| node.text())
        .collect::<String>();
    Some(text)
}

/// RFC 2822 as RSS prescribes, with RFC 3339 as a fallback. A weekday that
/// disagrees with the date is ignored rather than rejecting the timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|err| match without_weekday(raw) {
            Some(rest) => DateTime::parse_from_rfc2822(rest),
            None => Err(err),
        })
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn without_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    if day.trim().chars().all(|ch| ch.is_ascii_alphabetic()) {
        Some(rest.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Entur Status - Incident History</title>
    <item>
      <title>Redusert sanntid</title>
      <description>&lt;p&gt;&lt;small&gt;Jan &lt;var data-var='date'&gt;16&lt;/var&gt;&lt;/small&gt;&lt;br&gt;&lt;strong&gt;Resolved&lt;/strong&gt; - Fixed.&lt;/p&gt;</description>
      <pubDate>Thu, 16 Jan 2025 08:34:00 +0100</pubDate>
      <link>https://status.entur.org/incidents/abc</link>
    </item>
    <item>
      <title>Planlagt vedlikehold</title>
      <description><![CDATA[<b>Scheduled</b> - Database upgrade]]></description>
      <pubDate>Mon, 20 Jan 2025 22:00:00 +0000</pubDate>
      <maintenanceEndDate>Tue, 21 Jan 2025 02:00:00 +0000</maintenanceEndDate>
    </item>
    <item>
      <pubDate>sometime soon</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn reads_items_in_document_order() {
        let entries = parse_feed(SAMPLE).expect("sample must parse");
        assert_eq!(entries.len(), 3);

        let first = &entries[0];
        assert_eq!(first.title, "Redusert sanntid");
        assert_eq!(first.published_raw, "Thu, 16 Jan 2025 08:34:00 +0100");
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 16, 7, 34, 0).unwrap())
        );
        assert_eq!(first.maintenance_end_at, None);
        assert!(first.description.starts_with("<p><small>Jan "));
    }

    #[test]
    fn reads_cdata_and_maintenance_end() {
        let entries = parse_feed(SAMPLE).expect("sample must parse");
        let second = &entries[1];
        assert_eq!(second.description, "<b>Scheduled</b> - Database upgrade");
        assert_eq!(
            second.maintenance_end_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 21, 2, 0, 0).unwrap())
        );
    }

    #[test]
    fn malformed_and_missing_fields_are_absent() {
        let entries = parse_feed(SAMPLE).expect("sample must parse");
        let third = &entries[2];
        assert_eq!(third.title, "");
        assert_eq!(third.description, "");
        assert_eq!(third.published_raw, "sometime soon");
        assert_eq!(third.published_at, None);
    }

    #[test]
    fn wrong_weekday_still_parses() {
        // 16 Jan 2099 is a Friday
        assert_eq!(
            parse_timestamp("Thu, 16 Jan 2099 08:00:00 +0000"),
            Some(Utc.with_ymd_and_hms(2099, 1, 16, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("16 Jan 2099 08:00:00 GMT"),
            Some(Utc.with_ymd_and_hms(2099, 1, 16, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("Thu, sometime soon"), None);
    }

    #[test]
    fn accepts_rfc3339_dates() {
        assert_eq!(
            parse_timestamp(" 2025-01-16T08:34:00Z "),
            Some(Utc.with_ymd_and_hms(2025, 1, 16, 8, 34, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn broken_xml_is_an_error() {
        assert!(matches!(
            parse_feed("<rss><channel><item></channel>"),
            Err(FeedError::Xml(_))
        ));
    }
}
