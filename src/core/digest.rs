use crate::domain::model::Digest;
use crate::utils::error::Result;
use askama::Template;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub const DEFAULT_SUBJECT: &str = "LMU Thesis Topics Update";
pub const HEADER_NEW: &str = "🚨 New thesis topics detected!";
pub const HEADER_NONE: &str = "✅ No new thesis topics today";

struct DigestLine<'a> {
    text: &'a str,
    is_new: bool,
}

/// Renders `templates/digest.html`; titles are escaped by askama.
#[derive(Template)]
#[template(path = "digest.html")]
struct HtmlDigest<'a> {
    header: &'a str,
    titles: &'a [DigestLine<'a>],
    checked: &'a str,
}

/// Renders `templates/digest.txt` for the plain-text alternative.
#[derive(Template)]
#[template(path = "digest.txt")]
struct TextDigest<'a> {
    header: &'a str,
    titles: &'a [DigestLine<'a>],
    checked: &'a str,
}

/// Builds the notification listing every current title and highlighting the
/// ones in `new_titles`.
pub fn compose_digest(
    all_titles: &[String],
    new_titles: &[String],
    subject: &str,
    checked_at: DateTime<Utc>,
) -> Result<Digest> {
    let header = if new_titles.is_empty() {
        HEADER_NONE
    } else {
        HEADER_NEW
    };
    let flagged: HashSet<&str> = new_titles.iter().map(String::as_str).collect();
    let checked = checked_at.format("%Y-%m-%d %H:%M UTC").to_string();

    let lines: Vec<DigestLine<'_>> = all_titles
        .iter()
        .map(|title| DigestLine {
            text: title,
            is_new: flagged.contains(title.as_str()),
        })
        .collect();

    let html_body = HtmlDigest {
        header,
        titles: &lines,
        checked: &checked,
    }
    .render()?;
    let text_body = TextDigest {
        header,
        titles: &lines,
        checked: &checked,
    }
    .render()?;

    Ok(Digest {
        subject: subject.to_string(),
        header: header.to_string(),
        html_body,
        text_body,
        total_titles: all_titles.len(),
        new_titles: new_titles.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scraper::{Html, Selector};

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 7, 30, 0).unwrap()
    }

    fn list_items(html: &str) -> Vec<String> {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse("li").unwrap();
        doc.select(&selector)
            .map(|li| li.text().collect::<String>())
            .collect()
    }

    #[test]
    fn test_header_when_new_titles_found() {
        let all = titles(&["A", "B", "C"]);
        let digest = compose_digest(&all, &titles(&["C"]), DEFAULT_SUBJECT, fixed_time()).unwrap();

        assert_eq!(digest.header, HEADER_NEW);
        assert!(digest.html_body.starts_with(&format!("<h2>{}</h2><ul>", HEADER_NEW)));
        assert_eq!(digest.total_titles, 3);
        assert_eq!(digest.new_titles, 1);
    }

    #[test]
    fn test_header_when_nothing_new() {
        let all = titles(&["A", "B"]);
        let digest = compose_digest(&all, &[], DEFAULT_SUBJECT, fixed_time()).unwrap();

        assert_eq!(digest.header, HEADER_NONE);
        assert_eq!(digest.new_titles, 0);
        assert_eq!(digest.subject, "LMU Thesis Topics Update");
    }

    #[test]
    fn test_lists_all_titles_and_highlights_new_ones() {
        let all = titles(&["A", "B", "C"]);
        let digest = compose_digest(&all, &titles(&["C"]), DEFAULT_SUBJECT, fixed_time()).unwrap();

        assert!(digest.html_body.contains("<li>A</li><li>B</li>"));
        assert!(digest
            .html_body
            .contains("<li style='background-color: #ffff99; font-weight:bold;'>C</li></ul>"));
        assert!(digest.text_body.contains("- A\n- B\n* NEW: C\n"));
    }

    #[test]
    fn test_escapes_markup_in_titles() {
        let all = titles(&["Fitts' Law & <VR>"]);
        let digest = compose_digest(&all, &[], DEFAULT_SUBJECT, fixed_time()).unwrap();

        assert!(!digest.html_body.contains("<VR>"));
        assert!(!digest.html_body.contains("Law & "));
        assert_eq!(list_items(&digest.html_body), all);
        assert!(digest.text_body.contains("- Fitts' Law & <VR>"));
    }

    #[test]
    fn test_includes_check_time() {
        let digest = compose_digest(&titles(&["A"]), &[], "Custom", fixed_time()).unwrap();

        assert!(digest.html_body.contains("Checked 2025-03-14 07:30 UTC"));
        assert!(digest
            .text_body
            .trim_end()
            .ends_with("Checked 2025-03-14 07:30 UTC"));
        assert_eq!(digest.subject, "Custom");
    }
}
