use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::MemberRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("No data found on the page.")]
    NoContainer,
    #[error("No list items found in the data div.")]
    NoListItems,
}

static SEL_DATA_DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.DATA").expect("invalid selector: data div"));
static SEL_LI: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("invalid selector: li"));
static SEL_A: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: a"));
static SEL_H1: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("invalid selector: h1"));
static SEL_DL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("dl").expect("invalid selector: dl"));
static SEL_DT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("dt").expect("invalid selector: dt"));
static SEL_DD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("dd").expect("invalid selector: dd"));

const FULLWIDTH_COLON: char = '：';

/// Text of every descendant text node, each trimmed, joined without separators.
fn stripped_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>()
}

fn clean_key(raw: &str) -> String {
    raw.replace(FULLWIDTH_COLON, "").trim().to_string()
}

/// Relative member references from the listing page, in document order.
pub fn parse_member_refs(html: &str) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&SEL_DATA_DIV)
        .next()
        .ok_or(ParseError::NoContainer)?;

    let items: Vec<ElementRef> = container.select(&SEL_LI).collect();
    if items.is_empty() {
        return Err(ParseError::NoListItems);
    }

    let mut refs = Vec::with_capacity(items.len());
    for item in items {
        match item
            .select(&SEL_A)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) if !href.is_empty() => refs.push(href.to_string()),
            _ => log::warn!(
                "Skipping list item without a link: {:?}",
                stripped_text(item)
            ),
        }
    }

    Ok(refs)
}

pub fn parse_member_detail(html: &str) -> MemberRecord {
    let document = Html::parse_document(html);

    let title = document.select(&SEL_H1).next().map(stripped_text);
    let mut record = MemberRecord::new(title);

    if let Some(dl) = document.select(&SEL_DL).next() {
        let terms = dl.select(&SEL_DT);
        let descriptions = dl.select(&SEL_DD);

        for (dt, dd) in terms.zip(descriptions) {
            record.insert(clean_key(&stripped_text(dt)), stripped_text(dd));
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_member_refs_from_fixture() {
        let html = fs::read_to_string("fixtures/listing.html").expect("Failed to read fixture");

        let refs = parse_member_refs(&html).expect("Failed to parse listing");

        assert_eq!(refs, vec!["1021", "1034", "1102", "1150"]);
    }

    #[test]
    fn test_parse_member_refs_keeps_document_order() {
        let html = r#"
            <div class="DATA">
                <ul>
                    <li><a href="c">Gamma</a></li>
                    <li><a href="a">Alpha</a></li>
                    <li><a href="b">Beta</a></li>
                </ul>
            </div>
        "#;

        let refs = parse_member_refs(html).expect("Failed to parse");

        assert_eq!(refs, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_parse_member_refs_ignores_links_outside_container() {
        let html = r#"
            <ul class="nav"><li><a href="home">Home</a></li></ul>
            <div class="DATA"><ul><li><a href="42">Member</a></li></ul></div>
        "#;

        let refs = parse_member_refs(html).expect("Failed to parse");

        assert_eq!(refs, vec!["42"]);
    }

    #[test]
    fn test_parse_member_refs_missing_container() {
        let html = "<html><body><p>Maintenance</p></body></html>";

        assert_eq!(parse_member_refs(html), Err(ParseError::NoContainer));
    }

    #[test]
    fn test_parse_member_refs_empty_container() {
        let html = r#"<div class="DATA"><p>Nothing here</p></div>"#;

        assert_eq!(parse_member_refs(html), Err(ParseError::NoListItems));
    }

    #[test]
    fn test_parse_member_refs_skips_items_without_href() {
        let html = r#"
            <div class="DATA"><ul>
                <li><a href="1">One</a></li>
                <li>Plain text</li>
                <li><a href="">Empty</a></li>
                <li><a href="4">Four</a></li>
            </ul></div>
        "#;

        let refs = parse_member_refs(html).expect("Failed to parse");

        assert_eq!(refs, vec!["1", "4"]);
    }

    #[test]
    fn test_parse_member_detail_strips_fullwidth_colon() {
        let html = r#"
            <h1> Acme Corp </h1>
            <dl>
                <dt>Phone：</dt><dd>555-1234</dd>
                <dt>Fax</dt><dd> 555-5678 </dd>
            </dl>
        "#;

        let record = parse_member_detail(html);

        let expected: MemberRecord = [
            ("Title", "Acme Corp"),
            ("Phone", "555-1234"),
            ("Fax", "555-5678"),
        ]
        .into_iter()
        .collect();
        assert_eq!(record, expected);
    }

    #[test]
    fn test_parse_member_detail_truncates_to_shorter_sequence() {
        let html = r#"
            <h1>Short</h1>
            <dl>
                <dt>A</dt><dd>1</dd>
                <dt>B</dt><dd>2</dd>
                <dt>C</dt>
            </dl>
        "#;

        let record = parse_member_detail(html);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("A"), Some("1"));
        assert_eq!(record.get("B"), Some("2"));
        assert_eq!(record.get("C"), None);
    }

    #[test]
    fn test_parse_member_detail_later_duplicate_wins() {
        let html = r#"
            <h1>Dup</h1>
            <dl>
                <dt>Tel：</dt><dd>first</dd>
                <dt>Address</dt><dd>Taipei</dd>
                <dt>Tel</dt><dd>second</dd>
            </dl>
        "#;

        let record = parse_member_detail(html);

        assert_eq!(
            record.iter().collect::<Vec<_>>(),
            vec![("Title", "Dup"), ("Tel", "second"), ("Address", "Taipei")]
        );
    }

    #[test]
    fn test_parse_member_detail_without_heading_or_list() {
        let record = parse_member_detail("<html><body><p>Gone</p></body></html>");

        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("Title", "")]);
    }

    #[test]
    fn test_parse_member_detail_reads_only_first_list() {
        let html = r#"
            <h1>First</h1><h1>Second</h1>
            <dl><dt>Kept</dt><dd>yes</dd></dl>
            <dl><dt>Ignored</dt><dd>no</dd></dl>
        "#;

        let record = parse_member_detail(html);

        assert_eq!(record.title(), "First");
        assert_eq!(record.get("Kept"), Some("yes"));
        assert_eq!(record.get("Ignored"), None);
    }

    #[test]
    fn test_parse_member_detail_from_fixture() {
        let html =
            fs::read_to_string("fixtures/detail_1021.html").expect("Failed to read fixture");

        let record = parse_member_detail(&html);

        assert_eq!(record.title(), "Formosa Semiconductor Co., Ltd.");
        assert_eq!(record.get("Company Name"), Some("Formosa Semiconductor Co., Ltd."));
        assert_eq!(record.get("Tel"), Some("+886-3-555-0101"));
        assert_eq!(record.get("Website"), Some("http://www.formosa-semi.example"));
        assert_eq!(record.get("Address"), Some("No. 8, Li-Hsin Rd., Hsinchu Science Park"));
    }
}
