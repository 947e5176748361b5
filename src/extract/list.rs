//! Index page parsing
//!
//! The index page lists every entry in its first table. After one header row,
//! each row carries the numeric id in its first cell and links to the entry's
//! detail page from its second anchor cell (the first one is the sprite).

use crate::extract::tree::{child_elements, first_child, own_text, table_rows};
use crate::model::Reference;
use crate::{ExtractError, ExtractResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Number of leading rows in the index table that are headers
const HEADER_ROWS: usize = 1;

/// Parses the index page into references, in table order
///
/// # Arguments
///
/// * `html` - The index page body
/// * `base_url` - Origin the detail page links are resolved against
///
/// # Errors
///
/// Returns `ExtractError::Structure` when there is no table or when any row
/// lacks a numeric id or a usable detail link. A partially parsed list is
/// never returned.
///
/// # Example
///
/// ```
/// use dex_harvest::extract::extract_list;
/// use url::Url;
///
/// let html = r#"<table>
///   <tr><th>#</th><th></th><th>Name</th></tr>
///   <tr><td>1</td><td><a href="/img/1.png">img</a></td><td><a href="/wiki/A">A</a></td></tr>
/// </table>"#;
/// let base = Url::parse("https://example.com").unwrap();
/// let list = extract_list(html, &base).unwrap();
/// assert_eq!(list[0].url, "https://example.com/wiki/A");
/// ```
pub fn extract_list(html: &str, base_url: &Url) -> ExtractResult<Vec<Reference>> {
    let document = Html::parse_document(html);

    let selector = Selector::parse("table")
        .map_err(|e| ExtractError::Structure(format!("invalid table selector: {:?}", e)))?;
    let table = document
        .select(&selector)
        .next()
        .ok_or_else(|| ExtractError::Structure("index page has no table".to_string()))?;

    table_rows(table)
        .into_iter()
        .enumerate()
        .skip(HEADER_ROWS)
        .map(|(index, row)| parse_reference_row(row, index, base_url))
        .collect()
}

/// Parses one data row of the index table
fn parse_reference_row(
    row: ElementRef<'_>,
    index: usize,
    base_url: &Url,
) -> ExtractResult<Reference> {
    let id_text = first_child(row, "td")
        .and_then(own_text)
        .ok_or_else(|| ExtractError::Structure(format!("row {} has no id cell", index)))?;
    let id = id_text.parse::<u32>().map_err(|_| {
        ExtractError::Structure(format!("row {} has non-numeric id {:?}", index, id_text))
    })?;

    let anchor = child_elements(row, "td")
        .flat_map(|cell| child_elements(cell, "a"))
        .nth(1)
        .ok_or_else(|| {
            ExtractError::Structure(format!("row {} (id {}) has no name link", index, id))
        })?;

    let name = own_text(anchor).ok_or_else(|| {
        ExtractError::Structure(format!("row {} (id {}) has an empty name", index, id))
    })?;

    let href = anchor.value().attr("href").ok_or_else(|| {
        ExtractError::Structure(format!("row {} (id {}) link has no href", index, id))
    })?;
    let url = base_url.join(href).map_err(|e| {
        ExtractError::Structure(format!("row {} (id {}) has bad link {:?}: {}", index, id, href, e))
    })?;

    Ok(Reference::new(id, url.to_string(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    fn row(id: &str, name: &str, href: &str) -> String {
        format!(
            r#"<tr><td>{}</td><td><a href="/img/{}.png"><img src="x"></a></td><td><a href="{}">{}</a></td><td>Grass</td></tr>"#,
            id, id, href, name
        )
    }

    fn list_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><p>Intro</p><table class="roundy">
            <tr><th>#</th><th></th><th>Name</th><th>Type</th></tr>
            {}
            </table><table><tr><td>99</td></tr></table></body></html>"#,
            rows.concat()
        )
    }

    #[test]
    fn test_extract_two_rows() {
        let html = list_page(&[row("1", "A", "/a"), row("2", "B", "/b")]);
        let list = extract_list(&html, &base_url()).unwrap();

        assert_eq!(
            list,
            vec![
                Reference::new(1, "https://example.com/a", "A"),
                Reference::new(2, "https://example.com/b", "B"),
            ]
        );
    }

    #[test]
    fn test_id_with_padding_and_whitespace() {
        let html = list_page(&[row("\n0025 ", "Pikachu", "/wiki/Pikachu_(Pok%C3%A9mon)")]);
        let list = extract_list(&html, &base_url()).unwrap();

        assert_eq!(list[0].id, 25);
        assert_eq!(list[0].name, "Pikachu");
        assert_eq!(
            list[0].url,
            "https://example.com/wiki/Pikachu_(Pok%C3%A9mon)"
        );
    }

    #[test]
    fn test_absolute_href_is_kept() {
        let html = list_page(&[row("7", "C", "https://other.example.org/c")]);
        let list = extract_list(&html, &base_url()).unwrap();
        assert_eq!(list[0].url, "https://other.example.org/c");
    }

    #[test]
    fn test_header_only_gives_empty_list() {
        let html = list_page(&[]);
        assert!(extract_list(&html, &base_url()).unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let html = list_page(&[row("1", "A", "/a"), row("2", "B", "/b")]);
        assert_eq!(
            extract_list(&html, &base_url()).unwrap(),
            extract_list(&html, &base_url()).unwrap()
        );
    }

    #[test]
    fn test_no_table() {
        let err = extract_list("<html><body>nothing</body></html>", &base_url()).unwrap_err();
        assert!(matches!(err, ExtractError::Structure(_)));
    }

    #[test]
    fn test_missing_id_propagates() {
        let html = list_page(&[row("1", "A", "/a"), row("", "B", "/b")]);
        let err = extract_list(&html, &base_url()).unwrap_err();
        assert!(matches!(err, ExtractError::Structure(_)));
    }

    #[test]
    fn test_non_numeric_id() {
        let html = list_page(&[row("#1", "A", "/a")]);
        assert!(extract_list(&html, &base_url()).is_err());
    }

    #[test]
    fn test_missing_second_anchor() {
        let bad = "<tr><td>3</td><td><a href=\"/c\">C</a></td></tr>".to_string();
        let html = list_page(&[bad]);
        let err = extract_list(&html, &base_url()).unwrap_err();
        assert!(err.to_string().contains("no name link"));
    }

    #[test]
    fn test_missing_href() {
        let bad = "<tr><td>3</td><td><a>img</a></td><td><a>C</a></td></tr>".to_string();
        let html = list_page(&[bad]);
        assert!(extract_list(&html, &base_url()).is_err());
    }
}
