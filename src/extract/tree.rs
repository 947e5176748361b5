//! Small navigation helpers over the parsed document tree

use scraper::ElementRef;

/// Direct element children of `element` with the given tag name
pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// First direct child of `element` with the given tag name
pub(crate) fn first_child<'a>(element: ElementRef<'a>, name: &'static str) -> Option<ElementRef<'a>> {
    child_elements(element, name).next()
}

/// Text held directly by `element`, ignoring text inside child elements,
/// trimmed. `None` when there is no such text.
pub(crate) fn own_text(element: ElementRef<'_>) -> Option<String> {
    let text: String = element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// All text below `element`, trimmed. `None` when empty.
pub(crate) fn full_text(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Body rows of a table in document order
///
/// The HTML parser moves bare rows into an implicit `tbody`, so rows are read
/// from `tbody` groups as well as from the table itself. Rows in `thead` and
/// `tfoot` are not body rows and are left out.
pub(crate) fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "tbody" => rows.extend(child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}
