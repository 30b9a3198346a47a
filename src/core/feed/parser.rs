use roxmltree::{Document, Node, ParsingOptions};

use super::types::NewsItem;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("feed is not well-formed xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("unsupported encoding declaration: {0:?}")]
    Encoding(String),
}

/// Every `<item>` in the document, in document order.
pub fn parse_news_items(xml: &str) -> Result<Vec<NewsItem>, ParseError> {
    if let Some(label) = declared_encoding(xml) {
        if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
            return Err(ParseError::Encoding(label.to_string()));
        }
    }

    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let doc = Document::parse_with_options(xml, options)?;

    let items: Vec<NewsItem> = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "item")
        .map(item_from_node)
        .collect();

    tracing::debug!(items = items.len(), "parsed feed items");
    Ok(items)
}

fn item_from_node(item: Node<'_, '_>) -> NewsItem {
    NewsItem {
        title: first_descendant_text(item, "title"),
        link: first_descendant_text(item, "link"),
        pub_date: first_descendant_text(item, "pubDate"),
        source: first_descendant_text(item, "source"),
    }
}

fn first_descendant_text(parent: Node<'_, '_>, name: &str) -> Option<String> {
    parent
        .descendants()
        .skip(1)
        .find(|node| is_unprefixed_element(*node, name))
        .map(text_content)
}

fn is_unprefixed_element(node: Node<'_, '_>, name: &str) -> bool {
    if !node.is_element() || node.tag_name().name() != name {
        return false;
    }
    match node.tag_name().namespace() {
        None => true,
        Some(uri) => node.lookup_prefix(uri).is_none(),
    }
}

fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect()
}

fn declared_encoding(xml: &str) -> Option<&str> {
    let rest = xml.strip_prefix('\u{feff}').unwrap_or(xml).strip_prefix("<?xml")?;
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    let declaration = &rest[..rest.find("?>")?];
    let after_key = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let value = after_key.trim_start().strip_prefix('=')?.trim_start();
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    Some(&value[..value.find(quote)?])
}
