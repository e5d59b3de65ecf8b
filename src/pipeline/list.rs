//! Nested unordered lists.
//!
//! Items render depth-first, pre-order: an item's own line comes before
//! its children, and each level indents by two spaces. An item whose
//! content is not a decodable text block emits no line, but its children
//! still render one level deeper.

use crate::config::ConverterConfig;
use crate::error::{BlockError, Unit};
use crate::pipeline::decode::{payload, ListItem, TextBlock};
use crate::pipeline::facet::render_facets_into;

const INDENT: &str = "  ";
const MARKER: &str = "- ";

/// Render `items` at `depth` into a fresh string.
pub fn render_list(items: &[ListItem], depth: usize, config: &ConverterConfig) -> String {
    let mut out = String::new();
    let mut issues = Vec::new();
    render_list_into(&mut out, items, depth, config, &mut issues);
    out
}

/// Append the rendered list to `out`.
///
/// Undecodable items and dropped facets are pushed onto `issues` in
/// encounter order.
pub fn render_list_into(
    out: &mut String,
    items: &[ListItem],
    depth: usize,
    config: &ConverterConfig,
    issues: &mut Vec<BlockError>,
) {
    for item in items {
        match payload::<TextBlock>(&item.content, Unit::ListItem) {
            Ok(text) => {
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                out.push_str(MARKER);
                out.push_str(&render_facets_into(
                    &text.plaintext,
                    &text.facets,
                    config,
                    issues,
                ));
                out.push('\n');
            }
            Err(e) => issues.push(e),
        }

        if !item.children.is_empty() {
            render_list_into(out, &item.children, depth + 1, config, issues);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn item(text: &str, children: Vec<ListItem>) -> ListItem {
        ListItem {
            content: json!({ "$type": "pub.leaflet.blocks.text", "plaintext": text }),
            children,
        }
    }

    fn broken(children: Vec<ListItem>) -> ListItem {
        ListItem {
            content: Value::String("not a text block".into()),
            children,
        }
    }

    #[test]
    fn flat_list() {
        let items = vec![item("one", vec![]), item("two", vec![])];
        assert_eq!(
            render_list(&items, 0, &ConverterConfig::default()),
            "- one\n- two\n"
        );
    }

    #[test]
    fn nested_indent_is_two_spaces_per_level() {
        let items = vec![item(
            "a",
            vec![item("b", vec![item("c", vec![])]), item("d", vec![])],
        )];
        assert_eq!(
            render_list(&items, 0, &ConverterConfig::default()),
            "- a\n  - b\n    - c\n  - d\n"
        );
    }

    #[test]
    fn starting_depth_is_honoured() {
        let items = vec![item("deep", vec![])];
        assert_eq!(
            render_list(&items, 3, &ConverterConfig::default()),
            "      - deep\n"
        );
    }

    #[test]
    fn broken_item_is_omitted_but_children_render_deeper() {
        let items = vec![
            item("first", vec![]),
            broken(vec![item("orphan child", vec![])]),
            item("last", vec![]),
        ];
        let mut out = String::new();
        let mut issues = Vec::new();
        render_list_into(&mut out, &items, 0, &ConverterConfig::default(), &mut issues);
        assert_eq!(out, "- first\n  - orphan child\n- last\n");
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            BlockError::DecodeFailure {
                unit: Unit::ListItem,
                ..
            }
        ));
    }

    #[test]
    fn missing_content_counts_as_broken() {
        let items = vec![ListItem {
            content: Value::Null,
            children: vec![],
        }];
        assert_eq!(render_list(&items, 0, &ConverterConfig::default()), "");
    }

    #[test]
    fn null_children_and_facets_keep_the_item() {
        let list: crate::pipeline::decode::UnorderedListBlock = serde_json::from_value(json!({
            "children": [
                { "content": { "$type": "pub.leaflet.blocks.text", "plaintext": "kept", "facets": null },
                  "children": null },
                { "content": { "$type": "pub.leaflet.blocks.text", "plaintext": "also kept" } }
            ]
        }))
        .unwrap();
        let mut out = String::new();
        let mut issues = Vec::new();
        render_list_into(&mut out, &list.children, 0, &ConverterConfig::default(), &mut issues);
        assert_eq!(out, "- kept\n- also kept\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn item_facets_are_applied() {
        let items = vec![ListItem {
            content: json!({
                "$type": "pub.leaflet.blocks.text",
                "plaintext": "see docs",
                "facets": [{
                    "index": { "byteStart": 4, "byteEnd": 8 },
                    "features": [{
                        "$type": "pub.leaflet.richtext.facet#link",
                        "uri": "https://docs.test"
                    }]
                }]
            }),
            children: vec![],
        }];
        assert_eq!(
            render_list(&items, 0, &ConverterConfig::default()),
            "- see [docs](https://docs.test)\n"
        );
    }
}
