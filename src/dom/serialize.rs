// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::entities::escape_attr_value;
use super::node::Attribute;

/// Attributes that exist only while an element is being visually edited and
/// must never be written back into the source.
pub fn is_editing_state_attr(name: &str) -> bool {
    name == "contenteditable" || name.starts_with("ve-") || name.starts_with("data-ve-")
}

/// Re-serializes an element's open tag from its live attributes, excluding
/// editing-state attributes.
///
/// Output is normalized: attribute order as given, double quotes, escaped
/// values. Byte-exact preservation of the author's original formatting is
/// not attempted.
pub fn serialize_open_tag(tag: &str, attrs: &[Attribute]) -> String {
    let mut out = String::with_capacity(tag.len() + 2);
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        if is_editing_state_attr(attr.name.as_str()) {
            continue;
        }
        out.push(' ');
        out.push_str(attr.name.as_str());
        if !attr.value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_attr_value(&attr.value));
            out.push('"');
        }
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::{is_editing_state_attr, serialize_open_tag};
    use crate::dom::Attribute;

    #[test]
    fn serializes_plain_tag_without_attributes() {
        assert_eq!(serialize_open_tag("p", &[]), "<p>");
    }

    #[test]
    fn serializes_attributes_with_escaping() {
        let attrs = vec![
            Attribute::new("class", "intro"),
            Attribute::new("title", "a \"b\" & c"),
            Attribute::new("hidden", ""),
        ];
        assert_eq!(
            serialize_open_tag("p", &attrs),
            r#"<p class="intro" title="a &quot;b&quot; &amp; c" hidden>"#
        );
    }

    #[test]
    fn drops_editing_state_attributes() {
        let attrs = vec![
            Attribute::new("contenteditable", "true"),
            Attribute::new("ve-selected", ""),
            Attribute::new("data-ve-session", "1"),
            Attribute::new("id", "keep"),
        ];
        assert_eq!(serialize_open_tag("h1", &attrs), r#"<h1 id="keep">"#);
        assert!(is_editing_state_attr("contenteditable"));
        assert!(!is_editing_state_attr("id"));
    }
}
