// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Span-annotated HTML parsing, querying, and serialization.
//!
//! The tree keeps exact byte spans into the source for every open tag and
//! content region, so edits made against the rendered form can be spliced
//! back into the source without content-matching guesswork.

pub mod entities;
pub mod node;
pub mod parser;
pub mod query;
pub mod serialize;

pub use entities::{decode_entities, escape_attr_value};
pub use node::{Attribute, ByteSpan, DomTree, Node, NodeIndex, NodeKind, NodePath};
pub use parser::parse_document;
pub use query::{find_by_tag_and_content, path_of, resolve_path};
pub use serialize::{is_editing_state_attr, serialize_open_tag};
