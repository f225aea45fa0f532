// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use halimede::dom::{parse_document, path_of, resolve_path};
use halimede::edit::{commit_edit, reconcile, EditTarget, MatchStrategy};
use halimede::ingest::{apply_report, ingest_dir};
use halimede::model::{EditSession, Workspace};
use halimede::preview::{render_preview, RenderOptions};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("site")
}

fn fixture_workspace() -> Workspace {
    let report = ingest_dir(&fixtures_dir()).expect("ingest fixture site");
    assert!(report.rejected.is_empty(), "fixture files all supported");
    let mut workspace = Workspace::new();
    apply_report(&mut workspace, &report);
    workspace
}

#[test]
fn folder_ingest_yields_editable_text_and_listed_binaries() {
    let workspace = fixture_workspace();

    assert_eq!(workspace.project_name(), Some("site"));
    assert_eq!(workspace.documents().len(), 2);
    assert!(workspace.tree().get("index.html").expect("entry").is_editable());
    assert!(workspace.tree().get("styles.css").expect("entry").is_editable());
    let logo = workspace.tree().get("img/logo.png").expect("png listed");
    assert!(!logo.is_editable());
}

#[test]
fn load_then_save_without_edits_is_byte_identical() {
    let on_disk = fs::read_to_string(fixtures_dir().join("index.html")).expect("read fixture");
    let mut workspace = fixture_workspace();

    let id = workspace
        .tree()
        .get("index.html")
        .and_then(|entry| entry.document_id().cloned())
        .expect("index document");
    let document = workspace.document_mut(&id).expect("document");
    assert_eq!(document.source(), on_disk);

    document.mark_saved();
    assert_eq!(document.source(), on_disk);
    assert!(!document.is_modified());
}

#[test]
fn visual_edit_scenario_hello_to_hello_world() {
    let mut workspace = fixture_workspace();
    let id = workspace
        .tree()
        .get("index.html")
        .and_then(|entry| entry.document_id().cloned())
        .expect("index document");

    // Double-click analog: capture the rendered element handle.
    let (path, original, rev) = {
        let document = workspace.document(&id).expect("document");
        let tree = parse_document(document.source());
        let target = tree
            .elements()
            .into_iter()
            .find(|&index| {
                let node = tree.node(index).expect("node");
                node.tag() == Some("p")
                    && node
                        .content_span()
                        .is_some_and(|span| span.slice(document.source()) == "Hello")
            })
            .expect("the <p>Hello</p> element");
        (
            path_of(&tree, target).expect("path"),
            "Hello".to_owned(),
            document.rev(),
        )
    };

    let session = EditSession::new(id.clone(), rev, path, SmolStr::new("p"), original);
    let document = workspace.document_mut(&id).expect("document");
    let result = commit_edit(document, &session, "Hello World", &[]).expect("commit");

    assert_eq!(result.strategy, MatchStrategy::ExactSpan);
    assert!(document.source().contains("<p>Hello World</p>"));
    assert!(!document.source().contains("<p>Hello</p>"));
    assert!(document.is_modified());
}

#[test]
fn reconcile_without_a_handle_still_finds_the_unique_paragraph() {
    let workspace = fixture_workspace();
    let document = workspace
        .tree()
        .get("index.html")
        .and_then(|entry| entry.document_id().cloned())
        .and_then(|id| workspace.document(&id).cloned())
        .expect("index document");

    let target = EditTarget {
        path: None,
        tag: SmolStr::new("p"),
        original_content: "Hello".to_owned(),
    };
    let outcome = reconcile(document.source(), &target, "Hello World", &[]).expect("reconcile");
    assert_eq!(outcome.strategy, MatchStrategy::ContentUnique);
    assert!(outcome.new_source.contains("<p>Hello World</p>"));
}

#[test]
fn preview_is_idempotent_and_maps_elements() {
    let workspace = fixture_workspace();
    let document = workspace
        .tree()
        .get("index.html")
        .and_then(|entry| entry.document_id().cloned())
        .and_then(|id| workspace.document(&id).cloned())
        .expect("index document");

    let tree = parse_document(document.source());
    let options = RenderOptions::default();
    let first = render_preview(document.source(), &tree, &options);
    let second = render_preview(document.source(), &tree, &options);
    assert_eq!(first, second);

    let text = first.text();
    assert!(text.contains("# Fixture Site"));
    assert!(text.contains("Hello"));
    assert!(text.contains("[link](/docs)"));
    assert!(text.contains("[image: logo]"));
    assert!(!first.index.is_empty());

    // The handle of every indexed element resolves back into the tree.
    for &node in first.index.keys() {
        let path = path_of(&tree, node).expect("path of indexed node");
        assert_eq!(resolve_path(&tree, &path), Some(node));
    }
}
