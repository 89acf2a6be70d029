use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::asset::fake::FakeToolchain;
use crate::error::StorageError;

fn addr(s: &str) -> PageAddress {
    PageAddress::parse(s).unwrap()
}

fn wiki() -> (TempDir, Arc<FakeToolchain>, Wiki) {
    let dir = TempDir::new().unwrap();
    let fake = Arc::new(FakeToolchain::default());
    let wiki = Wiki::with_toolchain(WikiConfig::rooted(dir.path()), fake.clone()).unwrap();
    (dir, fake, wiki)
}

#[test]
fn test_links_resolve_to_show_route() {
    let (_dir, _fake, wiki) = wiki();
    wiki.save(&PageAddress::root(), None, "Welcome").unwrap();
    wiki.save(&addr("guide"), None, "Start with <<setup>>.").unwrap();
    wiki.save(&addr("guide/intro"), None, "Next: <<./setup>>").unwrap();
    wiki.save(&addr("guide/setup"), None, "Install things.").unwrap();

    let intro = wiki.show(&addr("guide/intro")).unwrap();
    assert!(
        intro.html.contains("<a href=\"/wiki/show/guide/setup/\">setup</a>"),
        "{}",
        intro.html
    );
    let guide = wiki.show(&addr("guide")).unwrap();
    assert!(guide.html.contains("<a href=\"/wiki/show/guide/setup/\">setup</a>"));

    let setup = wiki.show(&addr("guide/setup")).unwrap();
    assert_eq!(setup.html, "<p>Install things.</p>\n");
}

#[test]
fn test_dashed_addresses_keep_link_targets() {
    let (_dir, _fake, wiki) = wiki();
    wiki.save(&addr("g"), None, "See <<a--b>> and <</x---y>>.").unwrap();
    wiki.save(&addr("g/a--b"), None, "dashes").unwrap();

    let html = wiki.show(&addr("g")).unwrap().html;
    assert!(html.contains("<a href=\"/wiki/show/g/a--b/\">a&ndash;b</a>"), "{html}");
    assert!(html.contains("<a href=\"/wiki/show/x---y/\">"), "{html}");
}

#[test]
fn test_show_navigation() {
    let (_dir, _fake, wiki) = wiki();
    for part in ["notes/waves_001", "notes/waves_002", "notes/waves_003"] {
        wiki.save(&addr(part), None, "# Part\n\nbody").unwrap();
    }

    let page = wiki.show(&addr("notes/waves_002")).unwrap();
    assert_eq!(page.node.title(), "Part");
    assert_eq!(page.parent.map(|p| p.address), Some(addr("notes")));
    assert_eq!(page.previous.map(|p| p.address), Some(addr("notes/waves_001")));
    assert_eq!(page.next.map(|p| p.address), Some(addr("notes/waves_003")));
    assert_eq!(page.edit_url, "/wiki/edit/notes/waves_002/");

    let notes = wiki.show(&addr("notes")).unwrap();
    assert_eq!(notes.children.len(), 3);
}

#[test]
fn test_show_missing_page() {
    let (_dir, _fake, wiki) = wiki();
    assert!(matches!(
        wiki.show(&addr("nowhere")),
        Err(WikiError::NotFound(_))
    ));
    // the root always exists
    assert_eq!(wiki.show(&PageAddress::root()).unwrap().html, "");
}

#[test]
fn test_edit_and_save_normalizes() {
    let (_dir, _fake, wiki) = wiki();
    assert_eq!(wiki.edit(&addr("draft")).unwrap().source, "");

    wiki.save(&addr("draft"), None, "\r\n  line one\r\nline two  \r\n").unwrap();
    assert_eq!(wiki.edit(&addr("draft")).unwrap().source, "line one\nline two");
}

#[test]
fn test_title_refreshes_after_save() {
    let (_dir, _fake, wiki) = wiki();
    wiki.save(&addr("optics"), None, "# Light").unwrap();
    assert_eq!(wiki.show(&addr("optics")).unwrap().node.title(), "Light");

    wiki.save(&addr("optics"), None, "# Lenses").unwrap();
    assert_eq!(wiki.show(&addr("optics")).unwrap().node.title(), "Lenses");
}

#[test]
fn test_save_with_rename() {
    let (dir, _fake, wiki) = wiki();
    wiki.save(&addr("old"), None, "parent").unwrap();
    wiki.save(&addr("old/child"), None, "kid").unwrap();

    let moved = wiki.save(&addr("old"), Some(&addr("archive/new")), "updated").unwrap();
    assert_eq!(moved, addr("archive/new"));
    assert_eq!(wiki.edit(&moved).unwrap().source, "updated");
    assert_eq!(wiki.edit(&addr("archive/new/child")).unwrap().source, "kid");
    assert!(!dir.path().join("wiki-pages/old").exists());

    wiki.save(&addr("other"), None, "x").unwrap();
    let err = wiki.save(&addr("other"), Some(&addr("archive/new")), "x");
    assert!(matches!(
        err,
        Err(WikiError::Storage(StorageError::Conflict(_)))
    ));
}

#[test]
fn test_delete_collapses() {
    let (dir, _fake, wiki) = wiki();
    let root = dir.path().join("wiki-pages");
    wiki.save(&addr("a"), None, "top").unwrap();
    wiki.save(&addr("a/b"), None, "leaf").unwrap();
    assert!(root.join("a").is_dir());

    wiki.delete(&addr("a/b")).unwrap();
    assert!(root.join("a").is_file());
    assert_eq!(fs::read_to_string(root.join("a")).unwrap(), "top");

    assert!(matches!(
        wiki.delete(&addr("a/b")),
        Err(WikiError::NotFound(_))
    ));
}

#[test]
fn test_delete_bodiless_directory_page() {
    let (_dir, _fake, wiki) = wiki();
    wiki.save(&addr("topic/part"), None, "child").unwrap();

    assert!(matches!(
        wiki.delete(&addr("topic")),
        Err(WikiError::NotFound(_))
    ));
    assert_eq!(wiki.edit(&addr("topic/part")).unwrap().source, "child");
}

#[test]
fn test_subtree() {
    let (_dir, _fake, wiki) = wiki();
    for page in ["b", "a/y", "a/x"] {
        wiki.save(&addr(page), None, "text").unwrap();
    }
    let entries = wiki.subtree(&PageAddress::root()).unwrap();
    let listing: Vec<(usize, &str)> = entries
        .iter()
        .map(|e| (e.depth, e.node.address.as_str()))
        .collect();
    assert_eq!(
        listing,
        vec![(0, ""), (1, "a"), (2, "a/x"), (2, "a/y"), (1, "b")]
    );
}

#[test]
fn test_pdf() {
    let (_dir, fake, wiki) = wiki();
    wiki.save(&addr("waves"), None, "---\ntitle: Waves & Tides\n---\nBody :jargon:`swell`")
        .unwrap();

    let bytes = wiki.pdf(&addr("waves")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(fake.calls(), vec!["pdflatex", "pdflatex"]);

    let config = wiki.config();
    let tex = fs::read_to_string(config.toolchain.work_dir.join("latex/ppdf.tex")).unwrap();
    assert!(tex.contains(r"\title{Waves \& Tides"));
    assert!(tex.contains(r"Body \textbf{swell}\index{swell}"));

    fake.set_failing(true);
    assert!(matches!(wiki.pdf(&addr("waves")), Err(WikiError::Pdf(_))));
}
