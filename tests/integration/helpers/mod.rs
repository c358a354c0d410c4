//! Test helper utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tempfile::TempDir;

/// Build a PDF with one line of text per page.
///
/// An empty string produces a page without any text content.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        if !text.is_empty() {
            operations = vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ];
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Write a generated PDF into `dir`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(&path, pdf_bytes(pages)).expect("write pdf");
    path
}

/// Write a `.pdf` file that no backend can parse.
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"this is not a pdf at all").expect("write garbage");
    path
}

/// Input folder with the three-document scenario: two readable, one broken.
pub fn three_document_folder() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_pdf(dir.path(), "a_minutes.pdf", &["The ethics training was postponed"]);
    write_garbage(dir.path(), "b_broken.pdf");
    write_pdf(
        dir.path(),
        "c_agenda.pdf",
        &["Item 4: conflict of interest disclosure", "Nothing relevant here"],
    );
    dir
}

/// Config file with two small tiers, written into `dir`.
pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("docsift.toml");
    fs::write(
        &path,
        r#"
[scan]
context_window = 10

[[priority_tiers]]
label = "urgent"
patterns = ['\bethics\s+training\b', '\bconflict\s+of\s+interest\b']

[[priority_tiers]]
label = "watch"
patterns = ['\bagenda\b', '\bnothing\b']
"#,
    )
    .expect("write config");
    path
}
