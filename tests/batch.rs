//! End-to-end tests for the batch converter
//!
//! Source documents are constructed programmatically with lopdf so the
//! scenarios run without fixture files.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use pdf2svg::interpret::{ConverterContext, PageInterpreter};
use pdf2svg::{
    BatchConverter, ConvertOptions, Error, PageRanges, Result, SvgDocument, SvgElement,
};

/// Build an in-memory PDF with one text line per page
fn build_pdf(page_texts: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_texts.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save_pdf(dir: &Path, name: &str, page_texts: &[&str]) -> PathBuf {
    let path = dir.join(name);
    build_pdf(page_texts)
        .save(&path)
        .expect("test PDF saves");
    path
}

#[test]
fn test_three_page_document_default_range() {
    let dir = TempDir::new().unwrap();
    let pdf = save_pdf(dir.path(), "sample.pdf", &["Page one", "Page two", "Page three"]);
    let outdir = dir.path().join("out");

    let options = ConvertOptions {
        output_dir: outdir.clone(),
        ..Default::default()
    };
    let mut converter = BatchConverter::new(options);
    let outfiles = converter.convert_file(&pdf).expect("conversion succeeds");

    // exactly three page files, in page order
    let names: Vec<String> = outfiles
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["sample-page1.svg", "sample-page2.svg", "sample-page3.svg"]);
    for outfile in &outfiles {
        assert!(outfile.exists(), "missing {}", outfile.display());
    }
    assert!(outdir.join("index.html").exists(), "navigation index missing");
    assert_eq!(converter.page_list().len(), 3);

    // the extracted text ends up in the page SVG
    let first = std::fs::read_to_string(&outfiles[0]).unwrap();
    assert!(first.contains("Page one"), "unexpected SVG: {}", first);
    assert!(first.contains("font-family=\"Helvetica\""));
}

#[test]
fn test_non_contiguous_page_range() {
    let dir = TempDir::new().unwrap();
    let pdf = save_pdf(dir.path(), "five.pdf", &["p1", "p2", "p3", "p4", "p5"]);
    let outdir = dir.path().join("out");

    let options = ConvertOptions {
        page_ranges: Some(PageRanges::parse("1,3").unwrap()),
        output_dir: outdir.clone(),
        ..Default::default()
    };
    let outfiles = BatchConverter::new(options)
        .convert_file(&pdf)
        .expect("conversion succeeds");

    assert_eq!(outfiles.len(), 2);
    assert!(outdir.join("five-page1.svg").exists());
    assert!(outdir.join("five-page3.svg").exists());
    for skipped in ["five-page2.svg", "five-page4.svg", "five-page5.svg"] {
        assert!(!outdir.join(skipped).exists(), "{} should not exist", skipped);
    }
}

#[test]
fn test_output_path_occupied_by_file_aborts_before_conversion() {
    let dir = TempDir::new().unwrap();
    let pdf = save_pdf(dir.path(), "doc.pdf", &["p1"]);
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"plain file").unwrap();

    let options = ConvertOptions {
        output_dir: blocker.clone(),
        ..Default::default()
    };
    let mut converter = BatchConverter::new(options);
    let result = converter.convert_file(&pdf);

    assert!(matches!(result, Err(Error::NotADirectory(_))));
    assert!(converter.page_list().is_empty(), "no page may be converted");
}

#[test]
fn test_encrypted_document_with_wrong_password() {
    let dir = TempDir::new().unwrap();
    let outdir = dir.path().join("out");

    let mut doc = build_pdf(&["secret"]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let options = ConvertOptions {
        password: "wrong".to_string(),
        output_dir: outdir.clone(),
        ..Default::default()
    };
    let mut converter = BatchConverter::new(options);
    let result = converter.convert_document(doc, Path::new("secret.pdf"));

    assert!(matches!(result, Err(Error::Decryption { .. })));
    assert!(converter.page_list().is_empty());
    // decryption fails before any output is produced
    assert!(!outdir.join("secret-page1.svg").exists());
}

#[test]
fn test_first_document_error_aborts_batch() {
    let dir = TempDir::new().unwrap();
    let good = save_pdf(dir.path(), "good.pdf", &["fine"]);
    let outdir = dir.path().join("out");

    let options = ConvertOptions {
        output_dir: outdir.clone(),
        ..Default::default()
    };
    let mut converter = BatchConverter::new(options);
    let result = converter.run(&[dir.path().join("missing.pdf"), good]);

    assert!(matches!(result, Err(Error::FileNotFound(_))));
    // the later input is never attempted
    assert!(!outdir.join("good-page1.svg").exists());
}

#[test]
fn test_corrupt_document_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.pdf");
    std::fs::write(&bogus, b"this is not a pdf").unwrap();

    let options = ConvertOptions {
        output_dir: dir.path().join("out"),
        ..Default::default()
    };
    let result = BatchConverter::new(options).convert_file(&bogus);
    assert!(matches!(result, Err(Error::DocumentParse { .. })));
}

#[test]
fn test_in_memory_parser_variant() {
    let dir = TempDir::new().unwrap();
    let pdf = save_pdf(dir.path(), "mem.pdf", &["p1", "p2"]);

    let options = ConvertOptions {
        load_in_memory: true,
        output_dir: dir.path().join("out"),
        ..Default::default()
    };
    let outfiles = BatchConverter::new(options)
        .convert_file(&pdf)
        .expect("in-memory load succeeds");
    assert_eq!(outfiles.len(), 2);
}

/// Canned interpreter that exercises the shared accumulators
struct StubInterpreter;

impl PageInterpreter for StubInterpreter {
    fn interpret(
        &self,
        _doc: &Document,
        page_number: u32,
        _page_id: lopdf::ObjectId,
        ctx: &mut ConverterContext,
    ) -> Result<SvgDocument> {
        ctx.font_manager.resolve("StubSans-Bold");
        ctx.record_code_point(0x2603);
        let mut svg = SvgDocument::new(100.0, 100.0);
        svg.push(SvgElement::Title(format!("stub {}", page_number)));
        Ok(svg)
    }
}

#[test]
fn test_stub_interpreter_drives_side_channel_state() {
    let dir = TempDir::new().unwrap();
    let pdf = save_pdf(dir.path(), "stubbed.pdf", &["a", "b"]);
    let outdir = dir.path().join("out");

    let options = ConvertOptions {
        output_dir: outdir.clone(),
        ..Default::default()
    };
    let mut converter =
        BatchConverter::new(options).with_interpreter(Box::new(StubInterpreter));
    let outfiles = converter.convert_file(&pdf).expect("stub conversion succeeds");

    assert_eq!(outfiles.len(), 2);
    assert_eq!(converter.page_list().len(), 2);
    let page1 = std::fs::read_to_string(&outfiles[0]).unwrap();
    assert!(page1.contains("stub 1"));
    let page2 = std::fs::read_to_string(&outfiles[1]).unwrap();
    assert!(page2.contains("stub 2"));
}
