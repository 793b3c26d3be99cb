//! Integration tests for package loading, detection and the builder API.

mod common;

use common::{p, read_part, DocxBuilder};
use docfill::package::DocxTemplate;
use docfill::{
    detect_format_from_bytes, is_docx, Docfill, Error, HeaderFooterKind, LoadOptions,
    MissingValuePolicy, ValueMap,
};

fn broken_header() -> Vec<u8> {
    DocxBuilder::new()
        .paragraph(&["{BODY}"])
        .header("<w:p><w:r><w:t>oops</w:r></w:p>")
        .footer(&p(&["{FOOTER}"]))
        .build()
}

#[test]
fn test_sections_and_story_kinds() {
    let docx = DocxBuilder::new()
        .header(&p(&["default"]))
        .first_page_header(&p(&["first"]))
        .footer(&p(&["footer"]))
        .build();
    let template = DocxTemplate::from_bytes(&docx).unwrap();
    let document = template.document();

    assert_eq!(document.sections.len(), 1);
    let section = &document.sections[0];
    assert_eq!(section.headers.len(), 2);
    assert_eq!(section.headers[0].kind, HeaderFooterKind::Default);
    assert_eq!(section.headers[1].kind, HeaderFooterKind::First);
    assert_eq!(section.headers[1].part.as_deref(), Some("word/header2.xml"));
    assert_eq!(section.footers.len(), 1);

    assert_eq!(template.main_part(), "word/document.xml");
    assert_eq!(
        template.story_parts(),
        vec![
            "word/document.xml",
            "word/header1.xml",
            "word/header2.xml",
            "word/footer1.xml"
        ]
    );
}

#[test]
fn test_strict_mode_rejects_broken_header() {
    let err = DocxTemplate::from_bytes(&broken_header()).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)), "{err:?}");
}

#[test]
fn test_lenient_mode_skips_broken_header() {
    let options = LoadOptions::new().lenient();
    let mut template = DocxTemplate::from_bytes_with_options(&broken_header(), &options).unwrap();

    assert!(template.document().sections[0].headers.is_empty());
    assert_eq!(
        template.scan().into_iter().collect::<Vec<_>>(),
        vec!["{BODY}", "{FOOTER}"]
    );

    let values = ValueMap::from_fields([("BODY", "b"), ("FOOTER", "f")]).unwrap();
    template
        .substitute(&values, MissingValuePolicy::Error)
        .unwrap();
    let out = template.to_bytes().unwrap();

    assert_eq!(
        read_part(&out, "word/header1.xml"),
        read_part(&broken_header(), "word/header1.xml")
    );
    assert!(read_part(&out, "word/footer1.xml").contains(">f</w:t>"));
}

fn header_pointing_at_styles() -> Vec<u8> {
    DocxBuilder::new()
        .body(r#"<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId1"/></w:sectPr></w:pPr></w:p>"#)
        .paragraph(&["{BODY}"])
        .build()
}

#[test]
fn test_header_reference_must_be_a_header() {
    let err = DocxTemplate::from_bytes(&header_pointing_at_styles()).unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)), "{err:?}");

    let options = LoadOptions::new().lenient();
    let template =
        DocxTemplate::from_bytes_with_options(&header_pointing_at_styles(), &options).unwrap();
    assert!(template.document().sections[0].headers.is_empty());
    assert!(!template.story_parts().contains(&"word/styles.xml"));
}

#[test]
fn test_metadata_can_be_skipped() {
    let docx = DocxBuilder::new().title("Contract").build();
    let options = LoadOptions::new().with_metadata(false);
    let template = DocxTemplate::from_bytes_with_options(&docx, &options).unwrap();
    assert!(template.metadata().title.is_none());
}

#[test]
fn test_part_size_limit() {
    let big = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", "x".repeat(2 * 1024 * 1024));
    let docx = DocxBuilder::new().body(&big).build();

    let options = LoadOptions::new().with_part_size_limit(1);
    assert!(DocxTemplate::from_bytes_with_options(&docx, &options).is_err());

    let options = LoadOptions::new().with_part_size_limit(4);
    assert!(DocxTemplate::from_bytes_with_options(&docx, &options).is_ok());
}

#[test]
fn test_detect_format() {
    let docx = DocxBuilder::new().build();
    let format = detect_format_from_bytes(&docx).unwrap();
    assert_eq!(format.main_part, "word/document.xml");
    assert!(!format.macro_enabled);
    assert_eq!(format.to_string(), format!("DOCX (word/document.xml, {} parts)", format.part_count));
}

#[test]
fn test_is_docx_path() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.docx");
    let bad = dir.path().join("bad.docx");
    std::fs::write(&good, DocxBuilder::new().build()).unwrap();
    std::fs::write(&bad, b"plain text").unwrap();

    assert!(is_docx(&good));
    assert!(!is_docx(&bad));
}

#[test]
fn test_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    let docx = DocxBuilder::new().paragraph(&["{A}"]).build();

    let mut template = DocxTemplate::from_bytes(&docx).unwrap();
    template
        .substitute(&ValueMap::from_fields([("A", "done")]).unwrap(), MissingValuePolicy::Keep)
        .unwrap();
    template.save(&path).unwrap();

    let reopened = docfill::open(&path).unwrap();
    assert_eq!(reopened.document().plain_text(), "done");
}

#[test]
fn test_docfill_builder_fill() {
    let docx = DocxBuilder::new()
        .paragraph(&["{A} {B}"])
        .header("<w:p><w:r><w:t>oops</w:r></w:p>")
        .build();
    let values = ValueMap::from_fields([("A", "1")]).unwrap();

    let out = Docfill::new().lenient().fill_bytes(&docx, &values).unwrap();
    assert!(read_part(&out, "word/document.xml").contains("1 {B}"));

    let err = Docfill::new()
        .lenient()
        .strict_values()
        .fill_bytes(&docx, &values)
        .unwrap_err();
    assert_eq!(err.missing_placeholder(), Some("{B}"));
}

#[test]
fn test_extract_text_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.docx");
    std::fs::write(
        &path,
        DocxBuilder::new()
            .paragraph(&["Hello ", "{NAME}"])
            .footer(&p(&["bye"]))
            .build(),
    )
    .unwrap();

    assert_eq!(docfill::extract_text(&path).unwrap(), "Hello {NAME}\nbye");

    let json = docfill::to_json(&path, docfill::JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["body"].is_array());
    assert_eq!(value["sections"].as_array().map(Vec::len), Some(1));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_async_fill() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.docx");
    let output = dir.path().join("out.docx");
    std::fs::write(&input, DocxBuilder::new().paragraph(&["{X}"]).build()).unwrap();

    let tokens = docfill::scan_file_async(&input).await.unwrap();
    assert!(tokens.contains("{X}"));

    let values = ValueMap::from_fields([("X", "y")]).unwrap();
    let report = docfill::fill_file_async(&input, &output, values, docfill::FillOptions::default())
        .await
        .unwrap();
    assert_eq!(report.replaced, 1);
    assert_eq!(docfill::extract_text(&output).unwrap(), "y");
}
