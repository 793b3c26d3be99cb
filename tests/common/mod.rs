//! Shared helpers: build small DOCX packages in memory.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Escape text for element content.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A run with plain text.
pub fn run(text: &str) -> String {
    format!(
        r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

/// A bold run.
pub fn bold(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

/// A paragraph of plain runs.
pub fn p(runs: &[&str]) -> String {
    let body: String = runs.iter().map(|r| run(r)).collect();
    format!("<w:p>{}</w:p>", body)
}

/// A paragraph from prebuilt run XML.
pub fn p_raw(runs: &str) -> String {
    format!("<w:p>{}</w:p>", runs)
}

/// A table of single-paragraph cells.
pub fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl><w:tblPr/>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in *row {
            xml.push_str(&format!("<w:tc>{}</w:tc>", p(&[*cell])));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

/// A table whose single cell holds arbitrary block XML.
pub fn table_with_cell(content: &str) -> String {
    format!(
        "<w:tbl><w:tblPr/><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
        content
    )
}

struct StoryPart {
    rel_id: &'static str,
    kind: &'static str,
    ref_type: &'static str,
    file: &'static str,
    content: String,
}

/// In-memory DOCX builder.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    stories: Vec<StoryPart>,
    title: Option<String>,
    extra: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw block XML to the body.
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Append a paragraph of plain runs to the body.
    pub fn paragraph(self, runs: &[&str]) -> Self {
        let xml = p(runs);
        self.body(&xml)
    }

    /// Default header (`word/header1.xml`).
    pub fn header(mut self, blocks: &str) -> Self {
        self.stories.push(StoryPart {
            rel_id: "rId10",
            kind: "header",
            ref_type: "default",
            file: "header1.xml",
            content: blocks.to_string(),
        });
        self
    }

    /// Default footer (`word/footer1.xml`).
    pub fn footer(mut self, blocks: &str) -> Self {
        self.stories.push(StoryPart {
            rel_id: "rId11",
            kind: "footer",
            ref_type: "default",
            file: "footer1.xml",
            content: blocks.to_string(),
        });
        self
    }

    /// First-page header (`word/header2.xml`).
    pub fn first_page_header(mut self, blocks: &str) -> Self {
        self.stories.push(StoryPart {
            rel_id: "rId12",
            kind: "header",
            ref_type: "first",
            file: "header2.xml",
            content: blocks.to_string(),
        });
        self
    }

    /// Core properties title.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// An extra opaque package entry.
    pub fn entry(mut self, name: &str, data: &[u8]) -> Self {
        self.extra.push((name.to_string(), data.to_vec()));
        self
    }

    /// Word/document.xml content.
    pub fn document_xml(&self) -> String {
        let refs: String = self
            .stories
            .iter()
            .map(|s| {
                format!(
                    r#"<w:{}Reference w:type="{}" r:id="{}"/>"#,
                    s.kind, s.ref_type, s.rel_id
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr>{}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            W_NS, R_NS, self.body, refs
        )
    }

    /// Build the package.
    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut overrides = String::new();
        for s in &self.stories {
            overrides.push_str(&format!(
                r#"<Override PartName="/word/{}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.{}+xml"/>"#,
                s.file, s.kind
            ));
        }
        add(
            &mut writer,
            "[Content_Types].xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>{}</Types>"#,
                overrides
            ),
            options,
        );
        add(
            &mut writer,
            "_rels/.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{0}/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#,
                REL_BASE
            ),
            options,
        );
        add(&mut writer, "word/document.xml", &self.document_xml(), options);

        let rels: String = self
            .stories
            .iter()
            .map(|s| {
                format!(
                    r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                    s.rel_id, REL_BASE, s.kind, s.file
                )
            })
            .collect();
        add(
            &mut writer,
            "word/_rels/document.xml.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/styles" Target="styles.xml"/>{}</Relationships>"#,
                REL_BASE, rels
            ),
            options,
        );
        add(
            &mut writer,
            "word/styles.xml",
            &format!(r#"<w:styles xmlns:w="{}"/>"#, W_NS),
            options,
        );

        for s in &self.stories {
            let root = if s.kind == "header" { "hdr" } else { "ftr" };
            add(
                &mut writer,
                &format!("word/{}", s.file),
                &format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{0} xmlns:w="{1}" xmlns:r="{2}">{3}</w:{0}>"#,
                    root, W_NS, R_NS, s.content
                ),
                options,
            );
        }

        let title = self
            .title
            .as_deref()
            .map(|t| format!("<dc:title>{}</dc:title>", escape(t)))
            .unwrap_or_default();
        add(
            &mut writer,
            "docProps/core.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">{}<dc:creator>docfill tests</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2024-05-01T08:30:00Z</dcterms:created></cp:coreProperties>"#,
                title
            ),
            options,
        );

        for (name, data) in &self.extra {
            writer.start_file(name.clone(), options).unwrap();
            writer.write_all(data).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}

fn add(writer: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, content: &str, options: SimpleFileOptions) {
    writer.start_file(name.to_string(), options).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
}

/// Read one entry of a package as bytes.
pub fn read_entry(package: &[u8], name: &str) -> Vec<u8> {
    let mut zip = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

/// Read one entry of a package as text.
pub fn read_part(package: &[u8], name: &str) -> String {
    String::from_utf8(read_entry(package, name)).unwrap()
}

/// Entry names of a package, in order.
pub fn entry_names(package: &[u8]) -> Vec<String> {
    let mut zip = ZipArchive::new(Cursor::new(package)).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}
