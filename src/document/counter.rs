//! Page and slide counting for Office Open XML packages.
//!
//! # Sources, in order of preference
//! - DOCX: `<Pages>` from `docProps/app.xml` (written by the authoring
//!   application), else an estimate from explicit breaks in
//!   `word/document.xml`
//! - PPTX: the slide id list in `ppt/presentation.xml`, else the slide parts
//!   present in the archive, else `<Slides>` from `docProps/app.xml`
//!
//! Every part is inflated under a size cap; a small download can expand to
//! an arbitrarily large part.

use roxmltree::{Document, Node};
use std::io::{Cursor, Read, Seek};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use super::FileType;

const APP_PROPERTIES: &str = "docProps/app.xml";
const DOCX_BODY: &str = "word/document.xml";
const PPTX_PRESENTATION: &str = "ppt/presentation.xml";

/// Default cap on the inflated size of one part (128 MiB).
pub const DEFAULT_MAX_PART_SIZE: u64 = 128 * 1024 * 1024;

/// Errors raised while counting pages of a package.
#[derive(Debug, Error)]
pub enum CountingError {
    /// Bytes are not a readable ZIP archive.
    #[error("invalid OOXML archive: {0}")]
    Archive(String),

    /// A part required for counting is absent.
    #[error("required part '{0}' not found in package")]
    MissingPart(&'static str),

    /// A part inflates past the configured cap.
    #[error("part '{part}' exceeds the maximum inflated size of {limit} bytes")]
    PartTooLarge { part: &'static str, limit: u64 },

    /// A part exists but is not well-formed XML.
    #[error("failed to parse {part}: {message}")]
    Xml { part: &'static str, message: String },
}

/// Computes the number of pages (DOCX) or slides (PPTX) of a document.
pub trait PageCounter: Send + Sync {
    fn count(&self, bytes: &[u8], file_type: FileType) -> Result<u32, CountingError>;
}

/// Counter reading the OOXML package directly.
#[derive(Debug, Clone, Copy)]
pub struct OfficePageCounter {
    max_part_size: u64,
}

impl OfficePageCounter {
    /// Counter refusing to inflate any part beyond `max_part_size` bytes.
    pub fn new(max_part_size: u64) -> Self {
        Self { max_part_size }
    }
}

impl Default for OfficePageCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PART_SIZE)
    }
}

impl PageCounter for OfficePageCounter {
    fn count(&self, bytes: &[u8], file_type: FileType) -> Result<u32, CountingError> {
        let archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| CountingError::Archive(e.to_string()))?;
        let mut package = Package {
            archive,
            max_part_size: self.max_part_size,
        };

        match file_type {
            FileType::Docx => count_docx_pages(&mut package),
            FileType::Pptx => count_pptx_slides(&mut package),
        }
    }
}

/// Archive plus the read limit applied to each part.
struct Package<R> {
    archive: ZipArchive<R>,
    max_part_size: u64,
}

impl<R: Read + Seek> Package<R> {
    /// Inflate a part as text, or `None` when the package lacks it.
    fn read_part(&mut self, name: &'static str) -> Result<Option<String>, CountingError> {
        let limit = self.max_part_size;
        let file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(CountingError::Archive(format!("failed to open {}: {}", name, e))),
        };

        // The declared size is advisory; the bounded read below is what holds.
        if file.size() > limit {
            return Err(CountingError::PartTooLarge { part: name, limit });
        }

        let mut content = String::new();
        file.take(limit.saturating_add(1))
            .read_to_string(&mut content)
            .map_err(|e| CountingError::Archive(format!("failed to read {}: {}", name, e)))?;

        if content.len() as u64 > limit {
            return Err(CountingError::PartTooLarge { part: name, limit });
        }
        Ok(Some(content))
    }

    /// Integer property from `docProps/app.xml`, if the part and element exist.
    fn app_property(&mut self, name: &str) -> Result<Option<u32>, CountingError> {
        let Some(xml) = self.read_part(APP_PROPERTIES)? else {
            return Ok(None);
        };
        let doc = parse_part(APP_PROPERTIES, &xml)?;

        Ok(doc
            .root_element()
            .descendants()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .and_then(|s| s.trim().parse::<u32>().ok()))
    }

    fn slide_part_count(&self) -> usize {
        self.archive.file_names().filter(|name| is_slide_part(name)).count()
    }
}

fn count_docx_pages<R: Read + Seek>(package: &mut Package<R>) -> Result<u32, CountingError> {
    if let Some(pages) = package.app_property("Pages")?.filter(|&p| p > 0) {
        return Ok(pages);
    }

    let xml = package.read_part(DOCX_BODY)?.ok_or(CountingError::MissingPart(DOCX_BODY))?;
    let doc = parse_part(DOCX_BODY, &xml)?;

    tracing::debug!("docProps/app.xml has no page count, estimating from breaks");
    Ok(estimate_docx_pages(doc.root_element()))
}

/// One page plus every explicit page break and non-continuous section break.
fn estimate_docx_pages(root: Node) -> u32 {
    let mut pages: u32 = 1;

    for node in root.descendants().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        let is_break = match name {
            "br" => attribute_local(node, "type") == Some("page"),
            "pageBreakBefore" => is_on(node),
            "sectPr" => {
                node.parent_element().map(|p| p.has_tag_name("pPr")).unwrap_or(false)
                    && !is_continuous_section(node)
            }
            _ => false,
        };
        if is_break {
            pages = pages.saturating_add(1);
        }
    }

    pages
}

fn is_continuous_section(sect_pr: Node) -> bool {
    sect_pr
        .children()
        .find(|n| n.has_tag_name("type"))
        .and_then(|n| attribute_local(n, "val"))
        == Some("continuous")
}

/// OOXML toggle properties are on unless `val` says otherwise.
fn is_on(node: Node) -> bool {
    !matches!(attribute_local(node, "val"), Some("0" | "false" | "off"))
}

fn attribute_local<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes().find(|a| a.name() == name).map(|a| a.value())
}

fn count_pptx_slides<R: Read + Seek>(package: &mut Package<R>) -> Result<u32, CountingError> {
    if let Some(xml) = package.read_part(PPTX_PRESENTATION)? {
        let doc = parse_part(PPTX_PRESENTATION, &xml)?;
        let slides = doc
            .root_element()
            .descendants()
            .find(|n| n.has_tag_name("sldIdLst"))
            .map(|list| list.children().filter(|n| n.has_tag_name("sldId")).count());
        if let Some(slides) = slides {
            return Ok(to_count(slides));
        }
        tracing::debug!("presentation has no slide id list, counting slide parts");
    }

    let slide_parts = package.slide_part_count();
    if slide_parts > 0 {
        return Ok(to_count(slide_parts));
    }

    package
        .app_property("Slides")?
        .ok_or(CountingError::MissingPart(PPTX_PRESENTATION))
}

/// Matches `ppt/slides/slide<N>.xml`, not layouts, masters or rels.
fn is_slide_part(name: &str) -> bool {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn to_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn parse_part<'a>(part: &'static str, xml: &'a str) -> Result<Document<'a>, CountingError> {
    Document::parse(xml).map_err(|e| CountingError::Xml {
        part,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn app_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"
            xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">{}</Properties>"#,
            body
        )
    }

    fn document_xml(body: &str) -> String {
        format!(r#"<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#, W_NS, body)
    }

    #[test]
    fn docx_pages_from_app_properties() {
        let bytes = package(&[
            (APP_PROPERTIES, app_xml("<Application>Microsoft Office Word</Application><Pages>12</Pages>").as_str()),
            (DOCX_BODY, document_xml("<w:p/>").as_str()),
        ]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap(), 12);
    }

    #[test]
    fn docx_estimate_counts_breaks() {
        let body = r#"
            <w:p><w:r><w:t>one</w:t><w:br w:type="page"/></w:r></w:p>
            <w:p><w:pPr><w:pageBreakBefore/></w:pPr></w:p>
            <w:p><w:pPr><w:pageBreakBefore w:val="false"/></w:pPr></w:p>
            <w:p><w:r><w:br/></w:r></w:p>
            <w:p><w:pPr><w:sectPr><w:type w:val="nextPage"/></w:sectPr></w:pPr></w:p>
            <w:p><w:pPr><w:sectPr><w:type w:val="continuous"/></w:sectPr></w:pPr></w:p>
            <w:sectPr/>
        "#;
        let bytes = package(&[(DOCX_BODY, document_xml(body).as_str())]);

        // 1 + page break + pageBreakBefore + nextPage section
        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap(), 4);
    }

    #[test]
    fn docx_zero_pages_property_falls_back_to_estimate() {
        let bytes = package(&[
            (APP_PROPERTIES, app_xml("<Pages>0</Pages>").as_str()),
            (DOCX_BODY, document_xml("<w:p/>").as_str()),
        ]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap(), 1);
    }

    #[test]
    fn docx_without_body_is_missing_part() {
        let bytes = package(&[("[Content_Types].xml", "<Types/>")]);

        let err = OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap_err();
        assert!(matches!(err, CountingError::MissingPart(DOCX_BODY)));
    }

    #[test]
    fn pptx_slides_from_presentation() {
        let presentation = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
            <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
            <p:sldIdLst>
                <p:sldId id="256" r:id="rId2"/>
                <p:sldId id="257" r:id="rId3"/>
                <p:sldId id="258" r:id="rId4"/>
            </p:sldIdLst>
        </p:presentation>"#;
        let bytes = package(&[
            (PPTX_PRESENTATION, presentation),
            // Orphaned part not referenced by the presentation.
            ("ppt/slides/slide9.xml", "<p:sld/>"),
            (APP_PROPERTIES, app_xml("<Slides>7</Slides>").as_str()),
        ]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap(), 3);
    }

    #[test]
    fn pptx_empty_slide_list_is_zero() {
        let presentation = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst/></p:presentation>"#;
        let bytes = package(&[(PPTX_PRESENTATION, presentation)]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap(), 0);
    }

    #[test]
    fn pptx_without_slide_list_uses_parts() {
        let presentation = r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;
        let bytes = package(&[
            (PPTX_PRESENTATION, presentation),
            ("ppt/slides/slide1.xml", "<p:sld/>"),
        ]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap(), 1);
    }

    #[test]
    fn pptx_slides_from_parts() {
        let bytes = package(&[
            ("ppt/slides/slide1.xml", "<p:sld/>"),
            ("ppt/slides/slide2.xml", "<p:sld/>"),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ("ppt/slideLayouts/slideLayout1.xml", "<p:sldLayout/>"),
        ]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap(), 2);
    }

    #[test]
    fn pptx_slides_from_app_properties() {
        let bytes = package(&[(APP_PROPERTIES, app_xml("<Slides>5</Slides>").as_str())]);

        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap(), 5);
    }

    #[test]
    fn pptx_without_any_source_is_missing_part() {
        let bytes = package(&[("[Content_Types].xml", "<Types/>")]);

        let err = OfficePageCounter::default().count(&bytes, FileType::Pptx).unwrap_err();
        assert!(matches!(err, CountingError::MissingPart(PPTX_PRESENTATION)));
    }

    #[test]
    fn non_zip_bytes_are_archive_errors() {
        let err = OfficePageCounter::default().count(b"plain text, not a package", FileType::Pptx).unwrap_err();
        assert!(matches!(err, CountingError::Archive(_)));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let bytes = package(&[(APP_PROPERTIES, "<Properties><Pages>3</Properties>")]);

        let err = OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap_err();
        assert!(matches!(err, CountingError::Xml { part: APP_PROPERTIES, .. }));
    }

    #[test]
    fn oversized_part_is_refused() {
        let filler = format!("<w:p>{}</w:p>", "x".repeat(4096));
        let bytes = package(&[(DOCX_BODY, document_xml(&filler).as_str())]);

        let err = OfficePageCounter::new(1024).count(&bytes, FileType::Docx).unwrap_err();
        assert!(matches!(err, CountingError::PartTooLarge { part: DOCX_BODY, limit: 1024 }));

        // Same package counts under the default cap.
        assert_eq!(OfficePageCounter::default().count(&bytes, FileType::Docx).unwrap(), 1);
    }

    #[test]
    fn part_at_the_cap_is_read() {
        let presentation = r#"<p:presentation xmlns:p="p"><p:sldIdLst><p:sldId/></p:sldIdLst></p:presentation>"#;
        let bytes = package(&[(PPTX_PRESENTATION, presentation)]);
        let exact = presentation.len() as u64;

        assert_eq!(OfficePageCounter::new(exact).count(&bytes, FileType::Pptx).unwrap(), 1);
        assert!(matches!(
            OfficePageCounter::new(exact - 1).count(&bytes, FileType::Pptx),
            Err(CountingError::PartTooLarge { .. })
        ));
    }

    #[test]
    fn slide_part_names() {
        assert!(is_slide_part("ppt/slides/slide1.xml"));
        assert!(is_slide_part("ppt/slides/slide12.xml"));
        assert!(!is_slide_part("ppt/slides/slide.xml"));
        assert!(!is_slide_part("ppt/slides/_rels/slide1.xml.rels"));
        assert!(!is_slide_part("ppt/slideLayouts/slideLayout1.xml"));
    }
}
