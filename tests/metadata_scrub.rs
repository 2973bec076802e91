mod fixtures;

use fixtures::{PdfBuilder, SAMPLE_XMP};
use lopdf::{dictionary, Object, Stream};
use pdfprep::{
    Flag, MetadataCleaner, PdfDocument, PropertyInspector, StructureHandler, WarningCollector, WarningScope,
};
use pretty_assertions::assert_eq;

fn document(builder: PdfBuilder) -> PdfDocument {
    PdfDocument::from_document(builder.build().document)
}

#[test]
fn test_scrub_removes_every_metadata_source() {
    let mut doc = document(PdfBuilder::full());
    let inspector = PropertyInspector::new();
    let before = inspector.inspect(&doc);
    assert_eq!(before.title, "Quarterly numbers");
    assert_eq!(before.xmp_metadata, Flag::Yes);

    let xmp_id = doc.catalog().unwrap().get(b"Metadata").and_then(Object::as_reference).unwrap();
    let mut warnings = WarningCollector::new();
    let stats = MetadataCleaner::new().scrub(&mut doc, &mut warnings);

    assert!(stats.metadata_stream_removed);
    assert_eq!(stats.xmp_properties_removed, 2);
    assert!(stats.info_removed);
    assert_eq!(stats.legacy_keys_removed, 4);
    assert!(warnings.is_empty());

    let after = inspector.inspect(&doc);
    assert!(after.is_scrubbed());
    assert_eq!(after.author, "None");
    assert_eq!(after.xmp_metadata, Flag::No);

    // the orphaned packet is emptied too
    let stream = doc.document().get_object(xmp_id).and_then(Object::as_stream).unwrap();
    let text = String::from_utf8_lossy(&stream.content);
    assert!(!text.contains("Acme Writer"));
    assert!(!text.contains("Quarterly"));
}

#[test]
fn test_second_scrub_is_a_no_op() {
    let mut doc = document(PdfBuilder::full());
    let cleaner = MetadataCleaner::new();
    let mut warnings = WarningCollector::new();

    cleaner.scrub(&mut doc, &mut warnings);
    let again = cleaner.scrub(&mut doc, &mut warnings);

    assert!(!again.removed_anything());
}

const PAGE_XMP: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:xmpRights="http://ns.adobe.com/xap/1.0/rights/" xmpRights:Marked="True"><xmpRights:UsageTerms>PageRights</xmpRights:UsageTerms></rdf:Description></rdf:RDF></x:xmpmeta>"#;

fn object_table(doc: &PdfDocument) -> String {
    format!("{:?}", doc.document().objects)
}

#[test]
fn test_page_level_xmp_survives_repeated_scrubs() {
    let mut doc = document(PdfBuilder::full());
    let page_id = *doc.document().get_pages().values().next().unwrap();
    let page_xmp = doc.document_mut().add_object(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        PAGE_XMP.as_bytes().to_vec(),
    ));
    doc.document_mut()
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Metadata", page_xmp);

    let cleaner = MetadataCleaner::new();
    let mut warnings = WarningCollector::new();
    cleaner.scrub(&mut doc, &mut warnings);
    let after_once = object_table(&doc);

    let again = cleaner.scrub(&mut doc, &mut warnings);
    assert!(!again.removed_anything());
    assert_eq!(again.xmp_properties_removed, 0);
    assert_eq!(object_table(&doc), after_once);

    let stream = doc.document().get_object(page_xmp).and_then(Object::as_stream).unwrap();
    assert!(String::from_utf8_lossy(&stream.content).contains("PageRights"));
    assert!(warnings.is_empty());
}

#[test]
fn test_malformed_xmp_does_not_stop_the_scrub() {
    let mut doc = document(PdfBuilder::full().xmp("<x:xmpmeta><rdf:RDF></x:xmpmeta>"));
    let mut warnings = WarningCollector::new();
    let stats = MetadataCleaner::new().scrub(&mut doc, &mut warnings);

    assert_eq!(warnings.in_scope(WarningScope::Xmp).count(), 1);
    assert!(stats.metadata_stream_removed);
    assert_eq!(stats.xmp_properties_removed, 0);
    assert!(stats.info_removed);
    assert_eq!(stats.legacy_keys_removed, 4);
    assert!(PropertyInspector::new().inspect(&doc).is_scrubbed());
}

#[test]
fn test_document_without_metadata() {
    let mut doc = document(PdfBuilder::new());
    let mut warnings = WarningCollector::new();
    let stats = MetadataCleaner::new().scrub(&mut doc, &mut warnings);

    assert!(!stats.removed_anything());
    assert!(warnings.is_empty());
}

#[test]
fn test_xmp_only_document() {
    let mut doc = document(PdfBuilder::new().xmp(SAMPLE_XMP));
    let mut warnings = WarningCollector::new();
    let stats = MetadataCleaner::new().scrub(&mut doc, &mut warnings);

    assert!(stats.metadata_stream_removed);
    assert!(!stats.info_removed);
    assert_eq!(PropertyInspector::new().inspect(&doc).xmp_metadata, Flag::No);
}

#[test]
fn test_normalize_sets_catalog_and_drops_tags() {
    let mut doc = document(PdfBuilder::full());
    let mut warnings = WarningCollector::new();
    let stats = StructureHandler::new().normalize(&mut doc, 1, &mut warnings).unwrap();

    assert!(!stats.has_bookmarks);
    assert_eq!(stats.tag_markers_removed, 2);

    let snapshot = PropertyInspector::new().inspect(&doc);
    assert_eq!(snapshot.navigation_mode, "UseNone");
    assert_eq!(snapshot.page_layout, "SinglePage");
    assert_eq!(snapshot.tagged_pdf, Flag::No);
    assert!(snapshot.is_scrubbed());
    assert!(doc.catalog().unwrap().has(b"ViewerPreferences"));
}

#[test]
fn test_normalize_keeps_existing_viewer_preferences() {
    let mut doc = document(PdfBuilder::full());
    doc.catalog_mut().unwrap().set(
        "ViewerPreferences",
        dictionary! { "HideToolbar" => true, "Direction" => "R2L" },
    );

    let mut warnings = WarningCollector::new();
    let stats = StructureHandler::new().normalize(&mut doc, 1, &mut warnings).unwrap();
    assert!(!stats.viewer_preferences_created);

    let prefs = doc
        .catalog()
        .unwrap()
        .get(b"ViewerPreferences")
        .and_then(Object::as_dict)
        .unwrap();
    assert!(prefs.get(b"HideToolbar").and_then(Object::as_bool).unwrap());
    assert_eq!(prefs.get(b"Direction").and_then(Object::as_name).unwrap(), b"R2L");
}
