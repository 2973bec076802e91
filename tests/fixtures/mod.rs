//! Shared builders for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub const SAMPLE_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Quarterly numbers</rdf:li></rdf:Alt></dc:title>
      <pdf:Producer>Acme Writer 9</pdf:Producer>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

/// Bookmark tree description
#[derive(Debug, Clone)]
pub struct Bookmark {
    pub title: String,
    pub children: Vec<Bookmark>,
}

pub fn bookmark(title: &str, children: Vec<Bookmark>) -> Bookmark {
    Bookmark {
        title: title.to_string(),
        children,
    }
}

pub fn leaf(title: &str) -> Bookmark {
    bookmark(title, Vec::new())
}

/// One bookmark as written, in pre-order
#[derive(Debug, Clone, Copy)]
pub struct OutlineEntry {
    pub id: ObjectId,
    pub depth: u32,
    pub children: usize,
}

pub struct BuiltPdf {
    pub document: Document,
    pub outline_root: Option<ObjectId>,
    pub entries: Vec<OutlineEntry>,
}

impl BuiltPdf {
    pub fn entry(&self, index: usize) -> OutlineEntry {
        self.entries[index]
    }

    pub fn write_to(&mut self, path: &Path) -> PathBuf {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        self.document.save(path).unwrap();
        path.to_path_buf()
    }
}

#[derive(Debug, Default)]
pub struct PdfBuilder {
    outline: Option<Vec<Bookmark>>,
    info: Vec<(String, String)>,
    xmp: Option<String>,
    tagged: bool,
    page_mode: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document carrying every kind of metadata the normalizer touches
    pub fn full() -> Self {
        Self::new()
            .info("Title", "Quarterly numbers")
            .info("Author", "J. Doe")
            .info("Producer", "Acme Writer 9")
            .info("Creator", "Acme Office")
            .xmp(SAMPLE_XMP)
            .tagged()
            .page_mode("UseThumbs")
    }

    pub fn outline(mut self, top_level: Vec<Bookmark>) -> Self {
        self.outline = Some(top_level);
        self
    }

    pub fn info(mut self, key: &str, value: &str) -> Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    pub fn xmp(mut self, packet: &str) -> Self {
        self.xmp = Some(packet.to_string());
        self
    }

    pub fn tagged(mut self) -> Self {
        self.tagged = true;
        self
    }

    pub fn page_mode(mut self, mode: &str) -> Self {
        self.page_mode = Some(mode.to_string());
        self
    }

    pub fn build(self) -> BuiltPdf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content = Stream::new(Dictionary::new(), b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET".to_vec());
        let content_id = doc.add_object(content);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        };

        let mut entries = Vec::new();
        let mut outline_root = None;
        if let Some(top_level) = &self.outline {
            let root = doc.new_object_id();
            let (first, last) = write_level(&mut doc, top_level, root, 1, &mut entries);
            let mut root_dict = dictionary! { "Type" => "Outlines", "Count" => top_level.len() as i64 };
            if let (Some(first), Some(last)) = (first, last) {
                root_dict.set("First", first);
                root_dict.set("Last", last);
            }
            doc.objects.insert(root, Object::Dictionary(root_dict));
            catalog.set("Outlines", root);
            outline_root = Some(root);
        }

        if let Some(packet) = &self.xmp {
            let stream = Stream::new(
                dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
                packet.as_bytes().to_vec(),
            );
            let xmp_id = doc.add_object(stream);
            catalog.set("Metadata", xmp_id);
        }

        if self.tagged {
            let struct_root = doc.add_object(dictionary! { "Type" => "StructTreeRoot" });
            catalog.set("StructTreeRoot", struct_root);
            catalog.set("MarkInfo", dictionary! { "Marked" => true });
        }

        if let Some(mode) = &self.page_mode {
            catalog.set("PageMode", Object::Name(mode.as_bytes().to_vec()));
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in &self.info {
                info.set(key.as_bytes().to_vec(), Object::string_literal(value.as_str()));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        BuiltPdf {
            document: doc,
            outline_root,
            entries,
        }
    }
}

/// Write one sibling list; returns (first, last)
fn write_level(
    doc: &mut Document,
    items: &[Bookmark],
    parent: ObjectId,
    depth: u32,
    entries: &mut Vec<OutlineEntry>,
) -> (Option<ObjectId>, Option<ObjectId>) {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let id = ids[i];
        entries.push(OutlineEntry {
            id,
            depth,
            children: item.children.len(),
        });

        let mut dict = dictionary! {
            "Title" => Object::string_literal(item.title.as_str()),
            "Parent" => Object::Reference(parent),
        };
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }

        let (first, last) = write_level(doc, &item.children, id, depth + 1, entries);
        if let (Some(first), Some(last)) = (first, last) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.children.len() as i64);
        }
        doc.objects.insert(id, Object::Dictionary(dict));
    }

    (ids.first().copied(), ids.last().copied())
}

pub fn dict_of(doc: &Document, id: ObjectId) -> &Dictionary {
    doc.get_object(id).and_then(Object::as_dict).unwrap()
}

pub fn dict_of_mut(doc: &mut Document, id: ObjectId) -> &mut Dictionary {
    doc.get_object_mut(id).and_then(Object::as_dict_mut).unwrap()
}

pub fn count_of(doc: &Document, id: ObjectId) -> Option<i64> {
    dict_of(doc, id).get(b"Count").and_then(Object::as_i64).ok()
}

/// Three levels: Chapter 1 > Section 1.1 > Sub 1.1.1, plus a leaf Chapter 2
pub fn three_level_outline() -> Vec<Bookmark> {
    vec![
        bookmark("Chapter 1", vec![bookmark("Section 1.1", vec![leaf("Sub 1.1.1")])]),
        leaf("Chapter 2"),
    ]
}
