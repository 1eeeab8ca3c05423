//! In-memory PDF builders shared by unit and integration tests.
//! Page N draws the text "Page N".

use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

fn media_box() -> Object {
    Object::Array(
        [0, 0, 612, 792]
            .iter()
            .map(|&n| Object::Integer(n))
            .collect(),
    )
}

/// Pages with the given kids order; `kids[i]` indexes the created page objects
fn build_with_kids(num_pages: u32, kids: &[usize]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let page_ids: Vec<ObjectId> = (1..=num_pages)
        .map(|n| {
            let text = format!("BT\n/F1 12 Tf\n100 700 Td\n(Page {}) Tj\nET", n);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), text.into_bytes()));
            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("MediaBox", media_box());
            page.set("Contents", Object::Reference(content_id));
            doc.add_object(page)
        })
        .collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set(
        "Kids",
        Object::Array(kids.iter().map(|&i| Object::Reference(page_ids[i])).collect()),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

fn build(num_pages: u32) -> Document {
    let kids: Vec<usize> = (0..num_pages as usize).collect();
    build_with_kids(num_pages, &kids)
}

fn save(doc: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    save(&mut build(num_pages))
}

/// Test PDF with an Info dictionary holding the given entries
pub fn with_info(num_pages: u32, entries: &[(&str, &str)]) -> Vec<u8> {
    let mut doc = build(num_pages);
    let mut info = Dictionary::new();
    for (key, value) in entries {
        info.set(*key, Object::string_literal(*value));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
    save(&mut doc)
}

/// Page tree listing page 1 a second time after page 2: `[p1, p2, p1]`
pub fn with_repeated_page() -> Vec<u8> {
    save(&mut build_with_kids(2, &[0, 1, 0]))
}

/// RC4-128 encrypted test PDF that opens with an empty user password
pub fn encrypted_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = build(num_pages);
    let file_id = Object::string_literal(b"docsplit-fixture".to_vec());
    doc.trailer
        .set("ID", Object::Array(vec![file_id.clone(), file_id]));

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password: "",
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    save(&mut doc)
}

/// Test PDF padded with an unreferenced filler stream until it is exactly `target` bytes
pub fn padded_to(num_pages: u32, target: usize) -> Vec<u8> {
    let base = create_test_pdf(num_pages).len();
    let mut filler = target.saturating_sub(base + 64);
    for _ in 0..4 {
        let mut doc = build(num_pages);
        doc.add_object(Stream::new(Dictionary::new(), vec![b'0'; filler]));
        let bytes = save(&mut doc);
        if bytes.len() == target {
            return bytes;
        }
        filler = (filler as isize + target as isize - bytes.len() as isize) as usize;
    }
    panic!("could not pad test PDF to {} bytes", target);
}

/// Decoded content of every page, in page order
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

/// Page numbers recovered from the "(Page N)" marker of every page
pub fn page_numbers(bytes: &[u8]) -> Vec<u32> {
    page_texts(bytes)
        .iter()
        .map(|text| {
            let start = text.find("(Page ").unwrap() + "(Page ".len();
            let end = start + text[start..].find(')').unwrap();
            text[start..end].parse().unwrap()
        })
        .collect()
}
