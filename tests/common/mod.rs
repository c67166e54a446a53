#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

pub const ADVICE_PAGE: &[&str] = &[
    "Supplier  Name  Ref  Supplier No.  Date",
    "Supplier  Acme Co  No.  SUP-001  Date: 2024-01-01",
    "Remittance",
    "Payment Document: PD-9  Currency:  USD",
    "Details",
    "Invoice Document  Invoice Number  Invoice Date  Gross Amount  Discount Amount  Net Amount",
    "Document  Number  Date  Gross  Discount  Net",
    "Ref  No  Date  EUR  EUR  EUR",
    "INV-1  INV-100  2024-01-02  1,000.00  0.00  1,000.00",
    "INV-2  INV-101  2024-01-03  250.50  0.50  250.00",
    "Sum Total  -  -  1,250.50  0.50  1,250.00",
];

pub const CONTINUATION_PAGE: &[&str] = &[
    "Invoice Document  Invoice Number  Invoice Date  Gross Amount  Discount Amount  Net Amount",
    "Document  Number  Date  Gross  Discount  Net",
    "Ref  No  Date  EUR  EUR  EUR",
    "Balance carry forward  -  -  1,250.50  0.50  1,250.00",
    "INV-3  INV-102  2024-01-04  99.50  0.00  99.50",
];

/// Tabula JSON for the reference advice: header, payment and line-item grids.
pub const ADVICE_TABULA_JSON: &str = r#"[
  {"extraction_method":"lattice","page_number":1,"data":[
    [{"text":"Supplier"},{"text":"Name"},{"text":""},{"text":"Supplier No."},{"text":"Date"}],
    [{"text":""},{"text":"Acme Co"},{"text":""},{"text":"SUP-001"},{"text":"2024-01-01"}]]},
  {"extraction_method":"lattice","page_number":1,"data":[
    [{"text":"Payment Document: PD-9"},{"text":""},{"text":"USD"}]]},
  {"extraction_method":"lattice","page_number":1,"data":[
    [{"text":"h0"},{"text":"h1"},{"text":"h2"}],
    [{"text":"h0"},{"text":"h1"},{"text":"h2"}],
    [{"text":"h0"},{"text":"h1"},{"text":"h2"}],
    [{"text":""},{"text":""},{"text":""},{"text":"INV-1"},{"text":"INV-100"},
     {"text":"2024-01-02"},{"text":"100.00"},{"text":"0"},{"text":"100.00"}],
    [{"text":""},{"text":""},{"text":""},{"text":"INV-2"},{"text":"INV-101"},
     {"text":"2024-01-03"},{"text":"oops"},{"text":"0"},{"text":"5.00"}]]}
]"#;

fn page_content(lines: &[&str]) -> Result<Vec<u8>, lopdf::Error> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 9.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![36.into(), 800.into()]),
    ];

    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));

    Content { operations }.encode()
}

fn add_page(
    doc: &mut Document,
    parent: ObjectId,
    lines: &[&str],
) -> Result<ObjectId, lopdf::Error> {
    let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(lines)?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Writes a PDF with one Courier text line per entry, one page per slice.
pub fn write_text_pdf(path: &Path, pages: &[&[&str]]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let page_ids = pages
        .iter()
        .map(|lines| add_page(&mut doc, pages_id, lines))
        .collect::<Result<Vec<_>, _>>()?;

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<Object>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(path)?;
    Ok(())
}
