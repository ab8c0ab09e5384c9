//! Integration tests for signature feature reporting.

use lopdf::{dictionary, Document, Object, StringFormat};
use sapdf::features::{signatures, FeatureObjectType, SignatureFeaturesObject};
use sapdf::report::{to_json, JsonFormat};
use sapdf::{FeatureExtractionResult, FeaturesObject, LopdfSource};

/// A one-page PDF with a signed signature field and a text field.
fn signed_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![Object::Reference(page_id)],
        }),
    );

    let sig_id = doc.add_object(dictionary! {
        "Type" => "Sig",
        "Filter" => "Adobe.PPKLite",
        "SubFilter" => "adbe.pkcs7.detached",
        "Contents" => Object::String(vec![0xDE, 0xAD, 0xBE, 0xEF], StringFormat::Hexadecimal),
        "M" => Object::string_literal("D:20231231235959Z"),
        "Name" => Object::string_literal("Jane Signer"),
        "Location" => Object::string_literal("Seoul"),
    });
    let sig_field = doc.add_object(dictionary! {
        "FT" => "Sig",
        "T" => Object::string_literal("Signature1"),
        "V" => sig_id,
    });
    let text_field = doc.add_object(dictionary! {
        "FT" => "Tx",
        "T" => Object::string_literal("Comment"),
        "V" => Object::string_literal("hello"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => dictionary! {
            "Fields" => vec![Object::Reference(sig_field), Object::Reference(text_field)],
        },
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[test]
fn test_signature_feature_tree() {
    let source = LopdfSource::load_bytes(&signed_pdf()).unwrap();
    let found = signatures(&source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.as_deref(), Some("Jane Signer"));

    let object = SignatureFeaturesObject::new(found.into_iter().next());
    let mut result = FeatureExtractionResult::new();
    let tree = object.report_features(&mut result).unwrap().unwrap();

    let value = |name: &str| tree.child(name).and_then(|c| c.value.clone());
    assert_eq!(value("filter").as_deref(), Some("Adobe.PPKLite"));
    assert_eq!(value("subFilter").as_deref(), Some("adbe.pkcs7.detached"));
    assert_eq!(value("contents").as_deref(), Some("DEADBEEF"));
    assert_eq!(value("signDate").as_deref(), Some("2023-12-31T23:59:59+00:00"));
    assert_eq!(value("location").as_deref(), Some("Seoul"));
    assert!(value("reason").is_none());
    assert!(tree.attributes.contains_key("id"));
    assert_eq!(result.trees(FeatureObjectType::Signature), &[tree]);
}

#[test]
fn test_signature_data_serialization() {
    let source = LopdfSource::load_bytes(&signed_pdf()).unwrap();
    let object = SignatureFeaturesObject::new(signatures(&source).into_iter().next());

    let data = object.data().unwrap();
    let json: serde_json::Value = serde_json::from_str(&to_json(&data, JsonFormat::Compact).unwrap()).unwrap();
    assert_eq!(json["type"], "signature");
    assert_eq!(json["subFilter"], "adbe.pkcs7.detached");
    assert_eq!(json["contents"], "DEADBEEF");
}

#[test]
fn test_document_without_signatures() {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Count" => 0,
        "Kids" => Vec::<Object>::new(),
    });
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();

    let source = LopdfSource::load_bytes(&data).unwrap();
    assert!(signatures(&source).is_empty());

    let object = SignatureFeaturesObject::new(None);
    let result = FeatureExtractionResult::collect([&object as &dyn FeaturesObject]);
    assert!(result.trees(FeatureObjectType::Signature).is_empty());
    assert!(result.errors().is_empty());
}
