//! Digital signature features.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{FeatureExtractionResult, FeatureObjectType, FeatureTreeNode, FeaturesData, FeaturesObject};
use crate::cos::{CosDict, CosObject, ObjectKey, ObjectSource};
use crate::error::{Error, Result};

static PDF_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:D:)?(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(?:([Zz+\-])(?:(\d{2})'?(?:(\d{2})'?)?)?)?$",
    )
    .unwrap()
});

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Missing fields default to the start of the period; a missing offset is
/// taken as UTC.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let caps = PDF_DATE.captures(s.trim())?;
    let field = |i: usize, default: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(2, 1)?, field(3, 1)?)?;
    let time = date.and_hms_opt(field(4, 0)?, field(5, 0)?, field(6, 0)?)?;

    let offset_seconds = match caps.get(7).map(|m| m.as_str()) {
        Some("+") | Some("-") => {
            let sign = if caps.get(7)?.as_str() == "-" { -1 } else { 1 };
            let hours = field(8, 0)? as i32;
            let minutes = field(9, 0)? as i32;
            sign * (hours * 3600 + minutes * 60)
        }
        _ => 0,
    };
    let offset = FixedOffset::east_opt(offset_seconds)?;
    time.and_local_timezone(offset).single()
}

/// A signature dictionary (the `/V` of a signature field).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdSignature {
    pub key: Option<ObjectKey>,
    pub filter: Option<String>,
    pub sub_filter: Option<String>,
    pub contents: Option<Vec<u8>>,
    pub name: Option<String>,
    /// Raw `/M` date string
    pub sign_date: Option<String>,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub contact_info: Option<String>,
}

impl PdSignature {
    pub fn from_dict<S: ObjectSource + ?Sized>(
        source: &S,
        key: Option<ObjectKey>,
        dict: &CosDict,
    ) -> Self {
        let text = |key: &str| source.get_resolved(dict, key).and_then(|v| v.as_text());
        let name_of = |key: &str| {
            source
                .get_resolved(dict, key)
                .and_then(|v| v.as_name().map(str::to_string))
        };
        Self {
            key,
            filter: name_of("Filter"),
            sub_filter: name_of("SubFilter"),
            contents: source
                .get_resolved(dict, "Contents")
                .and_then(|c| c.as_bytes().map(<[u8]>::to_vec)),
            name: text("Name"),
            sign_date: text("M"),
            location: text("Location"),
            reason: text("Reason"),
            contact_info: text("ContactInfo"),
        }
    }

    /// `/Contents` as upper-case hex.
    pub fn contents_hex(&self) -> Option<String> {
        self.contents
            .as_ref()
            .map(|bytes| bytes.iter().map(|b| format!("{:02X}", b)).collect())
    }
}

/// Signatures of all signed signature fields of the interactive form.
pub fn signatures<S: ObjectSource + ?Sized>(source: &S) -> Vec<PdSignature> {
    let mut result = Vec::new();
    let Some(fields) = source
        .catalog()
        .and_then(|c| source.get_resolved(&c, "AcroForm"))
        .and_then(|f| f.as_dict().cloned())
        .and_then(|f| source.get_resolved(&f, "Fields"))
    else {
        return result;
    };
    let mut visited = HashSet::new();
    if let Some(fields) = fields.as_array() {
        for field in fields {
            collect_signatures(source, field, None, &mut visited, &mut result);
        }
    }
    result
}

fn collect_signatures<S: ObjectSource + ?Sized>(
    source: &S,
    field: &CosObject,
    inherited_type: Option<&str>,
    visited: &mut HashSet<ObjectKey>,
    result: &mut Vec<PdSignature>,
) {
    if let Some(key) = field.as_reference() {
        if !visited.insert(key) {
            return;
        }
    }
    let Some(dict) = source.resolve_dict(field) else {
        return;
    };
    let field_type = dict.get_name("FT").or(inherited_type);

    if field_type == Some("Sig") {
        if let Some(value) = dict.get("V") {
            if let Some(signature) = source.resolve_dict(value) {
                result.push(PdSignature::from_dict(source, value.as_reference(), &signature));
            }
        }
    }

    if let Some(CosObject::Array(kids)) = source.get_resolved(&dict, "Kids") {
        for kid in kids.iter() {
            collect_signatures(source, kid, field_type, visited, result);
        }
    }
}

/// Structured signature data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureFeaturesData {
    pub contents: Option<String>,
    pub filter: Option<String>,
    pub sub_filter: Option<String>,
    pub name: Option<String>,
    pub sign_date: Option<DateTime<FixedOffset>>,
    pub location: Option<String>,
    pub reason: Option<String>,
    pub contact_info: Option<String>,
}

/// Feature object for one (possibly absent) signature.
#[derive(Debug, Clone, Default)]
pub struct SignatureFeaturesObject {
    signature: Option<PdSignature>,
}

impl SignatureFeaturesObject {
    pub fn new(signature: Option<PdSignature>) -> Self {
        Self { signature }
    }
}

impl FeaturesObject for SignatureFeaturesObject {
    fn object_type(&self) -> FeatureObjectType {
        FeatureObjectType::Signature
    }

    fn report_features(
        &self,
        result: &mut FeatureExtractionResult,
    ) -> Result<Option<FeatureTreeNode>> {
        let Some(signature) = &self.signature else {
            return Ok(None);
        };

        let sign_date = match &signature.sign_date {
            Some(raw) => Some(parse_pdf_date(raw).ok_or_else(|| {
                Error::FeatureParsing(format!("invalid signature date: {}", raw))
            })?),
            None => None,
        };

        let mut root = FeatureTreeNode::root("signature");
        if let Some((number, generation)) = signature.key {
            root.set_attribute("id", format!("sig{}_{}", number, generation));
        }
        root.add_not_empty("filter", signature.filter.clone());
        root.add_not_empty("subFilter", signature.sub_filter.clone());
        root.add_not_empty("contents", signature.contents_hex());
        root.add_not_empty("name", signature.name.clone());
        root.add_not_empty("signDate", sign_date.map(|d| d.to_rfc3339()));
        root.add_not_empty("location", signature.location.clone());
        root.add_not_empty("reason", signature.reason.clone());
        root.add_not_empty("contactInfo", signature.contact_info.clone());

        result.add_feature_tree(FeatureObjectType::Signature, root.clone());
        Ok(Some(root))
    }

    fn data(&self) -> Option<FeaturesData> {
        let signature = self.signature.as_ref()?;
        Some(FeaturesData::Signature(SignatureFeaturesData {
            contents: signature.contents_hex(),
            filter: signature.filter.clone(),
            sub_filter: signature.sub_filter.clone(),
            name: signature.name.clone(),
            sign_date: signature.sign_date.as_deref().and_then(parse_pdf_date),
            location: signature.location.clone(),
            reason: signature.reason.clone(),
            contact_info: signature.contact_info.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::MemorySource;
    use chrono::{Datelike, Timelike};

    fn signature_dict() -> CosDict {
        CosDict::new()
            .with("Type", CosObject::name("Sig"))
            .with("Filter", CosObject::name("Adobe.PPKLite"))
            .with("SubFilter", CosObject::name("adbe.pkcs7.detached"))
            .with("Contents", CosObject::string([0x30u8, 0x82, 0x0A]))
            .with("M", CosObject::string("D:20240115103045+01'00'"))
            .with("Reason", CosObject::string("Approval"))
    }

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045+01'00'").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));
        assert_eq!(date.hour(), 10);
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 1));
        assert_eq!(date.offset().local_minus_utc(), 0);
        assert!(parse_pdf_date("D:20241345").is_none());
        assert!(parse_pdf_date("yesterday").is_none());
    }

    #[test]
    fn test_report_features() {
        let source = MemorySource::new();
        let signature = PdSignature::from_dict(&source, Some((12, 0)), &signature_dict());
        let object = SignatureFeaturesObject::new(Some(signature));

        let mut result = FeatureExtractionResult::new();
        let tree = object.report_features(&mut result).unwrap().unwrap();
        assert_eq!(tree.name, "signature");
        assert_eq!(tree.attributes.get("id").map(String::as_str), Some("sig12_0"));
        assert_eq!(tree.child("filter").and_then(|c| c.value.as_deref()), Some("Adobe.PPKLite"));
        assert_eq!(tree.child("contents").and_then(|c| c.value.as_deref()), Some("30820A"));
        assert_eq!(
            tree.child("signDate").and_then(|c| c.value.as_deref()),
            Some("2024-01-15T10:30:45+01:00")
        );
        assert!(tree.child("location").is_none());
        assert_eq!(result.trees(FeatureObjectType::Signature).len(), 1);
    }

    #[test]
    fn test_absent_signature_reports_nothing() {
        let object = SignatureFeaturesObject::new(None);
        let mut result = FeatureExtractionResult::new();
        assert!(object.report_features(&mut result).unwrap().is_none());
        assert!(object.data().is_none());
        assert!(result.trees(FeatureObjectType::Signature).is_empty());
    }

    #[test]
    fn test_invalid_date_is_a_parsing_error() {
        let source = MemorySource::new();
        let dict = signature_dict().with("M", CosObject::string("not a date"));
        let object = SignatureFeaturesObject::new(Some(PdSignature::from_dict(&source, None, &dict)));

        let mut result = FeatureExtractionResult::new();
        assert!(matches!(
            object.report_features(&mut result),
            Err(Error::FeatureParsing(_))
        ));
        let collected = FeatureExtractionResult::collect([&object as &dyn FeaturesObject]);
        assert_eq!(collected.errors().len(), 1);
    }

    #[test]
    fn test_signatures_from_acroform() {
        let mut source = MemorySource::new();
        let value = source.add(signature_dict());
        let parent = source.reserve();
        let widget = source.add(
            CosDict::new()
                .with("Parent", CosObject::Reference(parent))
                .with("V", CosObject::Reference(value)),
        );
        source.insert(
            parent,
            CosDict::new()
                .with("FT", CosObject::name("Sig"))
                .with("T", CosObject::string("Signature1"))
                .with("Kids", CosObject::array(vec![CosObject::Reference(widget)])),
        );
        let text_field = source.add(
            CosDict::new()
                .with("FT", CosObject::name("Tx"))
                .with("V", CosObject::string("hello")),
        );
        source.set_catalog_entry(
            "AcroForm",
            CosDict::new().with(
                "Fields",
                CosObject::array(vec![CosObject::Reference(parent), CosObject::Reference(text_field)]),
            ),
        );

        let found = signatures(&source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, Some(value));
        assert_eq!(found[0].reason.as_deref(), Some("Approval"));

        let data = SignatureFeaturesObject::new(found.into_iter().next()).data().unwrap();
        let FeaturesData::Signature(data) = data;
        assert_eq!(data.sub_filter.as_deref(), Some("adbe.pkcs7.detached"));
        assert!(data.sign_date.is_some());
    }
}
