//! decode → encode byte identity for random records on both sides of each
//! predicate threshold.

use std::sync::OnceLock;

use proptest::prelude::*;
use rip_binary::{AssetReader, AssetWriter};
use rip_model::{PPtr, Record, Value, Version};
use rip_schema::{SchemaCatalog, decode, default_value, encode};

const SAMPLE: &str = r#"
[[type]]
name = "Sample"
supported = { since = "5.0" }
fields = [
    { name = "flag", kind = "bool" },
    { name = "mode", kind = "i16" },
    { name = "ratio", kind = "f32", default = 1.5 },
    { name = "label", kind = "string" },
    { name = "mask", kind = "bytes", default = [0, 2] },
    { name = "target", kind = "pptr" },
    { name = "counts", kind = "array<i32>" },
]
layout = [
    { read = "flag" },
    { align = 4 },
    { read = "mode", as = "u16", when = "new" },
    { read = "mode", as = "i32", when = "!new" },
    { read = "ratio", when = "late" },
    { read = "label" },
    { align = 4 },
    { bitmask = "mask", bits = 6, when = "new" },
    { read = "target" },
    { read = "counts" },
]

[type.predicates]
new = { since = "5.5" }
late = { since = "2017.1" }
"#;

/// Versions just below and at each threshold.
const VERSIONS: [&str; 6] = [
    "5.0.0f1",
    "5.4.6f3",
    "5.5.0a0",
    "5.6.1f1",
    "2017.1.0a0",
    "2019.4.1f1",
];

fn catalog() -> &'static SchemaCatalog {
    static CATALOG: OnceLock<SchemaCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| SchemaCatalog::from_toml_str(SAMPLE).unwrap())
}

proptest! {
    #[test]
    fn test_decode_encode_is_byte_identical(
        version in prop::sample::select(VERSIONS.to_vec()),
        flag in any::<bool>(),
        mode in 0..=i64::from(i16::MAX),
        ratio in any::<f32>().prop_filter("finite", |v| v.is_finite()),
        label in "[a-zA-Z0-9 _]{0,12}",
        mask in prop::sample::subsequence(vec![0u8, 1, 2, 3, 4, 5], 0..=6),
        file_id in any::<i32>(),
        path_id in any::<i64>(),
        counts in prop::collection::vec(any::<i32>(), 0..5),
    ) {
        let version: Version = version.parse().unwrap();
        let catalog = catalog();
        let schema = catalog.get("Sample").unwrap();
        let record = Record::new("Sample")
            .with("flag", Value::Bool(flag))
            .with("mode", Value::Int(mode))
            .with("ratio", Value::Float(ratio))
            .with("label", Value::String(label))
            .with("mask", Value::Bytes(mask))
            .with("target", Value::PPtr(PPtr::new(file_id, path_id)))
            .with(
                "counts",
                Value::Array(counts.into_iter().map(|c| Value::Int(i64::from(c))).collect()),
            );

        let mut writer = AssetWriter::new(version);
        encode(catalog, &record, &mut writer).unwrap();
        let bytes = writer.into_inner();

        let mut reader = AssetReader::new(&bytes, version);
        let decoded = decode(catalog, "Sample", &mut reader).unwrap();
        prop_assert!(reader.is_at_end());

        for decl in schema.fields() {
            let expected = if schema.is_present(decl.name(), &version) {
                record.get(decl.name()).cloned()
            } else {
                Some(default_value(catalog, decl, version, &decoded))
            };
            prop_assert_eq!(decoded.get(decl.name()).cloned(), expected, "{}", decl.name());
        }

        let mut writer = AssetWriter::new(version);
        encode(catalog, &decoded, &mut writer).unwrap();
        prop_assert_eq!(writer.into_inner(), bytes);
    }
}
