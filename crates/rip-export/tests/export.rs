//! Export trees and YAML text for the built-in types.

use rip_binary::{AssetReader, AssetWriter};
use rip_export::{
    ExportError, ExportNode, ExportOptions, Exporter, MappingStyle, Scalar, YAML_HEADER,
    YamlWriter, to_yaml,
};
use rip_model::{AssetObject, FileId, ObjectId, PPtr, Record, Value, Version};
use rip_resolve::Collection;
use rip_schema::{EngineError, SchemaCatalog, decode};

const PSR: &str = "ParticleSystemRenderer";
const SHARED_GUID: [u8; 16] = [0x11; 16];

fn v(text: &str) -> Version {
    text.parse().unwrap()
}

fn catalog() -> &'static SchemaCatalog {
    SchemaCatalog::builtin().unwrap()
}

/// Test-only mesh table reduced to a name and nested vertex data.
const REDUCED_MESH: &str = r#"
[[type]]
name = "VertexData"
fields = [
    { name = "m_CurrentChannels", kind = "u32" },
    { name = "m_VertexCount", kind = "u32" },
    { name = "m_Channels", kind = "array<ChannelInfo>" },
    { name = "m_DataSize", kind = "bytes" },
]
layout = [
    { read = "m_CurrentChannels", when = "current_channels" },
    { read = "m_VertexCount" },
    { read = "m_Channels" },
    { read = "m_DataSize" },
    { align = 4 },
]

[type.predicates]
current_channels = { until = "2018.1" }

[[type]]
name = "Mesh"
class_id = 43
fields = [
    { name = "m_Name", kind = "string" },
    { name = "m_VertexData", kind = "VertexData" },
]
layout = [{ read = "m_Name" }, { align = 4 }, { read = "m_VertexData" }]
"#;

fn mesh_catalog() -> SchemaCatalog {
    let reduced = SchemaCatalog::from_toml_str(REDUCED_MESH).unwrap();
    catalog().merged_with(&reduced).unwrap()
}

/// `level0` whose first dependency is `shared.assets`, which has a guid.
fn registry(version: Version) -> Collection {
    let mut collection = Collection::new();
    collection
        .add_file("level0", version)
        .add_dependency("shared.assets")
        .add_dependency("unknown.assets");
    collection
        .add_file("shared.assets", version)
        .set_guid(SHARED_GUID);
    collection
}

fn object(version: Version, path_id: i64, class_id: i32, data: Record) -> AssetObject {
    AssetObject {
        id: ObjectId::new(FileId(0), path_id),
        class_id: Some(class_id),
        version,
        data,
    }
}

/// Renderer bytes in the wire order of `version` (4.7 to 5.5).
fn renderer(version: Version) -> Vec<u8> {
    let at_least = |threshold: &str| version >= v(threshold);
    let mut w = AssetWriter::new(version);
    w.write_pptr(PPtr::new(0, 1)).unwrap();
    w.write_bool(true).unwrap();
    w.write_u8(1).unwrap();
    w.write_u8(0).unwrap();
    w.align4().unwrap();
    w.write_i32(1).unwrap();
    w.write_pptr(PPtr::new(1, 2100)).unwrap();
    if at_least("5.3") {
        w.write_u16(4).unwrap();
        w.write_u16(2).unwrap();
        w.write_f32(0.05).unwrap();
    } else {
        w.write_i32(4).unwrap();
    }
    for value in [0.5, 0.0, 0.25, 2.0, 0.0, 0.75] {
        w.write_f32(value).unwrap();
    }
    if at_least("5.3") {
        w.write_i32(1).unwrap();
        for value in [0.1, 0.2, 0.3] {
            w.write_f32(value).unwrap();
        }
    } else {
        w.write_i32(2).unwrap();
    }
    if at_least("5.5") {
        w.write_bool(true).unwrap();
        w.align4().unwrap();
        w.write_i32(0b0010_0111).unwrap();
    }
    for path_id in [4300, 4301, 4302] {
        w.write_pptr(PPtr::new(0, path_id)).unwrap();
    }
    w.write_pptr(PPtr::NULL).unwrap();
    w.into_inner()
}

fn export_renderer(version: &str, options: ExportOptions) -> String {
    let version = v(version);
    let bytes = renderer(version);
    let mut reader = AssetReader::new(&bytes, version);
    let data = decode(catalog(), PSR, &mut reader).unwrap();
    assert!(reader.is_at_end());

    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry).with_options(options);
    let document = exporter.export(&object(version, 500, 199, data)).unwrap();
    to_yaml([&document])
}

#[test]
fn test_renderer_5_5_document() {
    let yaml = export_renderer("5.5.0f3", ExportOptions::new());
    insta::assert_snapshot!(yaml, @r"
    %YAML 1.1
    %TAG !u! tag:unity3d.com,2011:
    --- !u!199 &500
    ParticleSystemRenderer:
      serializedVersion: 2
      m_GameObject: {fileID: 1}
      m_Enabled: 1
      m_CastShadows: 1
      m_ReceiveShadows: 0
      m_Materials:
      - {fileID: 2100, guid: 11111111111111111111111111111111, type: 2}
      m_RenderMode: 4
      m_SortMode: 2
      m_MinParticleSize: 0.05
      m_MaxParticleSize: 0.5
      m_CameraVelocityScale: 0
      m_VelocityScale: 0.25
      m_LengthScale: 2
      m_SortingFudge: 0
      m_NormalDirection: 0.75
      m_RenderAlignment: 1
      m_Pivot: {x: 0.1, y: 0.2, z: 0.3}
      m_UseCustomVertexStreams: 1
      m_VertexStreams: 00010205
      m_Mesh: {fileID: 4300}
      m_Mesh1: {fileID: 4301}
      m_Mesh2: {fileID: 4302}
      m_Mesh3: {fileID: 0}
      m_MaskInteraction: 0
    ");
}

#[test]
fn test_renderer_5_4_exports_default_streams() {
    let yaml = export_renderer("5.4.3f1", ExportOptions::new());
    assert!(yaml.contains("\n  serializedVersion: 1\n"));
    assert!(yaml.contains("\n  m_MinParticleSize: 0.05\n"));
    assert!(yaml.contains("\n  m_UseCustomVertexStreams: 0\n"));
    assert!(yaml.contains("\n  m_VertexStreams: 0001030405\n"));
}

#[test]
fn test_renderer_4_7_exports_derived_defaults() {
    let yaml = export_renderer("4.7.2f1", ExportOptions::new());
    assert!(yaml.contains("\n  m_MinParticleSize: 0\n"));
    // Mesh particles default to local alignment.
    assert!(yaml.contains("\n  m_RenderAlignment: 2\n"));
    assert!(yaml.contains("\n  m_Pivot: {x: 0, y: 0, z: 0}\n"));
    assert!(yaml.contains("\n  m_VertexStreams: 0001030405\n"));
}

#[test]
fn test_topmost_revision_option() {
    let yaml = export_renderer("5.4.3f1", ExportOptions::new().topmost_revision());
    assert!(yaml.contains("\n  serializedVersion: 4\n"));
}

#[test]
fn test_field_order_is_base_first() {
    let version = v("2017.1.0f3");
    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry);
    let document = exporter
        .export(&object(version, 1, 199, Record::new(PSR)))
        .unwrap();

    let keys = document.node.keys();
    assert_eq!(
        &keys[..6],
        &[
            "serializedVersion",
            "m_GameObject",
            "m_Enabled",
            "m_CastShadows",
            "m_ReceiveShadows",
            "m_Materials"
        ]
    );
    assert_eq!(keys.last(), Some(&"m_MaskInteraction"));
    assert_eq!(
        document.node.get("serializedVersion").and_then(ExportNode::as_scalar),
        Some(&Scalar::Int(4))
    );
    assert_eq!(
        document.node.get("m_VertexStreams"),
        Some(&ExportNode::bytes(&[0, 1, 3, 4, 5]))
    );
}

#[test]
fn test_game_object_document() {
    let version = v("5.6.1f1");
    let pair = |ptr| Value::Record(Record::new("ComponentPair").with("component", Value::PPtr(ptr)));
    let data = Record::new("GameObject")
        .with(
            "m_Component",
            Value::Array(vec![pair(PPtr::local(4)), pair(PPtr::new(2, 7))]),
        )
        .with("m_Layer", Value::Int(5))
        .with("m_Name", Value::String(String::new()))
        .with("m_Tag", Value::Int(3))
        .with("m_IsActive", Value::Bool(true));
    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry);
    let first = exporter.export(&object(version, 100, 1, data)).unwrap();
    let second = exporter
        .export(&object(version, 101, 1, Record::new("GameObject")))
        .unwrap();

    let mut writer = YamlWriter::new();
    writer.write_document(&first).unwrap();
    writer.write_document(&second).unwrap();
    let yaml = writer.into_inner();

    let expected = [
        YAML_HEADER,
        "--- !u!1 &100\n",
        "GameObject:\n",
        "  serializedVersion: 5\n",
        "  m_Component:\n",
        "  - component: {fileID: 4}\n",
        // The second dependency has no guid.
        "  - component: {fileID: 0}\n",
        "  m_Layer: 5\n",
        "  m_Name: \n",
        "  m_Tag: 3\n",
        "  m_IsActive: 1\n",
        "--- !u!1 &101\n",
        "GameObject:\n",
        "  serializedVersion: 5\n",
        "  m_Component: []\n",
        "  m_Layer: 0\n",
        "  m_Name: \n",
        "  m_Tag: 0\n",
        "  m_IsActive: 0\n",
    ]
    .concat();
    assert_eq!(yaml, expected);
}

#[test]
fn test_nested_block_records() {
    let version = v("2018.2.0f2");
    let channel = |format: i64, dimension: i64| {
        Value::Record(
            Record::new("ChannelInfo")
                .with("stream", Value::Int(0))
                .with("offset", Value::Int(0))
                .with("format", Value::Int(format))
                .with("dimension", Value::Int(dimension)),
        )
    };
    let vertex_data = Record::new("VertexData")
        .with("m_VertexCount", Value::Int(3))
        .with("m_Channels", Value::Array(vec![channel(0, 3), channel(2, 4)]))
        .with("m_DataSize", Value::Bytes(vec![0xDE, 0xAD]));
    let data = Record::new("Mesh")
        .with("m_Name", Value::String("Quad: 2".to_string()))
        .with("m_VertexData", Value::Record(vertex_data));
    let catalog = mesh_catalog();
    let registry = registry(version);
    let exporter = Exporter::new(&catalog, &registry);
    let document = exporter.export(&object(version, 4300, 43, data)).unwrap();

    let expected = [
        YAML_HEADER,
        "--- !u!43 &4300\n",
        "Mesh:\n",
        "  m_Name: 'Quad: 2'\n",
        "  m_VertexData:\n",
        "    m_CurrentChannels: 0\n",
        "    m_VertexCount: 3\n",
        "    m_Channels:\n",
        "    - stream: 0\n",
        "      offset: 0\n",
        "      format: 0\n",
        "      dimension: 3\n",
        "    - stream: 0\n",
        "      offset: 0\n",
        "      format: 2\n",
        "      dimension: 4\n",
        "    m_DataSize: dead\n",
    ]
    .concat();
    assert_eq!(to_yaml([&document]), expected);
}

#[test]
fn test_integers_export_at_declared_width() {
    let version = v("5.6.1f1");
    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry);
    let data = Record::new(PSR).with("m_RenderMode", Value::Int(0xFFFF));
    let document = exporter.export(&object(version, 1, 199, data)).unwrap();
    assert_eq!(
        document.node.get("m_RenderMode").and_then(ExportNode::as_scalar),
        Some(&Scalar::Int(-1))
    );
}

#[test]
fn test_export_errors() {
    let version = v("5.6.1f1");
    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry);

    let data = Record::new(PSR).with("m_Enabled", Value::Int(1));
    let err = exporter.export(&object(version, 1, 199, data)).unwrap_err();
    assert!(matches!(
        err,
        ExportError::ValueMismatch { ref field, expected: ref kind, .. }
            if field == "m_Enabled" && kind == "bool"
    ));

    let err = exporter
        .export(&object(version, 1, 1, Record::new("Unknown")))
        .unwrap_err();
    assert!(matches!(err, ExportError::Engine(EngineError::UnknownType { .. })));

    let old = v("3.4.0f5");
    let err = exporter
        .export(&object(old, 1, 1, Record::new("GameObject")))
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Engine(EngineError::UnsupportedVersion { .. })
    ));

    let mut embedded = object(version, 1, 0, Record::new("Vector3f"));
    embedded.class_id = None;
    assert!(matches!(
        exporter.export(&embedded),
        Err(ExportError::MissingClassId { .. })
    ));
}

#[test]
fn test_flow_records_stay_inline() {
    let version = v("5.6.1f1");
    let registry = registry(version);
    let exporter = Exporter::new(catalog(), &registry);
    let schema = catalog().get("Vector3f").unwrap();
    let pivot = Record::new("Vector3f").with("x", Value::Float(1e-7));
    let node = exporter
        .record_node(schema, &pivot, version, FileId(0))
        .unwrap();
    assert!(matches!(
        node,
        ExportNode::Mapping {
            style: MappingStyle::Flow,
            ..
        }
    ));
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["node"], "mapping");
    assert_eq!(json["style"], "flow");
}
