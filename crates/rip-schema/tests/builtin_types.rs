//! GameObject layout from the built-in table, and a reduced mesh table that
//! exercises nested records and channel descriptors.

use rip_binary::{AssetReader, AssetWriter};
use rip_model::{ChannelFormat, ChannelInfo, PPtr, Record, Version};
use rip_schema::{EngineError, SchemaCatalog, decode, encode};

fn v(text: &str) -> Version {
    text.parse().unwrap()
}

fn catalog() -> &'static SchemaCatalog {
    SchemaCatalog::builtin().unwrap()
}

/// Mesh reduced to its name and vertex data. Only meant for tests: the real
/// layout carries sub-meshes, blend shapes and more between the two.
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
supported = { since = "5.0" }
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

fn game_object(version: Version) -> Vec<u8> {
    let mut w = AssetWriter::new(version);
    w.write_i32(2).unwrap();
    w.write_pptr(PPtr::new(0, 4)).unwrap();
    w.write_pptr(PPtr::new(0, 199)).unwrap();
    w.write_u32(5).unwrap();
    w.write_string("Sparks").unwrap();
    w.align4().unwrap();
    w.write_u16(3).unwrap();
    w.write_bool(true).unwrap();
    w.align4().unwrap();
    w.into_inner()
}

#[test]
fn test_game_object() {
    let version = v("5.6.1f1");
    let bytes = game_object(version);
    let mut reader = AssetReader::new(&bytes, version);
    let record = decode(catalog(), "GameObject", &mut reader).unwrap();
    assert!(reader.is_at_end());

    assert_eq!(record.string("m_Name").unwrap(), "Sparks");
    assert_eq!(record.int("m_Layer").unwrap(), 5);
    assert_eq!(record.int("m_Tag").unwrap(), 3);
    assert!(record.bool("m_IsActive").unwrap());
    let components = record.array("m_Component").unwrap();
    assert_eq!(components.len(), 2);
    let second = components[1].as_record().unwrap();
    assert_eq!(second.type_name(), "ComponentPair");
    assert_eq!(second.pptr("component").unwrap(), PPtr::new(0, 199));

    let mut writer = AssetWriter::new(version);
    encode(catalog(), &record, &mut writer).unwrap();
    assert_eq!(writer.into_inner(), bytes);
}

/// A 5.4 object whose component pairs still lead with a class id.
fn game_object_with_class_ids(version: Version) -> Vec<u8> {
    let mut w = AssetWriter::new(version);
    w.write_i32(1).unwrap();
    w.write_i32(4).unwrap();
    w.write_pptr(PPtr::new(0, 2)).unwrap();
    w.write_u32(0).unwrap();
    w.write_string("Go").unwrap();
    w.align4().unwrap();
    w.write_u16(0).unwrap();
    w.write_bool(true).unwrap();
    w.align4().unwrap();
    w.into_inner()
}

#[test]
fn test_game_object_before_pair_layout_change_is_unsupported() {
    for version in [v("5.4.3f1"), v("3.4.2f1")] {
        let bytes = game_object_with_class_ids(version);
        let mut reader = AssetReader::new(&bytes, version);
        let err = decode(catalog(), "GameObject", &mut reader).unwrap_err();
        assert!(
            matches!(
                err,
                EngineError::UnsupportedVersion { ref type_name, offset: 0, .. }
                    if type_name == "GameObject"
            ),
            "{version}: {err}"
        );
        assert_eq!(reader.position(), 0);
    }

    let record = Record::new("GameObject");
    let mut writer = AssetWriter::new(v("5.4.3f1"));
    assert!(matches!(
        encode(catalog(), &record, &mut writer),
        Err(EngineError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_mesh_is_not_built_in() {
    let mut reader = AssetReader::new(&[], v("2018.2.0f2"));
    assert!(matches!(
        decode(catalog(), "Mesh", &mut reader),
        Err(EngineError::UnknownType { .. })
    ));
}

fn mesh(version: Version) -> Vec<u8> {
    let mut w = AssetWriter::new(version);
    w.write_string("Quad").unwrap();
    w.align4().unwrap();
    if version < v("2018.1") {
        w.write_u32(0b1011).unwrap();
    }
    w.write_u32(4).unwrap();
    w.write_i32(3).unwrap();
    // position, normal, color
    for (stream, offset, format, dimension) in [(0u8, 0u8, 0u8, 3u8), (0, 12, 0, 3), (1, 0, 2, 4)] {
        w.write_u8(stream).unwrap();
        w.write_u8(offset).unwrap();
        w.write_u8(format).unwrap();
        w.write_u8(dimension).unwrap();
    }
    w.write_byte_array(&[0xAB; 6]).unwrap();
    w.align4().unwrap();
    w.into_inner()
}

#[test]
fn test_mesh_channels() {
    let catalog = mesh_catalog();
    for version in [v("5.6.1f1"), v("2018.2.0f2")] {
        let bytes = mesh(version);
        let mut reader = AssetReader::new(&bytes, version);
        let record = decode(&catalog, "Mesh", &mut reader).unwrap();
        assert!(reader.is_at_end(), "{version}");

        let vertex_data = record.record("m_VertexData").unwrap();
        let expected_current = if version < v("2018.1") { 0b1011 } else { 0 };
        assert_eq!(
            vertex_data.int("m_CurrentChannels").unwrap(),
            expected_current
        );
        assert_eq!(vertex_data.int("m_VertexCount").unwrap(), 4);
        assert_eq!(vertex_data.bytes("m_DataSize").unwrap().len(), 6);

        let channels: Vec<ChannelInfo> = vertex_data
            .array("m_Channels")
            .unwrap()
            .iter()
            .map(|value| ChannelInfo::try_from(value.as_record().unwrap()).unwrap())
            .collect();
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[1].offset, 12);
        assert_eq!(channels[1].stride().unwrap(), 12);
        assert_eq!(channels[2].channel_format().unwrap(), ChannelFormat::Color);
        assert_eq!(channels[2].stride().unwrap(), 4);
        assert!(channels.iter().all(ChannelInfo::is_set));

        let mut writer = AssetWriter::new(version);
        encode(&catalog, &record, &mut writer).unwrap();
        assert_eq!(writer.into_inner(), bytes);
    }
}

#[test]
fn test_mesh_outside_declared_range() {
    let mut reader = AssetReader::new(&[], v("4.7.2f1"));
    assert!(matches!(
        decode(&mesh_catalog(), "Mesh", &mut reader),
        Err(EngineError::UnsupportedVersion { .. })
    ));
}
