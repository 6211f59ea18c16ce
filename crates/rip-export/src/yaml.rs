//! Byte-exact YAML rendering of export documents.

use std::fmt::{self, Write};

use crate::exporter::ExportDocument;
use crate::format::format_scalar;
use crate::node::{ExportNode, MappingStyle, Scalar, SequenceStyle};

/// Stream header written once before the first document.
pub const YAML_HEADER: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

const INDENT: usize = 2;

/// Writes export documents as one YAML stream.
///
/// Block mappings indent two spaces per level; block sequence items sit at
/// the indentation of the key that owns them.
#[derive(Debug, Default)]
pub struct YamlWriter<W: Write = String> {
    out: W,
    started: bool,
}

impl YamlWriter<String> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<W: Write> YamlWriter<W> {
    pub const fn from_writer(out: W) -> Self {
        Self {
            out,
            started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Append one document, writing the stream header first if needed.
    pub fn write_document(&mut self, document: &ExportDocument) -> fmt::Result {
        if !self.started {
            self.out.write_str(YAML_HEADER)?;
            self.started = true;
        }
        writeln!(
            self.out,
            "--- !u!{} &{}",
            document.class_id, document.path_id
        )?;
        self.write_entry(&document.root_name, &document.node, 0)
    }

    fn write_entry(&mut self, key: &str, node: &ExportNode, indent: usize) -> fmt::Result {
        write_spaces(&mut self.out, indent)?;
        self.write_keyed(key, node, indent)
    }

    /// Write `key: value` from the current column; nested lines indent
    /// relative to `indent`.
    fn write_keyed(&mut self, key: &str, node: &ExportNode, indent: usize) -> fmt::Result {
        match node {
            ExportNode::Mapping {
                style: MappingStyle::Block,
                entries,
            } if !entries.is_empty() => {
                self.out.write_str(key)?;
                self.out.write_str(":\n")?;
                for (name, child) in entries {
                    self.write_entry(name, child, indent + INDENT)?;
                }
                Ok(())
            }
            ExportNode::Sequence {
                style: SequenceStyle::Block,
                items,
            } if !items.is_empty() => {
                self.out.write_str(key)?;
                self.out.write_str(":\n")?;
                for item in items {
                    self.write_item(item, indent)?;
                }
                Ok(())
            }
            _ => {
                self.out.write_str(key)?;
                self.out.write_str(": ")?;
                write_inline(&mut self.out, node, false)?;
                self.out.write_char('\n')
            }
        }
    }

    /// Write one `- item` of a block sequence at `indent`. Nested sequences
    /// use the flow form.
    fn write_item(&mut self, item: &ExportNode, indent: usize) -> fmt::Result {
        write_spaces(&mut self.out, indent)?;
        self.out.write_str("- ")?;
        match item {
            ExportNode::Mapping {
                style: MappingStyle::Block,
                entries,
            } if !entries.is_empty() => {
                let nested = indent + INDENT;
                for (position, (name, child)) in entries.iter().enumerate() {
                    if position > 0 {
                        write_spaces(&mut self.out, nested)?;
                    }
                    self.write_keyed(name, child, nested)?;
                }
                Ok(())
            }
            _ => {
                write_inline(&mut self.out, item, false)?;
                self.out.write_char('\n')
            }
        }
    }
}

/// Render a whole stream of documents.
pub fn to_yaml<'d>(documents: impl IntoIterator<Item = &'d ExportDocument>) -> String {
    let mut writer = YamlWriter::new();
    for document in documents {
        // Writing into a String cannot fail.
        let _ = writer.write_document(document);
    }
    writer.into_inner()
}

fn write_spaces<W: Write>(out: &mut W, count: usize) -> fmt::Result {
    for _ in 0..count {
        out.write_char(' ')?;
    }
    Ok(())
}

/// Single-line form of a node. `flow` is set inside `{...}` and `[...]`.
fn write_inline<W: Write>(out: &mut W, node: &ExportNode, flow: bool) -> fmt::Result {
    match node {
        ExportNode::Scalar { value } => out.write_str(&format_scalar(value, flow)),
        ExportNode::Sequence {
            style: SequenceStyle::RawHex,
            items,
        } if !items.is_empty() => {
            let bytes: Vec<u8> = items
                .iter()
                .filter_map(|item| match item.as_scalar() {
                    Some(Scalar::Int(byte)) => u8::try_from(*byte).ok(),
                    _ => None,
                })
                .collect();
            out.write_str(&hex::encode(bytes))
        }
        ExportNode::Sequence { items, .. } => {
            if items.is_empty() {
                return out.write_str("[]");
            }
            out.write_char('[')?;
            for (position, item) in items.iter().enumerate() {
                if position > 0 {
                    out.write_str(", ")?;
                }
                write_inline(out, item, true)?;
            }
            out.write_char(']')
        }
        ExportNode::Mapping { entries, .. } => {
            if entries.is_empty() {
                return out.write_str("{}");
            }
            out.write_char('{')?;
            for (position, (name, child)) in entries.iter().enumerate() {
                if position > 0 {
                    out.write_str(", ")?;
                }
                out.write_str(name)?;
                out.write_str(": ")?;
                write_inline(out, child, true)?;
            }
            out.write_char('}')
        }
    }
}
