//! Command handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};
use rip_binary::Endian;
use rip_export::{ExportOptions, Exporter, to_yaml};
use rip_resolve::{LoadOptions, LoadedBatch, ObjectType, RawFile, RawObject, load_batch};
use rip_schema::{SchemaCatalog, describe_step};
use tracing::info;

use crate::cli::{DecodeArgs, LayoutArgs, SchemaArgs, TypesArgs};

/// The built-in catalog with every `--schema` table merged over it, in
/// command-line order.
pub fn load_catalog(args: &SchemaArgs) -> Result<SchemaCatalog> {
    let mut catalog = SchemaCatalog::builtin()
        .context("compile built-in schema table")?
        .clone();
    for path in &args.schemas {
        let extra = SchemaCatalog::from_path(path)
            .with_context(|| format!("load schema table {}", path.display()))?;
        catalog = catalog
            .merged_with(&extra)
            .with_context(|| format!("merge schema table {}", path.display()))?;
        info!(path = %path.display(), types = extra.len(), "merged schema table");
    }
    Ok(catalog)
}

/// Decode the object in `args.input` and render its export document.
pub fn run_decode(args: &DecodeArgs) -> Result<String> {
    let catalog = load_catalog(&args.schema)?;
    let bytes =
        fs::read(&args.input).with_context(|| format!("read {}", args.input.display()))?;

    let object_type = match (&args.type_name, args.class_id) {
        (Some(name), _) => ObjectType::Name(name.clone()),
        (None, Some(class_id)) => ObjectType::ClassId(class_id),
        (None, None) => bail!("either --type or --class-id is required"),
    };
    let endian = if args.big_endian {
        Endian::Big
    } else {
        Endian::Little
    };
    let file = RawFile::new(file_name(&args.input), args.engine_version)
        .with_endian(endian)
        .with_object(RawObject::new(args.path_id, object_type, bytes));

    let mut options = LoadOptions::new();
    if args.strict {
        options = options.strict_length();
    }
    let LoadedBatch { collection, report } =
        load_batch(&catalog, std::slice::from_ref(&file), &options);
    if let Some(failure) = report
        .files
        .into_iter()
        .flat_map(|file| file.failures)
        .next()
    {
        return Err(anyhow::Error::new(failure.error)
            .context(format!("decode object {} of {}", failure.path_id, file.name)));
    }

    let object = collection
        .objects()
        .next()
        .ok_or_else(|| anyhow!("no object decoded from {}", args.input.display()))?;
    info!(type_name = object.type_name(), path_id = args.path_id, "decoded object");

    let mut export_options = ExportOptions::new();
    if args.topmost_revision {
        export_options = export_options.topmost_revision();
    }
    let document = Exporter::new(&catalog, &collection)
        .with_options(export_options)
        .export(object)
        .context("export decoded object")?;

    if args.json {
        let mut text =
            serde_json::to_string_pretty(&document).context("serialize export document")?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(to_yaml([&document]))
    }
}

/// Table of every type in the catalog.
pub fn run_types(args: &TypesArgs) -> Result<String> {
    let catalog = load_catalog(&args.schema)?;

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Type"),
        Cell::new("Class"),
        Cell::new("Base"),
        Cell::new("Fields"),
        Cell::new("Supported"),
        Cell::new("Revision"),
    ]);
    apply_table_style(&mut table);

    for schema in catalog.types() {
        let revision = match (&args.engine_version, schema.revisions().is_empty()) {
            (_, true) => "-".to_string(),
            (Some(version), false) => schema
                .revision(version, false)
                .map_or_else(|| "none".to_string(), |revision| revision.to_string()),
            (None, false) => schema
                .revisions()
                .iter()
                .map(|rule| rule.revision.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        };
        table.add_row(vec![
            Cell::new(schema.name()),
            Cell::new(
                schema
                    .class_id()
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
            ),
            Cell::new(schema.base().unwrap_or("-")),
            Cell::new(schema.fields().len()),
            Cell::new(schema.supported().to_string()),
            Cell::new(revision),
        ]);
    }
    Ok(format!("{table}\n{} types\n", catalog.len()))
}

/// Layout steps of one type, marked with whether they run at the version.
pub fn run_layout(args: &LayoutArgs) -> Result<String> {
    let catalog = load_catalog(&args.schema)?;
    let schema = catalog
        .get(&args.type_name)
        .ok_or_else(|| anyhow!("unknown type `{}`", args.type_name))?;

    let mut table = Table::new();
    table.set_header(vec![Cell::new("#"), Cell::new("Step"), Cell::new("Runs")]);
    apply_table_style(&mut table);
    for (index, step) in schema.steps().iter().enumerate() {
        let runs = if step.is_enabled(&args.engine_version) {
            "yes"
        } else {
            "no"
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(describe_step(schema, step)),
            Cell::new(runs),
        ]);
    }

    let mut text = format!("{} at {}", schema.name(), args.engine_version);
    if !schema.supports(&args.engine_version) {
        text.push_str(" (unsupported)");
    }
    text.push('\n');
    text.push_str(&table.to_string());
    text.push('\n');
    Ok(text)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
