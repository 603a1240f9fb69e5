//! Renderer - emits the header, struct and object API sections of one model

use std::io::Write;

use serde_json::{json, Value};
use tracing::trace;

use crate::error::{CodegenError, Result};

use super::model::ModelMeta;
use super::template::{resolve, BuiltinTemplates, Section, TemplateError, TemplateSet};

/// Renders models with the built-in templates, or user overrides where given
#[derive(Debug, Clone)]
pub struct Renderer {
    builtins: BuiltinTemplates,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            builtins: BuiltinTemplates::load()?,
        })
    }

    /// Render all sections of `model` into `out`, in header, struct, object
    /// API order. The first failing section aborts with an error naming the
    /// table and the section.
    pub fn render<W: Write>(
        &self,
        model: &ModelMeta<'_>,
        overrides: Option<&TemplateSet>,
        out: &mut W,
    ) -> Result<()> {
        let header = header_context(model);
        let body = model_context(model);

        for section in Section::ALL {
            let context = match section {
                Section::Header => &header,
                Section::Struct | Section::ObjectApi => &body,
            };
            self.render_section(model, overrides, section, context, out)
                .map_err(|source| CodegenError::Render {
                    table: model.table_name.clone(),
                    phase: section.phase(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Render all sections of `model` into a string
    pub fn render_to_string(
        &self,
        model: &ModelMeta<'_>,
        overrides: Option<&TemplateSet>,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.render(model, overrides, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn render_section<W: Write>(
        &self,
        model: &ModelMeta<'_>,
        overrides: Option<&TemplateSet>,
        section: Section,
        context: &Value,
        out: &mut W,
    ) -> std::result::Result<(), TemplateError> {
        let template = resolve(overrides, section, self.builtins.get(section));
        trace!(
            "Rendering {} section of {} with template {:?}",
            section.name(),
            model.table_name,
            template.name()
        );
        template.render(context, out)
    }
}

fn header_context(model: &ModelMeta<'_>) -> Value {
    json!({
        "DbName": model.db_name,
        "TableName": model.table_name,
        "PkgName": model.config.go_package(),
        "ImportTime": model.needs_time_import(),
    })
}

fn model_context(model: &ModelMeta<'_>) -> Value {
    let uniques: Vec<_> = model.unique_fields().collect();
    json!({
        "Name": model.name,
        "LowerName": model.lower_name,
        "DbName": model.db_name,
        "TableName": model.table_name,
        "PkgName": model.config.go_package(),
        "ImportTime": model.needs_time_import(),
        "PrimaryField": model.primary_field(),
        "Fields": model.fields,
        "Uniques": uniques,
    })
}
