//! Generation driver - one output file per table

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{defaults, CodeConfig, FailurePolicy};
use crate::error::{CodegenError, Result};
use crate::schema::{DbSchema, TableSchema};

use super::model::ModelMeta;
use super::renderer::Renderer;

/// Drives model building and rendering for every table of a schema
pub struct Generator<'a> {
    config: &'a CodeConfig,
    output_root: PathBuf,
    failure_policy: FailurePolicy,
    keep_partial_output: bool,
    renderer: Renderer,
}

impl<'a> Generator<'a> {
    /// Create a generator writing below `output_root`
    pub fn new(config: &'a CodeConfig, output_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            config,
            output_root: output_root.into(),
            failure_policy: FailurePolicy::default(),
            keep_partial_output: defaults::KEEP_PARTIAL_OUTPUT,
            renderer: Renderer::new()?,
        })
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn keep_partial_output(mut self, keep: bool) -> Self {
        self.keep_partial_output = keep;
        self
    }

    /// Directory the generated files land in
    pub fn package_dir(&self) -> PathBuf {
        self.output_root.join(&self.config.package_name)
    }

    /// Path of the file generated for `table`
    pub fn artifact_path(&self, table: &str) -> PathBuf {
        self.package_dir()
            .join(format!("{}.{}", table, defaults::FILE_EXTENSION))
    }

    /// Generate the file of one table and return its path
    pub fn generate_table(&self, db_name: &str, table: &str, schema: &TableSchema) -> Result<PathBuf> {
        let path = self.artifact_path(table);
        debug!("Generating {} -> {:?}", table, path);

        let model = ModelMeta::build(db_name, table, schema, self.config)?;

        let file = File::create(&path).map_err(|source| CodegenError::CreateOutput {
            table: table.to_string(),
            path: path.clone(),
            source,
        })?;

        if let Err(e) = self.write_model(&model, file) {
            self.discard_partial(&path);
            return Err(e);
        }
        Ok(path)
    }

    fn write_model(&self, model: &ModelMeta<'_>, file: File) -> Result<()> {
        let mut out = BufWriter::new(file);
        let rendered = self
            .renderer
            .render(model, self.config.templates.as_ref(), &mut out);
        // Flushing and dropping the writer releases the file on both paths
        let flushed = out.flush().map_err(|source| CodegenError::WriteOutput {
            table: model.table_name.clone(),
            source,
        });
        rendered.and(flushed)
    }

    fn discard_partial(&self, path: &Path) {
        if self.keep_partial_output {
            debug!("Keeping partial output {:?}", path);
            return;
        }
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial output {:?}: {}", path, e);
        }
    }

    /// Generate every table of `schema`, in schema order.
    ///
    /// With [`FailurePolicy::CollectAll`] every table is attempted and the
    /// failures come back together as [`CodegenError::Tables`]; with
    /// [`FailurePolicy::FailFast`] the first failure is returned as is.
    pub fn generate_all(&self, db_name: &str, schema: &DbSchema) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(self.package_dir())?;

        let mut generated = Vec::with_capacity(schema.len());
        let mut failures = Vec::new();

        for (table, columns) in schema {
            match self.generate_table(db_name, table, columns) {
                Ok(path) => generated.push(path),
                Err(e) => {
                    warn!("{}", e);
                    match self.failure_policy {
                        FailurePolicy::FailFast => return Err(e),
                        FailurePolicy::CollectAll => failures.push(e),
                    }
                }
            }
        }

        info!(
            "Generated {} of {} table(s) in {:?}",
            generated.len(),
            schema.len(),
            self.package_dir()
        );

        if failures.is_empty() {
            Ok(generated)
        } else {
            Err(CodegenError::Tables(failures))
        }
    }
}
