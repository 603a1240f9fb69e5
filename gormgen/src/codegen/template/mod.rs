//! Section templates and user overrides

mod builtin;
mod engine;

pub use engine::{Template, TemplateError};

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Phase, Result};

/// File extension of override templates inside a template directory
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// One of the overridable regions of a generated file, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    Struct,
    ObjectApi,
}

impl Section {
    /// All sections in the order they are rendered
    pub const ALL: [Section; 3] = [Section::Header, Section::Struct, Section::ObjectApi];

    /// Name used to look the section up in a [`TemplateSet`]
    pub fn name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Struct => "struct",
            Section::ObjectApi => "obj_api",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Section::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn phase(self) -> Phase {
        match self {
            Section::Header => Phase::Header,
            Section::Struct => Phase::Struct,
            Section::ObjectApi => Phase::ObjectApi,
        }
    }
}

/// Named templates supplied by the user to replace built-in sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSet {
    templates: IndexMap<String, Template>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing any previous one with the same name
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.name().to_string(), template)
    }

    /// Parse `source` as the template named `name` and add it
    pub fn with_template(mut self, name: &str, source: &str) -> std::result::Result<Self, TemplateError> {
        self.insert(Template::parse(name, source)?);
        Ok(self)
    }

    /// Parse a file made of `{{#define "name"}} ... {{/define}}` blocks
    pub fn parse(file_name: &str, source: &str) -> std::result::Result<Self, TemplateError> {
        let mut set = Self::new();
        for template in Template::parse_definitions(file_name, source)? {
            set.insert(template);
        }
        Ok(set)
    }

    /// Load overrides from a define-block file, or from a directory holding
    /// one `<name>.tmpl` file per template
    pub fn from_path(path: &Path) -> Result<Self> {
        let set = if path.is_dir() {
            let mut entries: Vec<_> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION))
                .collect();
            entries.sort();

            let mut set = Self::new();
            for file in entries {
                let Some(name) = file.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let source = fs::read_to_string(&file)?;
                set.insert(Template::parse(name, &source)?);
            }
            set
        } else {
            let source = fs::read_to_string(path)?;
            Self::parse(&path.display().to_string(), &source)?
        };

        for name in set.names() {
            if Section::from_name(name).is_none() {
                warn!("Template {:?} in {:?} does not override any section", name, path);
            }
        }
        debug!("Loaded {} template(s) from {:?}", set.len(), path);
        Ok(set)
    }

    pub fn lookup(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Pick the template for `section`: a user override when one is defined,
/// otherwise the built-in default
pub fn resolve<'a>(
    overrides: Option<&'a TemplateSet>,
    section: Section,
    builtin: &'a Template,
) -> &'a Template {
    overrides
        .and_then(|set| set.lookup(section.name()))
        .unwrap_or(builtin)
}

/// Parsed built-in section templates
#[derive(Debug, Clone)]
pub struct BuiltinTemplates {
    header: Template,
    structure: Template,
    obj_api: Template,
}

impl BuiltinTemplates {
    pub fn load() -> std::result::Result<Self, TemplateError> {
        Ok(Self {
            header: Template::parse(Section::Header.name(), builtin::HEADER)?,
            structure: Template::parse(Section::Struct.name(), builtin::STRUCT)?,
            obj_api: Template::parse(Section::ObjectApi.name(), builtin::OBJ_API)?,
        })
    }

    pub fn get(&self, section: Section) -> &Template {
        match section {
            Section::Header => &self.header,
            Section::Struct => &self.structure,
            Section::ObjectApi => &self.obj_api,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_name(section.name()), Some(section));
        }
        assert_eq!(Section::from_name("footer"), None);
        assert_eq!(Section::ObjectApi.phase(), Phase::ObjectApi);
    }

    #[test]
    fn test_builtins_parse() {
        let builtins = BuiltinTemplates::load().unwrap();
        assert_eq!(builtins.get(Section::Header).name(), "header");
        assert_eq!(builtins.get(Section::Struct).name(), "struct");
        assert_eq!(builtins.get(Section::ObjectApi).name(), "obj_api");
    }

    #[test]
    fn test_resolve_prefers_override() {
        let builtins = BuiltinTemplates::load().unwrap();
        let set = TemplateSet::new()
            .with_template("struct", "custom {{Name}}")
            .unwrap();

        let chosen = resolve(Some(&set), Section::Struct, builtins.get(Section::Struct));
        assert_eq!(
            chosen.render_to_string(&json!({"Name": "User"})).unwrap(),
            "custom User"
        );

        let chosen = resolve(Some(&set), Section::Header, builtins.get(Section::Header));
        assert_eq!(chosen, builtins.get(Section::Header));
    }

    #[test]
    fn test_resolve_without_overrides_uses_builtin() {
        let builtins = BuiltinTemplates::load().unwrap();
        for section in Section::ALL {
            assert_eq!(resolve(None, section, builtins.get(section)), builtins.get(section));
        }
    }

    #[test]
    fn test_unrecognized_names_do_not_override() {
        let builtins = BuiltinTemplates::load().unwrap();
        let set = TemplateSet::new()
            .with_template("footer", "nothing")
            .unwrap()
            .with_template("object_api", "nothing")
            .unwrap();
        for section in Section::ALL {
            assert_eq!(
                resolve(Some(&set), section, builtins.get(section)),
                builtins.get(section)
            );
        }
    }

    #[test]
    fn test_from_path_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();

        let file = dir.path().join("overrides.tmpl");
        fs::write(
            &file,
            "{{#define \"header\"}}package {{PkgName}}\n{{/define}}\n{{#define \"obj_api\"}}{{/define}}\n",
        )
        .unwrap();
        let set = TemplateSet::from_path(&file).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["header", "obj_api"]);

        let sections = dir.path().join("sections");
        fs::create_dir(&sections).unwrap();
        fs::write(sections.join("struct.tmpl"), "type {{Name}} struct{}\n").unwrap();
        fs::write(sections.join("README.md"), "not a template").unwrap();
        let set = TemplateSet::from_path(&sections).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.lookup("struct").is_some());
    }

    #[test]
    fn test_from_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.tmpl");
        fs::write(&file, "{{#define \"struct\"}}{{#each Fields}}{{/define}}").unwrap();
        assert!(matches!(
            TemplateSet::from_path(&file),
            Err(crate::CodegenError::TemplateError(TemplateError::Parse { .. }))
        ));
    }
}
