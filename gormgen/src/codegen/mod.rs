//! Code generation module

mod driver;
mod formatter;
mod model;
mod naming;
mod renderer;
mod template;

pub use driver::*;
pub use formatter::*;
pub use model::*;
pub use naming::*;
pub use renderer::*;
pub use template::{resolve, BuiltinTemplates, Section, Template, TemplateError, TemplateSet, TEMPLATE_EXTENSION};
