//! Text template engine for generated sections
//!
//! Templates are plain text with `{{ ... }}` tags, rendered against a
//! `serde_json::Value` context:
//!
//! - `{{Name}}`, `{{PrimaryField.Type}}`: dotted lookup, resolved from the
//!   innermost `#each` scope outward
//! - `{{@root.Name}}`: lookup from the root context
//! - `{{this}}`, `{{@index}}`, `{{@first}}`, `{{@last}}`: current item of an `#each`
//! - `{{#if Path}} ... {{else}} ... {{/if}}` and `{{#unless Path}} ... {{/unless}}`
//! - `{{#each Path}} ... {{/each}}`
//! - `{{! comment }}`
//! - `{{~ ... }}` trims whitespace before the tag, `{{ ... ~}}` after it
//!
//! Template sets additionally wrap named templates in
//! `{{#define "name"}} ... {{/define}}` blocks.

use std::borrow::Cow;
use std::io::Write;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing or executing a template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("{template}:{line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    #[error("{template}: no value for `{path}`")]
    MissingVariable { template: String, path: String },

    #[error("{template}: `{path}` is not a list")]
    NotIterable { template: String, path: String },

    #[error("{template}: `{path}` cannot be printed as text")]
    NotPrintable { template: String, path: String },

    #[error("{template}: write failed: {source}")]
    Write {
        template: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    If,
    Unless,
    Each,
    Define,
}

impl BlockKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "if" => Some(BlockKind::If),
            "unless" => Some(BlockKind::Unless),
            "each" => Some(BlockKind::Each),
            "define" => Some(BlockKind::Define),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
            BlockKind::Each => "each",
            BlockKind::Define => "define",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Var(Path),
    Open(BlockKind, String),
    Else,
    Close(BlockKind),
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    line: usize,
}

/// A variable reference inside a tag
#[derive(Debug, Clone, PartialEq)]
struct Path {
    raw: String,
    kind: PathKind,
}

#[derive(Debug, Clone, PartialEq)]
enum PathKind {
    This,
    Index,
    First,
    Last,
    Root(Vec<String>),
    Scoped(Vec<String>),
}

impl Path {
    fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '@');
        if !valid {
            return None;
        }

        let kind = match raw {
            "this" | "." => PathKind::This,
            "@index" => PathKind::Index,
            "@first" => PathKind::First,
            "@last" => PathKind::Last,
            _ => {
                let (root, rest) = match raw.strip_prefix("@root.") {
                    Some(rest) => (true, rest),
                    None => (false, raw),
                };
                let segments: Vec<String> = rest.split('.').map(str::to_string).collect();
                if segments.iter().any(|s| s.is_empty() || s.contains('@')) {
                    return None;
                }
                if root {
                    PathKind::Root(segments)
                } else {
                    PathKind::Scoped(segments)
                }
            }
        };

        Some(Path {
            raw: raw.to_string(),
            kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(Path),
    Cond {
        path: Path,
        negate: bool,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Each {
        path: Path,
        body: Vec<Node>,
    },
}

/// A parsed, renderable template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse a single template from source text
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let tokens = tokenize(name, source)?;
        let mut parser = Parser {
            template: name,
            tokens,
            pos: 0,
        };
        let nodes = parser.parse_nodes(None)?;
        Ok(Template {
            name: name.to_string(),
            nodes,
        })
    }

    /// Parse every `{{#define "name"}}` block of a template file.
    ///
    /// Text between blocks is ignored.
    pub fn parse_definitions(file: &str, source: &str) -> Result<Vec<Self>, TemplateError> {
        let tokens = tokenize(file, source)?;
        let mut parser = Parser {
            template: file,
            tokens,
            pos: 0,
        };
        let mut templates = Vec::new();

        while let Some(spanned) = parser.advance() {
            match spanned.token {
                Token::Text(_) => {}
                Token::Open(BlockKind::Define, arg) => {
                    let name = arg.trim().trim_matches('"').to_string();
                    if name.is_empty() {
                        return Err(parser.error(spanned.line, "define block needs a name"));
                    }
                    let nodes = parser.parse_nodes(Some(BlockKind::Define))?;
                    templates.push(Template { name, nodes });
                }
                _ => {
                    return Err(parser.error(
                        spanned.line,
                        "only {{#define}} blocks are allowed at the top level",
                    ));
                }
            }
        }

        Ok(templates)
    }

    /// Template name, used in error messages and for section lookup
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template against `context` into `out`
    pub fn render<W: Write>(&self, context: &Value, out: &mut W) -> Result<(), TemplateError> {
        let mut renderer = Renderer {
            template: &self.name,
            root: context,
            frames: vec![Frame {
                value: context,
                index: None,
            }],
        };
        renderer.render_nodes(&self.nodes, out)
    }

    /// Render the template into a new string
    pub fn render_to_string(&self, context: &Value) -> Result<String, TemplateError> {
        let mut buf = Vec::new();
        self.render(context, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn tokenize(template: &str, source: &str) -> Result<Vec<Spanned>, TemplateError> {
    let mut tokens: Vec<Spanned> = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next = false;

    while !rest.is_empty() {
        let Some(open) = rest.find("{{") else {
            push_text(&mut tokens, rest, line, trim_next);
            break;
        };

        let text = &rest[..open];
        push_text(&mut tokens, text, line, trim_next);
        line += text.matches('\n').count();

        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            return Err(TemplateError::Parse {
                template: template.to_string(),
                line,
                message: "unclosed `{{` tag".to_string(),
            });
        };
        let mut inner = &after_open[..close];
        let tag_line = line;
        line += inner.matches('\n').count();
        rest = &after_open[close + 2..];

        if let Some(stripped) = inner.strip_prefix('~') {
            inner = stripped;
            if let Some(Spanned {
                token: Token::Text(prev),
                ..
            }) = tokens.last_mut()
            {
                let trimmed_len = prev.trim_end().len();
                prev.truncate(trimmed_len);
            }
        }
        trim_next = false;
        if let Some(stripped) = inner.strip_suffix('~') {
            inner = stripped;
            trim_next = true;
        }

        let inner = inner.trim();
        let parse_error = |message: String| TemplateError::Parse {
            template: template.to_string(),
            line: tag_line,
            message,
        };

        let token = if inner.starts_with('!') {
            continue;
        } else if let Some(block) = inner.strip_prefix('#') {
            let (keyword, arg) = block.split_once(char::is_whitespace).unwrap_or((block, ""));
            let kind = BlockKind::from_keyword(keyword)
                .ok_or_else(|| parse_error(format!("unknown block `#{keyword}`")))?;
            Token::Open(kind, arg.trim().to_string())
        } else if let Some(block) = inner.strip_prefix('/') {
            let kind = BlockKind::from_keyword(block.trim())
                .ok_or_else(|| parse_error(format!("unknown closing tag `/{}`", block.trim())))?;
            Token::Close(kind)
        } else if inner == "else" {
            Token::Else
        } else {
            let path = Path::parse(inner)
                .ok_or_else(|| parse_error(format!("invalid variable `{inner}`")))?;
            Token::Var(path)
        };

        tokens.push(Spanned {
            token,
            line: tag_line,
        });
    }

    Ok(tokens)
}

fn push_text(tokens: &mut Vec<Spanned>, text: &str, line: usize, trim_start: bool) {
    let text = if trim_start { text.trim_start() } else { text };
    if !text.is_empty() {
        tokens.push(Spanned {
            token: Token::Text(text.to_string()),
            line,
        });
    }
}

struct Parser<'a> {
    template: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn error(&self, line: usize, message: &str) -> TemplateError {
        TemplateError::Parse {
            template: self.template.to_string(),
            line,
            message: message.to_string(),
        }
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    /// Parse nodes until the closing tag of `block` (or end of input at top level)
    fn parse_nodes(&mut self, block: Option<BlockKind>) -> Result<Vec<Node>, TemplateError> {
        let (nodes, ended_on_else) = self.parse_branch(block)?;
        if ended_on_else {
            return Err(self.error(self.last_line(), "unexpected {{else}}"));
        }
        Ok(nodes)
    }

    /// Parse one branch; returns true if it ended on `{{else}}`
    fn parse_branch(&mut self, block: Option<BlockKind>) -> Result<(Vec<Node>, bool), TemplateError> {
        let mut nodes = Vec::new();

        while let Some(spanned) = self.advance() {
            match spanned.token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::Var(path) => nodes.push(Node::Var(path)),
                Token::Else => {
                    if matches!(block, Some(BlockKind::If) | Some(BlockKind::Unless)) {
                        return Ok((nodes, true));
                    }
                    return Err(self.error(spanned.line, "{{else}} outside of #if/#unless"));
                }
                Token::Close(kind) => {
                    if block == Some(kind) {
                        return Ok((nodes, false));
                    }
                    return Err(self.error(
                        spanned.line,
                        &format!("unexpected {{{{/{}}}}}", kind.keyword()),
                    ));
                }
                Token::Open(BlockKind::Define, _) => {
                    return Err(self.error(spanned.line, "{{#define}} cannot be nested"));
                }
                Token::Open(kind, arg) => {
                    let path = Path::parse(&arg).ok_or_else(|| {
                        self.error(
                            spanned.line,
                            &format!("#{} needs a variable, got `{arg}`", kind.keyword()),
                        )
                    })?;
                    nodes.push(self.parse_block(kind, path)?);
                }
            }
        }

        match block {
            None => Ok((nodes, false)),
            Some(kind) => Err(self.error(
                self.last_line(),
                &format!("missing {{{{/{}}}}}", kind.keyword()),
            )),
        }
    }

    fn parse_block(&mut self, kind: BlockKind, path: Path) -> Result<Node, TemplateError> {
        match kind {
            BlockKind::Each => Ok(Node::Each {
                path,
                body: self.parse_nodes(Some(kind))?,
            }),
            _ => {
                let (then, has_else) = self.parse_branch(Some(kind))?;
                let otherwise = if has_else {
                    self.parse_nodes(Some(kind))?
                } else {
                    Vec::new()
                };
                Ok(Node::Cond {
                    path,
                    negate: kind == BlockKind::Unless,
                    then,
                    otherwise,
                })
            }
        }
    }
}

struct Frame<'v> {
    value: &'v Value,
    index: Option<(usize, usize)>,
}

struct Renderer<'t, 'v> {
    template: &'t str,
    root: &'v Value,
    frames: Vec<Frame<'v>>,
}

impl<'t, 'v> Renderer<'t, 'v> {
    fn render_nodes<W: Write>(&mut self, nodes: &[Node], out: &mut W) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.write(out, text)?,
                Node::Var(path) => {
                    let value = self.lookup(path)?;
                    let text = match value.as_ref() {
                        Value::Null => String::new(),
                        Value::String(s) => s.clone(),
                        Value::Bool(b) => b.to_string(),
                        Value::Number(n) => n.to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(TemplateError::NotPrintable {
                                template: self.template.to_string(),
                                path: path.raw.clone(),
                            });
                        }
                    };
                    self.write(out, &text)?;
                }
                Node::Cond {
                    path,
                    negate,
                    then,
                    otherwise,
                } => {
                    let value = self.lookup(path)?;
                    if is_truthy(value.as_ref()) != *negate {
                        self.render_nodes(then, out)?;
                    } else {
                        self.render_nodes(otherwise, out)?;
                    }
                }
                Node::Each { path, body } => {
                    let items = match self.lookup(path)? {
                        Cow::Borrowed(Value::Array(items)) => items,
                        Cow::Borrowed(Value::Null) => continue,
                        _ => {
                            return Err(TemplateError::NotIterable {
                                template: self.template.to_string(),
                                path: path.raw.clone(),
                            });
                        }
                    };
                    let len = items.len();
                    for (i, item) in items.iter().enumerate() {
                        self.frames.push(Frame {
                            value: item,
                            index: Some((i, len)),
                        });
                        let result = self.render_nodes(body, out);
                        self.frames.pop();
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write<W: Write>(&self, out: &mut W, text: &str) -> Result<(), TemplateError> {
        out.write_all(text.as_bytes())
            .map_err(|source| TemplateError::Write {
                template: self.template.to_string(),
                source,
            })
    }

    fn lookup(&self, path: &Path) -> Result<Cow<'v, Value>, TemplateError> {
        let missing = || TemplateError::MissingVariable {
            template: self.template.to_string(),
            path: path.raw.clone(),
        };
        let loop_index = || {
            self.frames
                .iter()
                .rev()
                .find_map(|f| f.index)
                .ok_or_else(missing)
        };

        match &path.kind {
            PathKind::This => Ok(Cow::Borrowed(self.current())),
            PathKind::Index => {
                let (i, _) = loop_index()?;
                Ok(Cow::Owned(Value::from(i)))
            }
            PathKind::First => {
                let (i, _) = loop_index()?;
                Ok(Cow::Owned(Value::Bool(i == 0)))
            }
            PathKind::Last => {
                let (i, len) = loop_index()?;
                Ok(Cow::Owned(Value::Bool(i + 1 == len)))
            }
            PathKind::Root(segments) => descend(self.root, segments)
                .map(Cow::Borrowed)
                .ok_or_else(missing),
            PathKind::Scoped(segments) => {
                let (head, tail) = segments.split_first().ok_or_else(missing)?;
                let start = self
                    .frames
                    .iter()
                    .rev()
                    .find_map(|f| f.value.as_object().and_then(|o| o.get(head)))
                    .ok_or_else(missing)?;
                descend(start, tail).map(Cow::Borrowed).ok_or_else(missing)
            }
        }
    }

    fn current(&self) -> &'v Value {
        self.frames.last().map(|f| f.value).unwrap_or(self.root)
    }
}

fn descend<'v>(mut value: &'v Value, segments: &[String]) -> Option<&'v Value> {
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}
