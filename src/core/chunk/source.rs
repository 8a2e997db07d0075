//! Top-level declaration extraction with tree-sitter.

use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::core::error::{KomodoError, Result};

/// Languages with declaration-aware chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

impl SourceLanguage {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(SourceLanguage::Rust),
            "py" | "pyw" | "pyi" => Some(SourceLanguage::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(SourceLanguage::JavaScript),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceLanguage::Rust => "rust",
            SourceLanguage::Python => "python",
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Tsx => "tsx",
        }
    }

    fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            SourceLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
            SourceLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A top-level construct and its 1-based inclusive line span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: &'static str,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl Declaration {
    /// Block label, e.g. `Function: main`
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind, self.name)
    }
}

/// Parse `content` and return its top-level declarations in source order.
///
/// # Errors
///
/// `ParseFailed` when the parser gives up or the tree contains syntax
/// errors.
pub fn parse_declarations(content: &str, language: SourceLanguage) -> Result<Vec<Declaration>> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|e| KomodoError::ParseFailed(format!("Failed to set language: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| KomodoError::ParseFailed("Parser returned no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(KomodoError::ParseFailed(format!(
            "Syntax errors in {} source",
            language.as_str()
        )));
    }

    let source = content.as_bytes();
    let mut cursor = root.walk();
    let declarations = root
        .children(&mut cursor)
        .filter_map(|node| declaration(node, language, source))
        .collect();

    Ok(declarations)
}

fn declaration(node: Node, language: SourceLanguage, source: &[u8]) -> Option<Declaration> {
    let (kind, named) = match language {
        SourceLanguage::Rust => (rust_kind(node.kind())?, node),
        SourceLanguage::Python => python_kind(node)?,
        SourceLanguage::JavaScript | SourceLanguage::TypeScript | SourceLanguage::Tsx => {
            script_kind(node)?
        }
    };

    let name_field = if named.kind() == "impl_item" { "type" } else { "name" };
    let name = named
        .child_by_field_name(name_field)
        .and_then(|n| n.utf8_text(source).ok())
        .unwrap_or("<anonymous>")
        .to_string();

    let start_line = node.start_position().row + 1;
    let end = node.end_position();
    // A span ending at column 0 stops on the previous line
    let end_line = if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    };

    Some(Declaration {
        kind,
        name,
        start_line,
        end_line,
    })
}

fn rust_kind(kind: &str) -> Option<&'static str> {
    match kind {
        "function_item" => Some("Function"),
        "struct_item" => Some("Struct"),
        "enum_item" => Some("Enum"),
        "impl_item" => Some("Impl"),
        "trait_item" => Some("Trait"),
        "mod_item" => Some("Module"),
        _ => None,
    }
}

/// Decorated definitions keep the decorator lines in their span
fn python_kind(node: Node) -> Option<(&'static str, Node)> {
    let inner = if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition")?
    } else {
        node
    };

    match inner.kind() {
        "function_definition" => Some(("Function", inner)),
        "class_definition" => Some(("Class", inner)),
        _ => None,
    }
}

/// `export` wrappers are unwrapped to the declaration they carry
fn script_kind(node: Node) -> Option<(&'static str, Node)> {
    let inner = if node.kind() == "export_statement" {
        node.child_by_field_name("declaration")?
    } else {
        node
    };

    let kind = match inner.kind() {
        "function_declaration" | "generator_function_declaration" => "Function",
        "class_declaration" | "abstract_class_declaration" => "Class",
        "interface_declaration" => "Interface",
        "enum_declaration" => "Enum",
        _ => return None,
    };
    Some((kind, inner))
}
