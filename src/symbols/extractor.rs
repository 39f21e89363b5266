//! Tree-sitter based extraction of definitions into a `SymbolTable`.
//!
//! The traversal threads the current qualname prefix through each recursive
//! call instead of keeping a shared parent stack, so extraction can run in
//! parallel across files. When a node is recognized as a definition the
//! visitor records it and explicitly recurses into it with the extended
//! prefix; a definition is never visited by both the inner and the outer
//! pass, which is what keeps the table free of duplicate entries.

use super::{Language, SymbolKind, SymbolSpan, SymbolTable};
use tree_sitter::{Node, Parser};

/// Placeholder name for functions with no declared identifier and no
/// enclosing binding to borrow a name from.
pub const ANONYMOUS_FUNCTION: &str = "(anonymous function)";
/// Placeholder name for class expressions with no identifier.
pub const ANONYMOUS_CLASS: &str = "(anonymous class)";

/// Parse source text and extract all definitions into a table keyed by
/// qualified name.
///
/// Total over all inputs: malformed source, or a parser that cannot be
/// constructed, yields an empty table rather than an error. Callers must
/// treat "no symbols" as a valid, degraded result.
pub fn extract(source: &str, language: Language) -> SymbolTable {
    let mut table = SymbolTable::new();

    let mut parser = Parser::new();
    if parser.set_language(&language.grammar()).is_err() {
        return table;
    }
    let Some(tree) = parser.parse(source, None) else {
        return table;
    };

    let mut prefix: Vec<String> = Vec::new();
    walk(
        tree.root_node(),
        source,
        language,
        &mut prefix,
        false,
        &mut table,
    );

    // Backfill the qualname field now that keys are final.
    for (key, span) in table.iter_mut() {
        span.qualname = key.clone();
    }
    table
}

/// A recognized definition before it is entered into the table.
struct Definition<'a> {
    name: String,
    kind: SymbolKind,
    /// Node whose extent becomes the recorded span (the decorated wrapper
    /// for Python, the definition node itself otherwise).
    span_node: Node<'a>,
    /// Node whose children are visited with the extended prefix.
    body_node: Node<'a>,
    /// Whether nested functions should be recorded as methods.
    class_like: bool,
}

fn walk(
    node: Node,
    source: &str,
    language: Language,
    prefix: &mut Vec<String>,
    in_class: bool,
    table: &mut SymbolTable,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(def) = recognize(child, source, language, in_class) {
            let qualname = if prefix.is_empty() {
                def.name.clone()
            } else {
                format!("{}.{}", prefix.join("."), def.name)
            };

            let span_node = def.span_node;
            // Later siblings at a colliding qualname overwrite earlier ones.
            table.insert(
                qualname,
                SymbolSpan {
                    qualname: String::new(),
                    kind: def.kind,
                    start_line: span_node.start_position().row as u32 + 1,
                    end_line: span_node.end_position().row as u32 + 1,
                    start_column: span_node.start_position().column as u32,
                    end_column: span_node.end_position().column as u32,
                    source_text: source[span_node.byte_range()].to_owned(),
                },
            );

            prefix.push(def.name);
            walk(def.body_node, source, language, prefix, def.class_like, table);
            prefix.pop();
        } else {
            walk(child, source, language, prefix, in_class, table);
        }
    }
}

fn recognize<'a>(
    node: Node<'a>,
    source: &str,
    language: Language,
    in_class: bool,
) -> Option<Definition<'a>> {
    match language {
        Language::Python => recognize_python(node, source, in_class),
        Language::JavaScript | Language::TypeScript | Language::Tsx => {
            recognize_js_ts(node, source, in_class)
        }
        Language::Rust => recognize_rust(node, source, in_class),
    }
}

// --- Python ---

fn recognize_python<'a>(node: Node<'a>, source: &str, in_class: bool) -> Option<Definition<'a>> {
    match node.kind() {
        "function_definition" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: function_kind(in_class),
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        "class_definition" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: SymbolKind::Class,
                span_node: node,
                body_node: node,
                class_like: true,
            })
        }
        "decorated_definition" => {
            // The decorators are part of the definition's extent; the name
            // and body come from the wrapped def.
            let inner = node.child_by_field_name("definition")?;
            let mut def = recognize_python(inner, source, in_class)?;
            def.span_node = node;
            Some(def)
        }
        _ => None,
    }
}

// --- JavaScript / TypeScript ---

fn recognize_js_ts<'a>(node: Node<'a>, source: &str, in_class: bool) -> Option<Definition<'a>> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: function_kind(in_class),
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        "method_definition" => {
            let name = find_child_text(node, "name", source)
                .unwrap_or_else(|| ANONYMOUS_FUNCTION.to_owned());
            Some(Definition {
                name,
                kind: SymbolKind::Method,
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        "class_declaration" | "class" => {
            let name = find_child_text(node, "name", source)
                .or_else(|| binding_name(node, source))
                .unwrap_or_else(|| ANONYMOUS_CLASS.to_owned());
            Some(Definition {
                name,
                kind: SymbolKind::Class,
                span_node: node,
                body_node: node,
                class_like: true,
            })
        }
        "function_expression" | "function" | "generator_function" | "arrow_function" => {
            // No declared identifier of its own (except named function
            // expressions): fall back to the enclosing binding's name.
            let name = find_child_text(node, "name", source)
                .or_else(|| binding_name(node, source))
                .unwrap_or_else(|| ANONYMOUS_FUNCTION.to_owned());
            Some(Definition {
                name,
                kind: function_kind(in_class),
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        _ => None,
    }
}

/// Name of the binding a function/class expression is attached to:
/// `const foo = () => ..`, `obj.foo = function ..`, `{ foo: () => .. }`,
/// or a class field initializer.
fn binding_name(node: Node, source: &str) -> Option<String> {
    let parent = node.parent()?;
    match parent.kind() {
        "variable_declarator" => find_child_text(parent, "name", source),
        "assignment_expression" => find_child_text(parent, "left", source),
        "pair" => find_child_text(parent, "key", source),
        "field_definition" => find_child_text(parent, "property", source),
        "public_field_definition" => find_child_text(parent, "name", source)
            .or_else(|| find_child_text(parent, "property", source)),
        _ => None,
    }
}

// --- Rust ---

fn recognize_rust<'a>(node: Node<'a>, source: &str, in_class: bool) -> Option<Definition<'a>> {
    match node.kind() {
        "function_item" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: function_kind(in_class),
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        "struct_item" | "enum_item" | "union_item" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: SymbolKind::Definition,
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        "trait_item" => {
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: SymbolKind::Definition,
                span_node: node,
                body_node: node,
                class_like: true,
            })
        }
        "impl_item" => {
            let name = impl_name(node, source)?;
            Some(Definition {
                name,
                kind: SymbolKind::Definition,
                span_node: node,
                body_node: node,
                class_like: true,
            })
        }
        "mod_item" => {
            // Only inline modules delimit definitions in this file.
            node.child_by_field_name("body")?;
            let name = find_child_text(node, "name", source)?;
            Some(Definition {
                name,
                kind: SymbolKind::Definition,
                span_node: node,
                body_node: node,
                class_like: false,
            })
        }
        _ => None,
    }
}

/// Name for an `impl` block: "MyType" or "MyTrait for MyType".
fn impl_name(node: Node, source: &str) -> Option<String> {
    let type_name = find_child_text(node, "type", source)?;
    match node.child_by_field_name("trait") {
        Some(trait_node) => Some(format!("{} for {}", node_text(trait_node, source), type_name)),
        None => Some(type_name),
    }
}

// --- Helpers ---

fn function_kind(in_class: bool) -> SymbolKind {
    if in_class {
        SymbolKind::Method
    } else {
        SymbolKind::Function
    }
}

fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

fn find_child_text(node: Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| node_text(n, source).to_owned())
}
