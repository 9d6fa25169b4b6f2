//! Build-time index of handler documentation.
//!
//! Rust has no runtime reflection over doc comments, so the index is filled while the
//! project's syntax trees are walked: every `impl` block registers its self type as a
//! known handler type and each of its methods under that owner, and every free function
//! registers under its module. Registries that do not read sources fill the index
//! through [`HandlerIndex::register`] and [`HandlerIndex::register_type`].

use crate::naming::basename;
use crate::parser::ParsedFile;
use log::debug;
use std::collections::{HashMap, HashSet};
use syn::{Attribute, Expr, ImplItem, Item, Lit, Meta, Type};

/// Method name under which invokable handler types are documented.
pub const INVOKE_METHOD: &str = "call";

/// Lookup table `(owner, method) -> doc comment`.
///
/// Owners are registered under every alias callers may use: an impl type under its bare
/// name and its module-qualified name, a module under its full path and its last segment.
/// The first registration of an alias wins.
#[derive(Debug, Default, Clone)]
pub struct HandlerIndex {
    owners: HashMap<String, HashMap<String, String>>,
    types: HashSet<String>,
    functions: HashMap<String, String>,
    module_functions: HashSet<(String, String)>,
}

impl HandlerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from parsed sources.
    pub fn from_files(parsed_files: &[ParsedFile]) -> Self {
        let mut index = Self::new();

        for parsed_file in parsed_files {
            index.index_items(&parsed_file.module_path(), &parsed_file.syntax_tree.items);
        }

        debug!(
            "Indexed {} handler owners, {} types, {} functions",
            index.owners.len(),
            index.types.len(),
            index.functions.len()
        );
        index
    }

    fn index_items(&mut self, module: &str, items: &[Item]) {
        for item in items {
            match item {
                Item::Fn(item_fn) => {
                    let name = item_fn.sig.ident.to_string();
                    self.register_function(module, &name, &doc_comment(&item_fn.attrs));
                }
                Item::Impl(item_impl) => {
                    let Some(type_name) = self_type_name(&item_impl.self_ty) else {
                        continue;
                    };
                    let qualified = qualified_name(module, &type_name);
                    self.register_type(&type_name);
                    self.register_type(&qualified);

                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            let name = method.sig.ident.to_string();
                            let doc = doc_comment(&method.attrs);
                            self.register(&qualified, &name, &doc);
                            self.register(&type_name, &name, &doc);
                        }
                    }
                }
                Item::Mod(item_mod) => {
                    if let Some((_, content)) = &item_mod.content {
                        let child = qualified_name(module, &item_mod.ident.to_string());
                        self.index_items(&child, content);
                    }
                }
                _ => {}
            }
        }
    }

    /// Registers `method` of `owner` with its doc comment (possibly empty).
    pub fn register(&mut self, owner: &str, method: &str, doc: &str) {
        self.owners
            .entry(owner.to_string())
            .or_default()
            .entry(method.to_string())
            .or_insert_with(|| doc.to_string());
    }

    /// Marks `type_name` as a known handler type.
    pub fn register_type(&mut self, type_name: &str) {
        self.types.insert(type_name.to_string());
    }

    /// Registers a free function of `module`, reachable through the full module path and
    /// through the module's last segment.
    pub fn register_function(&mut self, module: &str, name: &str, doc: &str) {
        self.register(module, name, doc);
        let short = basename(module);
        if short != module {
            self.register(short, name, doc);
        }

        self.functions
            .entry(name.to_string())
            .or_insert_with(|| module.to_string());
        self.module_functions
            .insert((module.to_string(), name.to_string()));
    }

    /// Methods of an owner: exact id first, then its last `::` or `\` segment.
    pub fn owner(&self, id: &str) -> Option<&HashMap<String, String>> {
        self.owners
            .get(id)
            .or_else(|| self.owners.get(basename(id)))
    }

    /// Doc comment of `owner::method`, if both are known.
    pub fn doc_comment(&self, owner: &str, method: &str) -> Option<&str> {
        self.owner(owner)?.get(method).map(String::as_str)
    }

    /// Whether `name` (or its last segment) is a known handler type.
    pub fn is_known_type(&self, name: &str) -> bool {
        self.types.contains(name) || self.types.contains(basename(name))
    }

    /// Module defining the free function `name`, preferring `preferred_module`.
    pub fn function_module(&self, name: &str, preferred_module: &str) -> Option<&str> {
        let key = (preferred_module.to_string(), name.to_string());
        self.module_functions
            .get(&key)
            .map(|(module, _)| module.as_str())
            .or_else(|| self.functions.get(name).map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty() && self.types.is_empty()
    }
}

/// Joins the `#[doc = "..."]` attributes of an item, one line per attribute.
pub fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(lit_str) => Some(lit_str.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        Type::Reference(reference) => self_type_name(&reference.elem),
        _ => None,
    }
}

fn qualified_name(module: &str, name: &str) -> String {
    if module == "crate" {
        name.to_string()
    } else {
        format!("{}::{}", module, name)
    }
}
