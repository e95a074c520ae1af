use super::{Location, Param, ParamShape, Symbol, SymbolKind, SymbolTable, WrittenPath};
use crate::error::{CodegenError, Result};
use crate::type_ref::TypeRef;
use quote::ToTokens;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use syn::punctuated::Punctuated;
use syn::{
    Attribute, FnArg, GenericArgument, ImplItemFn, Item, ItemImpl, Meta, Pat, PathArguments,
    ReturnType, Token, Type, UseTree, Visibility,
};
use walkdir::WalkDir;

/// Names usable without import that an injectable may depend on.
const PRELUDE: &[(&str, &str)] = &[("String", "std::string::String")];

/// Bound on chained `pub use` re-exports followed while qualifying a path.
const MAX_REEXPORT_DEPTH: usize = 16;

/// One Rust source file and the module path it is compiled as.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, module: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
            content: content.into(),
        }
    }

    /// Read `path`, deriving its module from its position below `root`.
    pub fn read(root: &Path, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        Ok(Self::new(path, module_for_path(root, path), content))
    }
}

/// `src/lib.rs` is `crate`, `src/net.rs` and `src/net/mod.rs` are `crate::net`.
pub fn module_for_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(stem) = relative.file_stem().map(|s| s.to_string_lossy()) {
        if !matches!(stem.as_ref(), "lib" | "main" | "mod") {
            segments.push(stem.into_owned());
        }
    }
    std::iter::once("crate".to_string())
        .chain(segments)
        .collect::<Vec<_>>()
        .join("::")
}

#[derive(Debug, Default)]
struct Scope {
    module: String,
    imports: HashMap<String, WrittenPath>,
    globs: Vec<WrittenPath>,
}

/// Symbol table over parsed Rust sources.
///
/// Type names are qualified through the `use` items of the enclosing module,
/// the types the module declares, and absolute paths. A crate-internal path
/// that names no known declaration stays unresolved, which defers every
/// symbol mentioning it until a later round adds the declaring file.
/// Crate paths going through `pub use` re-exports are followed to the
/// declaration. Items only compiled under `cfg(test)` are not scanned.
#[derive(Debug)]
pub struct SourceSymbolTable {
    marker: String,
    scopes: Vec<Scope>,
    declared: BTreeSet<String>,
    modules: BTreeSet<String>,
    /// `crate::m::Alias` -> (module of the `pub use`, path it names).
    reexports: HashMap<String, (String, WrittenPath)>,
    reexport_globs: HashMap<String, Vec<WrittenPath>>,
    symbols: Vec<Symbol>,
    files: Vec<PathBuf>,
}

impl SourceSymbolTable {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            scopes: Vec::new(),
            declared: BTreeSet::new(),
            modules: BTreeSet::new(),
            reexports: HashMap::new(),
            reexport_globs: HashMap::new(),
            symbols: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: &SourceFile) -> Result<()> {
        let file = syn::parse_file(&source.content).map_err(|e| CodegenError::Parse {
            file: source.path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Scanning {} as {}", source.path.display(), source.module);
        self.register_module(&source.module);
        self.collect_items(&file.items, &source.module, &source.path);
        self.files.push(source.path.clone());
        Ok(())
    }

    /// Add every `.rs` file below `root`, in file name order.
    pub fn add_dir(&mut self, root: &Path) -> Result<usize> {
        let mut added = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                CodegenError::io(path, std::io::Error::other(e.to_string()))
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                self.add_source(&SourceFile::read(root, path)?)?;
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn declared_types(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    fn register_module(&mut self, module: &str) {
        let mut current = module;
        loop {
            self.modules.insert(current.to_string());
            match current.rsplit_once("::") {
                Some((parent, _)) => current = parent,
                None => break,
            }
        }
    }

    fn is_marked(&self, attrs: &[Attribute]) -> bool {
        attrs.iter().any(|attr| {
            attr.path()
                .segments
                .last()
                .is_some_and(|segment| segment.ident == self.marker)
        })
    }

    fn collect_items(&mut self, items: &[Item], module: &str, file: &Path) {
        let scope = self.scopes.len();
        self.scopes.push(Scope {
            module: module.to_string(),
            ..Scope::default()
        });

        for item in items {
            if is_test_only(item_attrs(item)) {
                continue;
            }
            match item {
                Item::Use(item_use) => {
                    let leading = item_use.leading_colon.is_some();
                    collect_use(&item_use.tree, Vec::new(), leading, &mut self.scopes[scope]);
                    if !matches!(item_use.vis, Visibility::Inherited) {
                        let mut exported = Scope::default();
                        collect_use(&item_use.tree, Vec::new(), leading, &mut exported);
                        self.export(module, exported);
                    }
                }
                Item::Struct(item) => {
                    self.declare(module, &item.ident);
                    self.reject_marked(&item.attrs, &item.ident, "struct", module, scope, file);
                }
                Item::Enum(item) => {
                    self.declare(module, &item.ident);
                    self.reject_marked(&item.attrs, &item.ident, "enum", module, scope, file);
                }
                Item::Union(item) => {
                    self.declare(module, &item.ident);
                    self.reject_marked(&item.attrs, &item.ident, "union", module, scope, file);
                }
                Item::Type(item) => {
                    self.declare(module, &item.ident);
                    self.reject_marked(&item.attrs, &item.ident, "type alias", module, scope, file);
                }
                Item::Trait(item) => {
                    self.declare(module, &item.ident);
                    self.reject_marked(&item.attrs, &item.ident, "trait", module, scope, file);
                }
                Item::Fn(item) => {
                    self.reject_marked(&item.attrs, &item.sig.ident, "free function", module, scope, file);
                }
                Item::Mod(item) => {
                    let child = format!("{}::{}", module, item.ident);
                    self.register_module(&child);
                    if let Some((_, items)) = &item.content {
                        self.collect_items(items, &child, file);
                    }
                }
                Item::Impl(item) => self.collect_impl(item, module, scope, file),
                _ => {}
            }
        }
    }

    fn export(&mut self, module: &str, exported: Scope) {
        for (alias, path) in exported.imports {
            self.reexports
                .insert(format!("{}::{}", module, alias), (module.to_string(), path));
        }
        if !exported.globs.is_empty() {
            self.reexport_globs
                .entry(module.to_string())
                .or_default()
                .extend(exported.globs);
        }
    }

    fn declare(&mut self, module: &str, ident: &syn::Ident) {
        self.declared.insert(format!("{}::{}", module, ident));
    }

    fn reject_marked(
        &mut self,
        attrs: &[Attribute],
        ident: &syn::Ident,
        what: &str,
        module: &str,
        scope: usize,
        file: &Path,
    ) {
        if !self.is_marked(attrs) {
            return;
        }
        self.symbols.push(Symbol {
            location: Location::new(file, ident.span().start().line),
            module: module.to_string(),
            scope,
            owner: None,
            owner_generic: false,
            name: ident.to_string(),
            kind: SymbolKind::NotConstructor {
                reason: format!("{} declarations cannot be injectable constructors", what),
            },
            params: Vec::new(),
        });
    }

    fn collect_impl(&mut self, item: &ItemImpl, module: &str, scope: usize, file: &Path) {
        let impl_generic = !item.generics.params.is_empty();
        let (owner, owner_generic) = match &*item.self_ty {
            Type::Path(type_path) if type_path.qself.is_none() => {
                let generic_args = type_path
                    .path
                    .segments
                    .iter()
                    .any(|segment| !segment.arguments.is_empty());
                (Some(written_path(&type_path.path)), impl_generic || generic_args)
            }
            _ => (None, impl_generic),
        };

        for impl_item in &item.items {
            let syn::ImplItem::Fn(method) = impl_item else {
                continue;
            };
            if !self.is_marked(&method.attrs) || is_test_only(&method.attrs) {
                continue;
            }

            let params = method
                .sig
                .inputs
                .iter()
                .filter_map(|arg| match arg {
                    FnArg::Typed(pat_type) => Some(Param {
                        name: match &*pat_type.pat {
                            Pat::Ident(pat) => pat.ident.to_string(),
                            _ => "_".to_string(),
                        },
                        shape: param_shape(&pat_type.ty),
                    }),
                    FnArg::Receiver(_) => None,
                })
                .collect();

            self.symbols.push(Symbol {
                location: Location::new(file, method.sig.ident.span().start().line),
                module: module.to_string(),
                scope,
                owner: owner.clone(),
                owner_generic,
                name: method.sig.ident.to_string(),
                kind: constructor_kind(item, method, owner.as_ref()),
                params,
            });
        }
    }

    fn resolve(&self, scope: &Scope, path: &WrittenPath, owner: Option<&TypeRef>) -> Option<TypeRef> {
        if path.leading_colon {
            return TypeRef::parse(&path.segments.join("::"));
        }
        let (first, rest) = path.segments.split_first()?;

        if rest.is_empty() {
            if first == "Self" {
                return owner.cloned();
            }
            let local = format!("{}::{}", scope.module, first);
            if self.declared.contains(&local) {
                return TypeRef::parse(&local);
            }
            if let Some(import) = scope.imports.get(first) {
                return self.qualify(&scope.module, import);
            }
            for glob in &scope.globs {
                let Some(base) = self.absolutize(&scope.module, glob) else {
                    continue;
                };
                let candidate = format!("{}::{}", base, first);
                if let Some(found) = self.canonical(&candidate, 0) {
                    return TypeRef::parse(&found);
                }
            }
            return PRELUDE
                .iter()
                .find(|(name, _)| name == first)
                .and_then(|(_, qualified)| TypeRef::parse(qualified));
        }

        match scope.imports.get(first) {
            Some(import) if !is_path_keyword(first) => {
                let mut segments = import.segments.clone();
                segments.extend(rest.iter().cloned());
                self.qualify(&scope.module, &WrittenPath::new(import.leading_colon, segments))
            }
            _ => self.qualify(&scope.module, path),
        }
    }

    /// Qualify an absolute or module-relative path. Crate-internal results
    /// must name a declared type.
    fn qualify(&self, module: &str, path: &WrittenPath) -> Option<TypeRef> {
        let absolute = self.absolutize(module, path)?;
        if absolute.starts_with("crate::") {
            return TypeRef::parse(&self.canonical(&absolute, 0)?);
        }
        TypeRef::parse(&absolute)
    }

    /// Declared path a crate path stands for, following `pub use` items.
    fn canonical(&self, absolute: &str, depth: usize) -> Option<String> {
        if self.declared.contains(absolute) {
            return Some(absolute.to_string());
        }
        if depth >= MAX_REEXPORT_DEPTH {
            return None;
        }
        let (module, name) = absolute.rsplit_once("::")?;
        if let Some((origin, path)) = self.reexports.get(absolute) {
            let target = self.absolutize(origin, path)?;
            if target.starts_with("crate::") {
                return self.canonical(&target, depth + 1);
            }
            return Some(target);
        }
        self.reexport_globs.get(module)?.iter().find_map(|glob| {
            let base = self
                .absolutize(module, glob)
                .filter(|base| base == "crate" || base.starts_with("crate::"))?;
            self.canonical(&format!("{}::{}", base, name), depth + 1)
        })
    }

    fn absolutize(&self, module: &str, path: &WrittenPath) -> Option<String> {
        if path.leading_colon {
            return Some(path.segments.join("::"));
        }
        let (first, rest) = path.segments.split_first()?;
        match first.as_str() {
            "crate" => Some(path.segments.join("::")),
            "self" => Some(join_module(module, rest)),
            "super" => {
                let mut base: Vec<&str> = module.split("::").collect();
                let mut remaining = path.segments.as_slice();
                while let Some((segment, tail)) = remaining.split_first() {
                    if segment != "super" {
                        break;
                    }
                    if base.len() <= 1 {
                        return None;
                    }
                    base.pop();
                    remaining = tail;
                }
                Some(join_module(&base.join("::"), remaining))
            }
            _ if self.modules.contains(&format!("{}::{}", module, first)) => {
                Some(join_module(module, &path.segments))
            }
            _ => Some(path.segments.join("::")),
        }
    }
}

impl SymbolTable for SourceSymbolTable {
    fn marked_symbols(&self) -> Vec<Symbol> {
        self.symbols.clone()
    }

    fn owner_type(&self, symbol: &Symbol) -> Option<TypeRef> {
        let scope = self.scopes.get(symbol.scope)?;
        self.resolve(scope, symbol.owner.as_ref()?, None)
    }

    fn parameter_types(&self, symbol: &Symbol) -> Option<Vec<TypeRef>> {
        let scope = self.scopes.get(symbol.scope)?;
        let owner = self.owner_type(symbol);
        symbol
            .params
            .iter()
            .map(|param| match &param.shape {
                ParamShape::Shared(path) => self.resolve(scope, path, owner.as_ref()),
                ParamShape::Unsupported { .. } => None,
            })
            .collect()
    }
}

fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Use(item) => &item.attrs,
        Item::Struct(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        _ => &[],
    }
}

/// Whether a `#[cfg(..)]` on the item only holds in test builds.
fn is_test_only(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("cfg"))
        .filter_map(|attr| attr.parse_args::<Meta>().ok())
        .any(|predicate| requires_test(&predicate))
}

fn requires_test(predicate: &Meta) -> bool {
    match predicate {
        Meta::Path(path) => path.is_ident("test"),
        Meta::List(list) => {
            let Ok(nested) = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
            else {
                return false;
            };
            if list.path.is_ident("all") {
                nested.iter().any(requires_test)
            } else if list.path.is_ident("any") {
                !nested.is_empty() && nested.iter().all(requires_test)
            } else {
                false
            }
        }
        Meta::NameValue(_) => false,
    }
}

fn is_path_keyword(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

fn join_module(module: &str, rest: &[String]) -> String {
    std::iter::once(module.to_string())
        .chain(rest.iter().cloned())
        .collect::<Vec<_>>()
        .join("::")
}

fn written_path(path: &syn::Path) -> WrittenPath {
    WrittenPath::new(
        path.leading_colon.is_some(),
        path.segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect(),
    )
}

fn collect_use(tree: &UseTree, prefix: Vec<String>, leading: bool, scope: &mut Scope) {
    match tree {
        UseTree::Path(path) => {
            let mut next = prefix;
            next.push(path.ident.to_string());
            collect_use(&path.tree, next, leading, scope);
        }
        UseTree::Name(name) => {
            if name.ident == "self" {
                if let Some(alias) = prefix.last().cloned() {
                    scope.imports.insert(alias, WrittenPath::new(leading, prefix));
                }
            } else {
                let alias = name.ident.to_string();
                let mut path = prefix;
                path.push(alias.clone());
                scope.imports.insert(alias, WrittenPath::new(leading, path));
            }
        }
        UseTree::Rename(rename) => {
            if rename.rename == "_" {
                return;
            }
            let mut path = prefix;
            if rename.ident != "self" {
                path.push(rename.ident.to_string());
            }
            scope
                .imports
                .insert(rename.rename.to_string(), WrittenPath::new(leading, path));
        }
        UseTree::Glob(_) => scope.globs.push(WrittenPath::new(leading, prefix)),
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use(item, prefix.clone(), leading, scope);
            }
        }
    }
}

fn constructor_kind(item: &ItemImpl, method: &ImplItemFn, owner: Option<&WrittenPath>) -> SymbolKind {
    let reason = if item.trait_.is_some() {
        Some("trait impl methods cannot be injectable constructors")
    } else if owner.is_none() {
        Some("owning type is not a nominal type")
    } else if method.sig.receiver().is_some() {
        Some("constructors cannot take `self`")
    } else if method.sig.asyncness.is_some() {
        Some("constructors cannot be async")
    } else if !method.sig.generics.params.is_empty() {
        Some("constructors cannot have generic parameters")
    } else if !returns_owner(&method.sig.output, owner) {
        Some("constructors must return `Self`")
    } else {
        None
    };

    match reason {
        Some(reason) => SymbolKind::NotConstructor {
            reason: reason.to_string(),
        },
        None => SymbolKind::Constructor,
    }
}

fn returns_owner(output: &ReturnType, owner: Option<&WrittenPath>) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(type_path) = &**ty else {
        return false;
    };
    if type_path.qself.is_some() {
        return false;
    }
    let Some(last) = type_path.path.segments.last() else {
        return false;
    };
    if !last.arguments.is_empty() {
        return false;
    }
    last.ident == "Self" || owner.and_then(WrittenPath::last).is_some_and(|name| last.ident == name)
}

/// `Arc<T>` with `T` a plain path is a dependency on `T`.
fn param_shape(ty: &Type) -> ParamShape {
    shared_inner(ty)
        .map(ParamShape::Shared)
        .unwrap_or_else(|| ParamShape::Unsupported {
            written: ty.to_token_stream().to_string(),
        })
}

fn shared_inner(ty: &Type) -> Option<WrittenPath> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let Some(GenericArgument::Type(Type::Path(inner))) = args.args.first() else {
        return None;
    };
    if inner.qself.is_some() || inner.path.segments.iter().any(|s| !s.arguments.is_empty()) {
        return None;
    }
    Some(written_path(&inner.path))
}
