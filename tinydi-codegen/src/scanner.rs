use crate::descriptor::InjectDescriptor;
use crate::error::{CodegenError, Diagnostic, DiagnosticKind, Diagnostics, Result};
use crate::symbol::{ParamShape, Symbol, SymbolKind, SymbolTable};
use crate::type_ref::TypeRef;
use std::collections::{BTreeMap, HashSet};

/// Result of scanning one round.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub descriptors: Vec<InjectDescriptor>,
    pub deferred: Vec<Symbol>,
}

/// Turns marked declarations into descriptors.
///
/// The scanner sees the cumulative state of earlier rounds: symbols that
/// already produced a descriptor are skipped, and targets recorded earlier
/// count for duplicate detection.
pub struct Scanner<'a> {
    processed: &'a HashSet<String>,
    known: &'a BTreeMap<TypeRef, InjectDescriptor>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        processed: &'a HashSet<String>,
        known: &'a BTreeMap<TypeRef, InjectDescriptor>,
    ) -> Self {
        Self { processed, known }
    }

    /// Scan every marked symbol of `table`.
    ///
    /// # Errors
    /// Any invalid declaration fails the whole round with every diagnostic
    /// found; no descriptor of the round is returned in that case.
    pub fn scan(&self, table: &dyn SymbolTable) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();
        let mut diagnostics = Diagnostics::default();
        let mut round: BTreeMap<TypeRef, InjectDescriptor> = BTreeMap::new();

        for symbol in table.marked_symbols() {
            if self.processed.contains(&symbol.key()) {
                continue;
            }
            if let Some(diagnostic) = check_shape(&symbol) {
                diagnostics.push(diagnostic);
                continue;
            }

            let (Some(target), Some(parameters)) =
                (table.owner_type(&symbol), table.parameter_types(&symbol))
            else {
                tracing::debug!("Deferring {} at {}", symbol, symbol.location);
                outcome.deferred.push(symbol);
                continue;
            };

            if let Some(existing) = self.known.get(&target).or_else(|| round.get(&target)) {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::DuplicateBinding,
                    location: symbol.location.clone(),
                    symbol: symbol.to_string(),
                    message: format!(
                        "{} already has an injectable constructor `{}` at {}",
                        target, existing.constructor, existing.location
                    ),
                });
                continue;
            }

            let descriptor =
                InjectDescriptor::new(target.clone(), &symbol.name, parameters, symbol.location);
            tracing::debug!(
                "Found injectable {}::{} with {} parameters",
                descriptor.target,
                descriptor.constructor,
                descriptor.arity()
            );
            round.insert(target, descriptor.clone());
            outcome.descriptors.push(descriptor);
        }

        if !diagnostics.is_empty() {
            return Err(CodegenError::Validation(diagnostics));
        }
        Ok(outcome)
    }
}

fn check_shape(symbol: &Symbol) -> Option<Diagnostic> {
    let (kind, message) = if let SymbolKind::NotConstructor { reason } = &symbol.kind {
        (DiagnosticKind::NotAConstructor, reason.clone())
    } else if symbol.owner_generic {
        (
            DiagnosticKind::GenericOwner,
            "generic types cannot be injected".to_string(),
        )
    } else if let Some((param, written)) = symbol.params.iter().find_map(|param| match &param.shape {
        ParamShape::Unsupported { written } => Some((param, written)),
        ParamShape::Shared(_) => None,
    }) {
        (
            DiagnosticKind::UnsupportedParameter,
            format!(
                "parameter `{}: {}` must be an `Arc<T>` of a non-generic type",
                param.name, written
            ),
        )
    } else {
        return None;
    };

    Some(Diagnostic {
        kind,
        location: symbol.location.clone(),
        symbol: symbol.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SourceFile, SourceSymbolTable};

    const NET: &str = r#"
        pub struct NetworkClient;

        impl NetworkClient {
            #[inject]
            pub fn new() -> Self { NetworkClient }
        }
    "#;

    const REPO: &str = r#"
        use std::sync::Arc;
        use crate::net::NetworkClient;

        pub struct Repository1 { net: Arc<NetworkClient> }

        impl Repository1 {
            #[inject]
            pub fn new(net: Arc<NetworkClient>) -> Self { Self { net } }
        }
    "#;

    fn table(files: &[(&str, &str, &str)]) -> SourceSymbolTable {
        let mut table = SourceSymbolTable::new("inject");
        for (path, module, content) in files {
            table.add_source(&SourceFile::new(*path, *module, *content)).unwrap();
        }
        table
    }

    fn scan(table: &SourceSymbolTable) -> Result<ScanOutcome> {
        let processed = HashSet::new();
        let known = BTreeMap::new();
        Scanner::new(&processed, &known).scan(table)
    }

    #[test]
    fn test_descriptors_keep_parameter_order() {
        let view_model = r#"
            use std::sync::Arc;
            use crate::net::NetworkClient;
            use crate::repo::Repository1;
            use platform::Context;

            pub struct ViewModel;

            impl ViewModel {
                #[inject]
                pub fn new(ctx: Arc<Context>, net: Arc<NetworkClient>, repo: Arc<Repository1>) -> Self {
                    ViewModel
                }
            }
        "#;
        let table = table(&[
            ("src/net.rs", "crate::net", NET),
            ("src/repo.rs", "crate::repo", REPO),
            ("src/view_model.rs", "crate::view_model", view_model),
        ]);

        let outcome = scan(&table).unwrap();

        assert!(outcome.deferred.is_empty());
        assert_eq!(outcome.descriptors.len(), 3);
        let vm = &outcome.descriptors[2];
        assert_eq!(vm.target, TypeRef::new("crate::view_model", "ViewModel"));
        assert_eq!(vm.constructor, "new");
        assert_eq!(
            vm.parameters,
            vec![
                TypeRef::new("platform", "Context"),
                TypeRef::new("crate::net", "NetworkClient"),
                TypeRef::new("crate::repo", "Repository1"),
            ]
        );
    }

    #[test]
    fn test_unresolvable_symbol_is_deferred() {
        let table = table(&[("src/repo.rs", "crate::repo", REPO)]);

        let outcome = scan(&table).unwrap();

        assert!(outcome.descriptors.is_empty());
        assert_eq!(outcome.deferred.len(), 1);
        assert_eq!(outcome.deferred[0].name, "new");
    }

    #[test]
    fn test_duplicate_constructor_is_rejected() {
        let source = r#"
            pub struct NetworkClient;

            impl NetworkClient {
                #[inject]
                pub fn new() -> Self { NetworkClient }

                #[inject]
                pub fn offline() -> Self { NetworkClient }
            }
        "#;
        let table = table(&[("src/net.rs", "crate::net", source)]);

        let err = scan(&table).unwrap_err();

        let CodegenError::Validation(diagnostics) = err else {
            panic!("expected validation error");
        };
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has(DiagnosticKind::DuplicateBinding));
        assert!(diagnostics.to_string().contains("NetworkClient::offline"));
    }

    #[test]
    fn test_duplicate_across_rounds_is_rejected() {
        let table = table(&[("src/net.rs", "crate::net", NET)]);
        let first = scan(&table).unwrap();

        let known: BTreeMap<TypeRef, InjectDescriptor> = first
            .descriptors
            .into_iter()
            .map(|d| (d.target.clone(), d))
            .collect();
        let processed = HashSet::new();
        let err = Scanner::new(&processed, &known).scan(&table).unwrap_err();

        assert!(matches!(err, CodegenError::Validation(ref d) if d.has(DiagnosticKind::DuplicateBinding)));
    }

    #[test]
    fn test_processed_symbols_are_skipped() {
        let table = table(&[("src/net.rs", "crate::net", NET)]);
        let processed: HashSet<String> = table.marked_symbols().iter().map(Symbol::key).collect();
        let known = BTreeMap::new();

        let outcome = Scanner::new(&processed, &known).scan(&table).unwrap();

        assert!(outcome.descriptors.is_empty());
        assert!(outcome.deferred.is_empty());
    }

    #[test]
    fn test_all_invalid_declarations_are_reported() {
        let source = r#"
            use std::sync::Arc;
            pub struct Cache<T>(T);
            pub struct Plain;
            pub struct Valid;

            impl<T> Cache<T> {
                #[inject]
                pub fn new() -> Self { todo!() }
            }

            impl Plain {
                #[inject]
                pub fn new(name: String) -> Self { Plain }
            }

            impl Valid {
                #[inject]
                pub fn new() -> Self { Valid }
            }

            #[inject]
            pub fn build() -> Plain { Plain }
        "#;
        let table = table(&[("src/lib.rs", "crate", source)]);

        let err = scan(&table).unwrap_err();

        let CodegenError::Validation(diagnostics) = err else {
            panic!("expected validation error");
        };
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.has(DiagnosticKind::GenericOwner));
        assert!(diagnostics.has(DiagnosticKind::UnsupportedParameter));
        assert!(diagnostics.has(DiagnosticKind::NotAConstructor));
        assert!(diagnostics.to_string().contains("parameter `name: String`"));
    }
}
