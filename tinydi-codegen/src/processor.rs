//! Multi-round processing.
//!
//! Every round scans the whole table before anything is written, so an
//! invalid declaration anywhere in the round leaves the sink untouched.

use crate::config::GeneratorConfig;
use crate::descriptor::InjectDescriptor;
use crate::emit::{ComponentEmitter, FactoryEmitter};
use crate::error::{CodegenError, Result};
use crate::graph::{DependencyGraph, format_cycle};
use crate::scanner::Scanner;
use crate::sink::{Artifact, CodeSink};
use crate::symbol::{Symbol, SymbolTable};
use crate::type_ref::TypeRef;
use std::collections::{BTreeMap, HashSet};

/// What one round produced.
#[derive(Debug, Default)]
pub struct RoundOutcome {
    pub emitted: Vec<Artifact>,
    pub deferred: Vec<Symbol>,
}

impl RoundOutcome {
    pub fn progressed(&self) -> bool {
        !self.emitted.is_empty()
    }
}

/// Summary of a finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub rounds: usize,
    pub descriptors: usize,
    pub component: String,
    /// Dependencies without a descriptor, expected to be bound at runtime.
    pub unbound: Vec<TypeRef>,
    pub cycle: Option<String>,
}

pub struct Processor {
    config: GeneratorConfig,
    descriptors: BTreeMap<TypeRef, InjectDescriptor>,
    processed: HashSet<String>,
    deferred: Vec<Symbol>,
    rounds: usize,
}

impl Processor {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            descriptors: BTreeMap::new(),
            processed: HashSet::new(),
            deferred: Vec::new(),
            rounds: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &InjectDescriptor> {
        self.descriptors.values()
    }

    pub fn deferred(&self) -> &[Symbol] {
        &self.deferred
    }

    /// Run one round against `table`, writing a factory per new descriptor.
    pub fn process(
        &mut self,
        table: &dyn SymbolTable,
        sink: &mut dyn CodeSink,
    ) -> Result<RoundOutcome> {
        self.rounds += 1;
        let scanned = Scanner::new(&self.processed, &self.descriptors).scan(table)?;

        let mut outcome = RoundOutcome {
            emitted: Vec::with_capacity(scanned.descriptors.len()),
            deferred: scanned.deferred,
        };
        for descriptor in scanned.descriptors {
            let artifact = FactoryEmitter::emit(&descriptor);
            sink.write(&artifact)?;
            tracing::debug!("Emitted {}", artifact.qualified_name());
            outcome.emitted.push(artifact);
            self.descriptors.insert(descriptor.target.clone(), descriptor);
        }
        self.processed = table
            .marked_symbols()
            .iter()
            .map(Symbol::key)
            .filter(|key| !outcome.deferred.iter().any(|symbol| symbol.key() == *key))
            .collect();
        self.deferred = outcome.deferred.clone();

        tracing::info!(
            "Round {}: {} factories emitted, {} symbols deferred",
            self.rounds,
            outcome.emitted.len(),
            outcome.deferred.len()
        );
        Ok(outcome)
    }

    /// Emit the component. Consumes the processor, so it runs once.
    pub fn finish(self, sink: &mut dyn CodeSink) -> Result<GenerationReport> {
        if !self.deferred.is_empty() {
            let symbols = self
                .deferred
                .iter()
                .map(|symbol| format!("{} ({})", symbol, symbol.location))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CodegenError::UnresolvedSymbols {
                rounds: self.rounds,
                symbols,
            });
        }

        let graph = DependencyGraph::new(self.descriptors.values());
        let cycle = graph.find_cycle().map(|cycle| format_cycle(&cycle));
        if let Some(cycle) = &cycle {
            if self.config.deny_cycles {
                return Err(CodegenError::Cycle {
                    cycle: cycle.clone(),
                });
            }
            tracing::warn!("Dependency cycle, injecting any of these will not terminate: {}", cycle);
        }
        let unbound = graph.unbound();
        if !unbound.is_empty() {
            let names: Vec<String> = unbound.iter().map(TypeRef::qualified).collect();
            tracing::info!("Must be bound at runtime: {}", names.join(", "));
        }

        let artifact = ComponentEmitter::new(&self.config).emit(self.descriptors.values())?;
        sink.write(&artifact)?;
        tracing::info!(
            "Generated {} with {} injectables in {} rounds",
            artifact.qualified_name(),
            self.descriptors.len(),
            self.rounds
        );

        Ok(GenerationReport {
            rounds: self.rounds,
            descriptors: self.descriptors.len(),
            component: artifact.qualified_name(),
            unbound,
            cycle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::sink::{ArtifactKind, MemorySink};
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
        use platform::Context;

        pub struct Repository1;

        impl Repository1 {
            #[inject]
            pub fn new(net: Arc<NetworkClient>, ctx: Arc<Context>) -> Self { Repository1 }
        }
    "#;

    fn table(files: &[(&str, &str, &str)]) -> SourceSymbolTable {
        let mut table = SourceSymbolTable::new("inject");
        for (path, module, content) in files {
            table.add_source(&SourceFile::new(*path, *module, *content)).unwrap();
        }
        table
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_single_round_generation() {
        init_tracing();
        let table = table(&[
            ("src/net.rs", "crate::net", NET),
            ("src/repo.rs", "crate::repo", REPO),
        ]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default());

        let round = processor.process(&table, &mut sink).unwrap();
        assert_eq!(round.emitted.len(), 2);
        assert!(round.deferred.is_empty());

        let report = processor.finish(&mut sink).unwrap();
        assert_eq!(report.rounds, 1);
        assert_eq!(report.descriptors, 2);
        assert_eq!(report.component, "crate::di::TinyDiComponent");
        assert_eq!(report.unbound, vec![TypeRef::new("platform", "Context")]);
        assert!(report.cycle.is_none());

        assert_eq!(sink.len(), 3);
        let component = sink.get("crate::di::TinyDiComponent").unwrap();
        assert_eq!(component.kind, ArtifactKind::Component);
        assert!(sink.get("crate::net::NetworkClientFactory").is_some());
        assert!(sink.get("crate::repo::Repository1Factory").is_some());
    }

    #[test]
    fn test_invalid_round_writes_nothing() {
        let invalid = r#"
            pub struct Broken;

            impl Broken {
                #[inject]
                pub fn new(name: String) -> Self { Broken }
            }
        "#;
        let table = table(&[
            ("src/net.rs", "crate::net", NET),
            ("src/broken.rs", "crate::broken", invalid),
        ]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default());

        let err = processor.process(&table, &mut sink).unwrap_err();

        assert!(matches!(err, CodegenError::Validation(ref d) if d.has(DiagnosticKind::UnsupportedParameter)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_deferred_symbol_resolves_in_later_round() {
        let mut table = table(&[("src/repo.rs", "crate::repo", REPO)]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default());

        let first = processor.process(&table, &mut sink).unwrap();
        assert!(first.emitted.is_empty());
        assert_eq!(first.deferred.len(), 1);

        table.add_source(&SourceFile::new("src/net.rs", "crate::net", NET)).unwrap();
        let second = processor.process(&table, &mut sink).unwrap();
        assert_eq!(second.emitted.len(), 2);
        assert!(second.deferred.is_empty());

        let third = processor.process(&table, &mut sink).unwrap();
        assert!(!third.progressed());

        let report = processor.finish(&mut sink).unwrap();
        assert_eq!(report.rounds, 3);
        assert_eq!(report.descriptors, 2);
    }

    #[test]
    fn test_unresolved_symbols_fail_finish() {
        let table = table(&[("src/repo.rs", "crate::repo", REPO)]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default());

        processor.process(&table, &mut sink).unwrap();
        let err = processor.finish(&mut sink).unwrap_err();

        let CodegenError::UnresolvedSymbols { rounds, symbols } = err else {
            panic!("expected unresolved symbols");
        };
        assert_eq!(rounds, 1);
        assert!(symbols.contains("Repository1::new"));
        assert!(sink.get("crate::di::TinyDiComponent").is_none());
    }

    const CYCLE: &str = r#"
        use std::sync::Arc;

        pub struct Egg;
        pub struct Chicken;

        impl Egg {
            #[inject]
            pub fn new(chicken: Arc<Chicken>) -> Self { Egg }
        }

        impl Chicken {
            #[inject]
            pub fn new(egg: Arc<Egg>) -> Self { Chicken }
        }
    "#;

    #[test]
    fn test_cycle_is_reported_but_generated() {
        init_tracing();
        let table = table(&[("src/farm.rs", "crate::farm", CYCLE)]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default());

        processor.process(&table, &mut sink).unwrap();
        let report = processor.finish(&mut sink).unwrap();

        assert_eq!(
            report.cycle.as_deref(),
            Some("crate::farm::Chicken -> crate::farm::Egg -> crate::farm::Chicken")
        );
        assert!(sink.get("crate::di::TinyDiComponent").is_some());
    }

    #[test]
    fn test_cycle_is_fatal_when_denied() {
        let table = table(&[("src/farm.rs", "crate::farm", CYCLE)]);
        let mut sink = MemorySink::new();
        let mut processor = Processor::new(GeneratorConfig::default().deny_cycles(true));

        processor.process(&table, &mut sink).unwrap();
        let err = processor.finish(&mut sink).unwrap_err();

        assert!(matches!(err, CodegenError::Cycle { .. }));
        assert!(sink.get("crate::di::TinyDiComponent").is_none());
    }
}
