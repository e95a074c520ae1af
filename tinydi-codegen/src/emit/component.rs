use super::render;
use crate::config::GeneratorConfig;
use crate::descriptor::InjectDescriptor;
use crate::error::{CodegenError, Result};
use crate::sink::{Artifact, ArtifactKind, Dependencies, snake_case};
use quote::{format_ident, quote};
use std::collections::BTreeSet;

/// Emits the aggregated component: a closed dispatch table with one
/// constructor function per descriptor, and the component type alias over
/// the runtime resolver.
pub struct ComponentEmitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ComponentEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn emit<'d, I>(&self, descriptors: I) -> Result<Artifact>
    where
        I: IntoIterator<Item = &'d InjectDescriptor>,
    {
        let runtime: syn::Path = syn::parse_str(&self.config.runtime_path).map_err(|_| {
            CodegenError::config(format!(
                "runtime path `{}` is not a path",
                self.config.runtime_path
            ))
        })?;
        let component: syn::Ident = syn::parse_str(&self.config.component_name).map_err(|_| {
            CodegenError::config(format!(
                "component name `{}` is not an identifier",
                self.config.component_name
            ))
        })?;
        let dispatch = format_ident!("{}Dispatch", component);

        let mut descriptors: Vec<&InjectDescriptor> = descriptors.into_iter().collect();
        descriptors.sort_by(|a, b| a.target.cmp(&b.target));

        let mut entries = Vec::with_capacity(descriptors.len());
        let mut constructors = Vec::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.iter().enumerate() {
            let function = format_ident!("construct_{}_{}", i, snake_case(descriptor.target.name()));
            let target = descriptor.target.to_tokens();
            let factory = descriptor.target.sibling(&descriptor.factory_name());
            let args: Vec<_> = (0..descriptor.arity()).map(|i| format_ident!("p{}", i)).collect();
            let resolver = if args.is_empty() {
                format_ident!("_resolver")
            } else {
                format_ident!("resolver")
            };
            let resolutions = args.iter().zip(&descriptor.parameters).map(|(arg, ty)| {
                let ty = ty.to_tokens();
                quote!(let #arg = #resolver.resolve_as::<#ty>()?;)
            });

            entries.push(quote!(#runtime::Entry::new(#runtime::TypeKey::of::<#target>, #function)));
            constructors.push(quote! {
                fn #function(#resolver: &#runtime::Resolver<#dispatch>) -> #runtime::Result<#runtime::Instance> {
                    #(#resolutions)*
                    Ok(::std::sync::Arc::new(#factory::create(#(#args),*)))
                }
            });
        }

        let tokens = quote! {
            pub enum #dispatch {}

            impl #runtime::Dispatch for #dispatch {
                const ENTRIES: &'static [#runtime::Entry<Self>] = &[#(#entries),*];
            }

            pub type #component = #runtime::Resolver<#dispatch>;

            #(#constructors)*
        };

        let sources: BTreeSet<_> = descriptors
            .iter()
            .map(|descriptor| descriptor.location.file.clone())
            .collect();

        Ok(Artifact {
            namespace: self.config.component_namespace.clone(),
            name: self.config.component_name.clone(),
            kind: ArtifactKind::Component,
            content: render(tokens),
            dependencies: Dependencies::aggregating(sources.into_iter().collect()),
        })
    }
}
