use super::render;
use crate::descriptor::InjectDescriptor;
use crate::sink::{Artifact, ArtifactKind, Dependencies};
use crate::type_ref::ident;
use quote::{format_ident, quote};

/// Emits `<Name>Factory`, whose `create` forwards its arguments to the
/// injectable constructor. It resolves nothing itself.
pub struct FactoryEmitter;

impl FactoryEmitter {
    pub fn emit(descriptor: &InjectDescriptor) -> Artifact {
        let factory = ident(&descriptor.factory_name());
        let target = descriptor.target.to_tokens();
        let constructor = ident(&descriptor.constructor);
        let args: Vec<_> = (0..descriptor.arity()).map(|i| format_ident!("p{}", i)).collect();
        let params = args.iter().zip(&descriptor.parameters).map(|(arg, ty)| {
            let ty = ty.to_tokens();
            quote!(#arg: ::std::sync::Arc<#ty>)
        });

        let tokens = quote! {
            #[derive(Debug, Clone, Copy, Default)]
            pub struct #factory;

            impl #factory {
                pub fn create(#(#params),*) -> #target {
                    #target::#constructor(#(#args),*)
                }
            }
        };

        Artifact {
            namespace: descriptor.target.module().to_string(),
            name: descriptor.factory_name(),
            kind: ArtifactKind::Factory,
            content: render(tokens),
            dependencies: Dependencies::isolating(vec![descriptor.location.file.clone()]),
        }
    }
}
