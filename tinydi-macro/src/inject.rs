use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ItemFn, ReturnType};

pub fn inject_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    let item = TokenStream2::from(item);
    let expanded = match check_constructor(attr, item.clone()) {
        Ok(()) => item,
        Err(err) => {
            let error = err.to_compile_error();
            quote! {
                #error
                #item
            }
        }
    };
    TokenStream::from(expanded)
}

/// Reject what can never be an injectable constructor. Whether the function
/// sits in an inherent impl is only visible to the generator.
fn check_constructor(attr: TokenStream2, item: TokenStream2) -> syn::Result<()> {
    if !attr.is_empty() {
        return Err(syn::Error::new(attr.span(), "#[inject] takes no arguments"));
    }

    let func: ItemFn = syn::parse2(item).map_err(|err| {
        syn::Error::new(
            err.span(),
            "#[inject] can only be applied to constructor functions",
        )
    })?;
    let sig = &func.sig;

    if let Some(receiver) = sig.inputs.iter().find_map(|arg| match arg {
        FnArg::Receiver(receiver) => Some(receiver),
        FnArg::Typed(_) => None,
    }) {
        return Err(syn::Error::new(
            receiver.span(),
            "#[inject] constructors cannot take `self`",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "#[inject] constructors cannot be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "#[inject] constructors cannot be generic",
        ));
    }
    if let ReturnType::Default = sig.output {
        return Err(syn::Error::new(
            sig.ident.span(),
            "#[inject] constructors must return `Self`",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_constructor() {
        let item = quote! {
            pub fn new(net: Arc<NetworkClient>) -> Self { Self { net } }
        };
        assert!(check_constructor(TokenStream2::new(), item).is_ok());
    }

    #[test]
    fn test_rejects_receiver() {
        let item = quote! {
            fn rebuild(&self) -> Self { todo!() }
        };
        let err = check_constructor(TokenStream2::new(), item).unwrap_err();
        assert!(err.to_string().contains("cannot take `self`"));
    }

    #[test]
    fn test_rejects_generic_constructor() {
        let item = quote! {
            fn new<T>(value: Arc<T>) -> Self { todo!() }
        };
        let err = check_constructor(TokenStream2::new(), item).unwrap_err();
        assert!(err.to_string().contains("cannot be generic"));
    }

    #[test]
    fn test_rejects_non_function() {
        let item = quote! {
            struct NetworkClient;
        };
        let err = check_constructor(TokenStream2::new(), item).unwrap_err();
        assert!(err.to_string().contains("constructor functions"));
    }

    #[test]
    fn test_rejects_arguments() {
        let err = check_constructor(quote!(singleton), quote!(fn new() -> Self { Self })).unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }
}
