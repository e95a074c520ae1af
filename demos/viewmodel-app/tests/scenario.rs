use std::sync::Arc;
use tinydi::{TinyDiError, TypeKey};
use viewmodel_app::di::{self, TinyDiComponent};
use viewmodel_app::{Context, MyViewModel, NetworkClient, Repository1, Repository2};

#[test]
fn test_view_model_graph_with_bound_context() {
    let context = Arc::new(Context::new("com.example.viewmodel"));
    let mut component = TinyDiComponent::new();
    component.bind(context.clone());

    let view_model = component.inject::<MyViewModel>().unwrap();

    assert!(Arc::ptr_eq(view_model.context(), &context));
    assert!(!Arc::ptr_eq(view_model.repo().net(), view_model.repository2().net()));
    assert_eq!(view_model.greeting(), "Hello com.example.viewmodel!");
}

#[test]
fn test_missing_context_is_reported() {
    let component = TinyDiComponent::new();

    let err = component.inject::<MyViewModel>().unwrap_err();

    assert!(matches!(err, TinyDiError::MissingBinding { .. }));
    assert_eq!(err.type_name(), std::any::type_name::<Context>());
}

#[test]
fn test_repositories_never_share_an_unbound_client() {
    let component = di::component(Context::new("test"));

    let first = component.inject::<Repository1>().unwrap();
    let second = component.inject::<Repository2>().unwrap();

    assert!(!Arc::ptr_eq(first.net(), second.net()));
}

#[test]
fn test_bound_client_is_shared() {
    let client = Arc::new(NetworkClient::new());
    let mut component = di::component(Context::new("test"));
    component.bind(client.clone());

    let view_model = component.inject::<MyViewModel>().unwrap();

    assert!(Arc::ptr_eq(view_model.repo().net(), &client));
    assert!(Arc::ptr_eq(view_model.repository2().net(), &client));
}

#[test]
fn test_bound_instance_is_returned_as_is() {
    let mut component = TinyDiComponent::new();
    let first = Arc::new(Context::new("first"));
    let second = Arc::new(Context::new("second"));

    component.bind(first.clone());
    assert!(Arc::ptr_eq(&component.inject::<Context>().unwrap(), &first));

    component.bind(second.clone());
    assert!(Arc::ptr_eq(&component.inject::<Context>().unwrap(), &second));
}

#[test]
fn test_every_injectable_is_in_the_table() {
    let component = TinyDiComponent::new();

    assert!(component.can_construct::<NetworkClient>());
    assert!(component.can_construct::<Repository1>());
    assert!(component.can_construct::<Repository2>());
    assert!(component.can_construct::<MyViewModel>());
    assert!(!component.can_construct::<Context>());
    assert!(component.resolve(&TypeKey::of::<NetworkClient>()).is_ok());
}

#[test]
fn test_reset_drops_runtime_bindings() {
    let mut component = di::component(Context::new("test"));
    assert!(component.is_bound::<Context>());

    component.reset();

    assert!(!component.is_bound::<Context>());
    assert!(component.inject::<MyViewModel>().is_err());
}
