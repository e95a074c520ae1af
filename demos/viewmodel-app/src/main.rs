use tracing_subscriber::EnvFilter;
use viewmodel_app::MyViewModel;
use viewmodel_app::di;
use viewmodel_app::platform::Context;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let component = di::component(Context::new("com.example.viewmodel"));
    let view_model = component.inject::<MyViewModel>()?;

    tracing::info!("Resolved view model using {}", view_model.repo().net().base_url());
    println!("{}", view_model.greeting());
    Ok(())
}
