use tinydi_codegen::Builder;

fn main() -> anyhow::Result<()> {
    let report = Builder::from_env()?.emit_rerun_if_changed(true).generate()?;
    if let Some(cycle) = &report.cycle {
        println!("cargo:warning=dependency cycle: {}", cycle);
    }
    Ok(())
}
