use tinkerbox::{SandboxApp, SandboxConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = SandboxApp::new(SandboxConfig::default())?;
    app.run()?;
    Ok(())
}
