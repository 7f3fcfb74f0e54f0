use std::fs;

fn main() -> anyhow::Result<()> {
    let port = rolegate::config::app_port();
    let doc = rolegate::docs::build_openapi(port)?;
    let s = serde_json::to_string_pretty(&doc)?;

    let path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    fs::write(&path, s)?;
    println!("wrote {}", path);
    Ok(())
}
