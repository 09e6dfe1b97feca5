// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/openapi.json

fn main() -> anyhow::Result<()> {
    println!("{}", firewatch_server::openapi::openapi_json()?);
    Ok(())
}
