use anyhow::Result;

// Print the OpenAPI document for the form endpoints
fn main() -> Result<()> {
    let doc = gatehouse::server::openapi();

    println!("{}", doc.to_pretty_json()?);

    Ok(())
}
