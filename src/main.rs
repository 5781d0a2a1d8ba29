#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quran_academy::run().await {
        eprintln!("quran-academy fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
