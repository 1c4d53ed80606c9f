#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linkas_host_lib::run().await
}
