#[tokio::main]
async fn main() {
    if let Err(err) = ap_api::run().await {
        tracing::error!(error = %err, "ap-api failed");
        eprintln!("ap-api failed: {err}");
        std::process::exit(1);
    }
}
