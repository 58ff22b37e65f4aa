#[tokio::main]
async fn main() {
    if let Err(e) = anesguardian::run().await {
        eprintln!("anesguardian: {e}");
        std::process::exit(1);
    }
}
