//! Agency Site API - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = agency_api::run().await {
        eprintln!("agency-api: {e}");
        std::process::exit(1);
    }
}
