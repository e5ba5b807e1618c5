/// Entry point for the Garden Tagger.
///
/// Connects to the local Garden server and logs the tags of its containers
/// until interrupted. Logging is configured through `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the Garden server
/// stays unreachable.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug GARDEN_ADDRESS=/var/vcap/data/garden/garden.sock cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    garden_tagger::run().await
}
