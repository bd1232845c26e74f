#[tokio::main]
pub async fn main() {
    // Configure env_logger to see initialization logs.
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("feature_bootstrap"))
        .init();

    let client_key = std::env::var("GROWTHBOOK_CLIENT_KEY")
        .expect("GROWTHBOOK_CLIENT_KEY env variable should contain client key");
    let client = feature_bootstrap::ClientConfig::from_client_key(client_key)
        .enable_dev_mode(true)
        .to_client();

    // Concurrent lookups share a single fetch.
    let (banner, dark_mode) = tokio::join!(
        client.get_string("banner_text", "Welcome"),
        client.is_on("dark_mode"),
    );

    if let Err(err) = client.ensure().await {
        println!("features unavailable, using defaults: {:?}", err);
    }

    println!("Banner: {banner}");
    println!("Dark mode: {dark_mode}");
}
