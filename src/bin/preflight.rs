use brain_gym_coach::storage::open_store;
use brain_gym_coach::{AppConfig, StoreBackend};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads the same env vars as api_server:\n\
           STORE_BACKEND (memory|postgres), DATABASE_URL, OPENAI_API_KEY,\n\
           OPENAI_BASE_URL, OPENAI_MODEL, GATEWAY_TIMEOUT_SECS, BIND_ADDR\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  BIND_ADDR={}", config.bind_addr);
    println!("  STORE_BACKEND={:?}", config.store_backend);
    println!("  OPENAI_BASE_URL={}", config.vision.base_url);
    println!("  OPENAI_MODEL={}", config.vision.model);
    println!("  GATEWAY_TIMEOUT_SECS={}", config.vision.timeout.as_secs());

    let store = open_store(&config).await?;
    store
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("Store is not reachable: {}", e))?;
    match config.store_backend {
        StoreBackend::Postgres => println!("  Postgres reachable, tables ensured."),
        StoreBackend::Memory => println!("  In-memory store (data is lost on restart)."),
    }

    if config.vision.api_key.is_none() {
        return Err(anyhow::anyhow!(
            "OPENAI_API_KEY is not set; exercise validation cannot run"
        ));
    }
    println!("  OPENAI_API_KEY present.");

    println!("> Preflight OK.");
    Ok(())
}
