//! Setup-flow harness — drives the install-code flow against a live install
//! service, simulating the browser-tab phase and the installed-app phase in
//! one process.
//!
//! ```bash
//! cargo run -p clinpush-client --bin setup-flow -- \
//!     --base-url http://localhost:3117 --email user@example.com
//! ```
//!
//! Exits 0 when the code survives the storage round-trip and redeems.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use clinpush_client::api::{CreateInstallRequest, HttpInstallApi, InstallApi};
use clinpush_client::backends::{StoragePaths, detect_backends};
use clinpush_client::bridge::Bridge;

#[derive(Parser)]
#[command(about = "Drive the install-code flow against a live service")]
struct Args {
    /// Base URL of the install service (e.g. http://localhost:3117)
    #[arg(long)]
    base_url: String,

    /// Email to issue the code for
    #[arg(long)]
    email: String,

    /// Storage root for the bridge backends (defaults to the system temp dir)
    #[arg(long)]
    storage_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let root = args
        .storage_dir
        .unwrap_or_else(|| std::env::temp_dir().join("clinpush-setup-flow"));
    let paths = StoragePaths {
        data_dir: root.join("data"),
        cache_dir: root.join("cache"),
    };
    let backends = detect_backends(&paths);
    println!("{} storage backend(s) available", backends.len());
    let bridge = Bridge::new(backends);

    let api = HttpInstallApi::new(reqwest::Client::new(), args.base_url.clone());

    // Phase 1 — browser tab: issue a code and park it in every backend.
    let issued = api
        .create_install(CreateInstallRequest {
            email: &args.email,
            name: None,
            wh_id: None,
            inst: None,
            redirect_to: None,
        })
        .await?;
    println!("issued code {} (reused: {})", issued.code, issued.reused);
    bridge
        .write("install_code", serde_json::json!({ "code": issued.code }))
        .await;

    // Phase 2 — installed app: recover the code from storage and redeem it.
    let record = bridge
        .read("install_code", chrono::Duration::days(90))
        .await
        .ok_or_else(|| anyhow::anyhow!("no code recoverable from any backend"))?;
    let code = record.value["code"]
        .as_str()
        .unwrap_or_default()
        .to_owned();
    println!("recovered code {code} from storage");

    let exchanged = api.exchange_install(&code, None).await?;
    println!(
        "exchanged for OTP ({} of {} uses): email={} otp={}",
        exchanged.use_count, exchanged.max_uses, exchanged.email, exchanged.email_otp
    );
    Ok(())
}
