//! sdx: secure data exchange CLI
//!
//! Commands:
//!   provide  - unwrap an access token, fetch the upstream payload,
//!              encrypt, chunk, upload, and print the manifest address
//!   consume  - fetch a manifest, reassemble and decrypt, write plaintext

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use sdx_core::PipelineConfig;
use sdx_pipeline::{HttpUpstream, Pipeline, ProvideRequest, ProviderSecrets};
use sdx_store::HttpContentStore;

#[derive(Parser, Debug)]
#[command(name = "sdx", version, about = "Secure data exchange pipeline")]
struct Cli {
    /// Path to sdx.toml configuration file
    #[arg(long, short = 'c', env = "SDX_CONFIG", default_value = "sdx.toml")]
    config: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the producer direction and print the manifest address
    Provide {
        /// Path to the secrets bundle (token_key + store_auth, TOML)
        #[arg(long, short = 's', env = "SDX_SECRETS")]
        secrets: PathBuf,
        /// Base64 access token, encrypted under the token public key
        encrypted_token: String,
        /// Base64 SPKI data public key of the recipient
        data_public_key: String,
    },

    /// Run the consumer direction and write the recovered plaintext
    Consume {
        /// Path to the secrets bundle (store_auth, TOML)
        #[arg(long, short = 's', env = "SDX_SECRETS")]
        secrets: PathBuf,
        /// Manifest content address
        manifest: String,
        /// Base64 PKCS#8 DER file holding the data private key
        #[arg(long, short = 'k')]
        data_key: PathBuf,
        /// Write plaintext here instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Commands::Provide {
            secrets,
            encrypted_token,
            data_public_key,
        } => {
            let secrets = ProviderSecrets::load(&secrets).context("loading secrets bundle")?;
            let token_private_key = secrets
                .token_private_key()
                .context("importing token private key")?;

            let store = HttpContentStore::new(
                config.store.upload_url,
                config.store.gateway_url,
                secrets.store_auth,
            );
            let upstream = HttpUpstream::new(config.upstream.url);
            let pipeline = Pipeline::new(store, config.chunk_size)?;

            let address = pipeline
                .provide(
                    &upstream,
                    &token_private_key,
                    &ProvideRequest {
                        encrypted_token,
                        data_public_key,
                    },
                )
                .await
                .context("provide transfer failed")?;

            println!("{address}");
        }

        Commands::Consume {
            secrets,
            manifest,
            data_key,
            out,
        } => {
            let secrets = ProviderSecrets::load(&secrets).context("loading secrets bundle")?;
            let key_b64 = std::fs::read_to_string(&data_key)
                .with_context(|| format!("reading {}", data_key.display()))?;
            let der = sdx_codec::decode_base64(key_b64.trim())?;
            let data_private_key = sdx_crypto::import_private(&der)?;

            let store = HttpContentStore::new(
                config.store.upload_url,
                config.store.gateway_url,
                secrets.store_auth,
            );
            let pipeline = Pipeline::new(store, config.chunk_size)?;

            let plaintext = pipeline
                .consume(&data_private_key, &manifest)
                .await
                .context("consume transfer failed")?;

            match out {
                Some(path) => {
                    std::fs::write(&path, &plaintext)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), bytes = plaintext.len(), "plaintext written");
                }
                None => std::io::stdout().write_all(&plaintext)?,
            }
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
