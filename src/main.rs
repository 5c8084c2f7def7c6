mod cli;

use std::env;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eventboard::{
    credentials::{CredentialProvider, EnvCredentials, SecretsFile},
    server::{self, App},
    sync::{self, Debounce, Syncer},
    Board,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("eventboard=info".parse()?))
        .init();

    let credentials: Box<dyn CredentialProvider> = match args.secrets_file {
        Some(path) => Box::new(SecretsFile::new(path, args.secret_key)),
        None => Box::new(EnvCredentials::new(args.password_env)),
    };

    if args.ftp_user.is_none() {
        warn!("no --ftp-user given, uploads will fail");
    }

    let syncer = Syncer::new(
        sync::Config {
            csv_path: args.csv_path,
            host: args.ftp_host,
            port: args.ftp_port,
            user: args.ftp_user,
            remote_dir: args.remote_dir,
            remote_name: args.remote_name,
            timeout: args.timeout,
        },
        credentials,
    );

    let auto_sync = args.auto_sync.then(|| Debounce::new(args.debounce));
    let app = App::new(Board::seeded(), syncer, auto_sync);

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);

    axum::serve(listener, server::router(app))
        .with_graceful_shutdown(async {
            if let Err(err) = signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for ctrl-c");
            }
        })
        .await?;

    Ok(())
}
