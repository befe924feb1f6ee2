//! Headless API server entrypoint.

use cipherstudio_server::config::env_flag_enabled;
use cipherstudio_server::{serve_router, AppState, Config, Database, DEFAULT_PORT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    print_config: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--print-config" => flags.print_config = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cipherstudio=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    if cli_flags.print_config {
        println!("{:#?}", config);
        return Ok(());
    }

    let database = Database::new(&config.db_path)?;
    tracing::info!("Database ready at {}", config.db_path);
    let state = AppState::new(config.clone(), database);

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = cipherstudio_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("CipherStudio backend running at http://{}", actual_addr);

    let db = state.db.clone();
    let serve_result = serve_router(listener, state, allow_public, shutdown_signal()).await;

    if let Err(err) = db.flush() {
        tracing::error!("Failed to flush database: {}", err);
    }
    tracing::info!("Server stopped");

    serve_result?;

    Ok(())
}

fn print_help() {
    println!("CipherStudio Server\n");
    println!("Usage: cipherstudio-server [OPTIONS]\n");
    println!("Options:");
    println!("  --print-config    Print the resolved configuration and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/cipherstudio/db)");
    println!("  PORT              Server port (default: {})", DEFAULT_PORT);
    println!("  MAX_BODY_SIZE     Maximum request body size in bytes (default: 10MB)");
    println!("  JWT_SECRET        Token signing secret (default: random per process)");
    println!("  TOKEN_TTL_SECS    Token lifetime in seconds (default: 7 days)");
    println!("  BCRYPT_COST       Password hashing cost (default: 10)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin and non-loopback binds");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_flags, CliFlags};

    #[test]
    fn parse_cli_flags_rejects_unknown_and_positional_arguments() {
        let cases = [
            (
                vec!["cipherstudio-server".to_string(), "--prot".to_string()],
                "Unknown option",
            ),
            (
                vec!["cipherstudio-server".to_string(), "serve".to_string()],
                "Unexpected positional argument",
            ),
        ];

        for (args, expected_fragment) in cases {
            let err = parse_cli_flags(&args).expect_err("invalid args should be rejected");
            assert!(err.to_string().contains(expected_fragment));
        }
    }

    #[test]
    fn parse_cli_flags_accepts_supported_options() {
        let args = vec![
            "cipherstudio-server".to_string(),
            "--print-config".to_string(),
            "-h".to_string(),
        ];
        let flags = parse_cli_flags(&args).expect("known options should parse");
        assert_eq!(
            flags,
            CliFlags {
                help: true,
                print_config: true,
            }
        );
        assert_eq!(
            parse_cli_flags(&["cipherstudio-server".to_string()]).expect("no flags"),
            CliFlags::default()
        );
    }
}
