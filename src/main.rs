use anyhow::{Context, Result};
use clap::Parser;
use fetchwrap::{CallConfig, ClientConfig, RequestExecutor, Response, UploadFile};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// fetchwrap - JSON HTTP client with retries
///
/// Sends a request to BASE_URL + ENDPOINT and prints the JSON response.
/// Failed requests (network errors, timeouts, non-2xx statuses) are retried
/// immediately up to --retries attempts; upload and download are attempted once.
///
/// Examples:
///   fetchwrap --base-url https://api.example.com get /users/1
///   fetchwrap --base-url https://api.example.com post /users --data '{"name":"ada"}'
#[derive(Parser, Debug)]
#[command(author, version = env!("FETCHWRAP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL every endpoint is appended to
    #[arg(long, env = "FETCHWRAP_BASE_URL", value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Bearer token sent in the Authorization header
    #[arg(long, env = "FETCHWRAP_TOKEN", value_name = "TOKEN", global = true)]
    token: Option<String>,

    /// Timeout for a single attempt, in milliseconds
    #[arg(
        long,
        env = "FETCHWRAP_TIMEOUT_MS",
        default_value_t = fetchwrap::config::DEFAULT_TIMEOUT_MS,
        global = true
    )]
    timeout_ms: u64,

    /// Number of attempts for get/post/put/delete
    #[arg(
        long,
        env = "FETCHWRAP_RETRIES",
        default_value_t = fetchwrap::config::DEFAULT_RETRIES,
        global = true
    )]
    retries: u32,

    /// Extra request header, as NAME:VALUE (repeatable)
    #[arg(
        short = 'H',
        long = "header",
        value_name = "NAME:VALUE",
        value_parser = parse_header,
        global = true
    )]
    headers: Vec<(String, String)>,

    /// Log requests and responses
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// GET an endpoint
    Get { endpoint: String },

    /// POST a JSON body
    Post(BodyArgs),

    /// PUT a JSON body
    Put(BodyArgs),

    /// DELETE an endpoint
    Delete { endpoint: String },

    /// Upload a file as multipart form data
    Upload {
        endpoint: String,
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Download raw bytes
    Download {
        endpoint: String,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct BodyArgs {
    endpoint: String,

    /// JSON request body
    #[arg(short, long, value_name = "JSON")]
    data: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_body(data: Option<&str>) -> Result<Option<Value>> {
    data.map(|d| serde_json::from_str(d).context("--data is not valid JSON"))
        .transpose()
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .clone()
            .context("No base URL: pass --base-url or set FETCHWRAP_BASE_URL")?;
        Ok(ClientConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
            auth_token: self.token.clone(),
            log_requests: self.verbose,
            log_responses: self.verbose,
            ..ClientConfig::new(base_url)
        })
    }

    fn call_config(&self) -> CallConfig {
        self.headers
            .iter()
            .fold(CallConfig::new(), |call, (name, value)| call.header(name, value))
    }
}

fn print_json(response: Response<Value>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response.data())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let executor = RequestExecutor::from_config(cli.client_config()?)?;
    let call = cli.call_config();

    match &cli.command {
        Commands::Get { endpoint } => print_json(executor.get(endpoint, Some(&call)).await?)?,
        Commands::Delete { endpoint } => {
            print_json(executor.delete(endpoint, Some(&call)).await?)?
        }
        Commands::Post(args) => {
            let body = parse_body(args.data.as_deref())?;
            print_json(executor.post(&args.endpoint, body.as_ref(), Some(&call)).await?)?
        }
        Commands::Put(args) => {
            let body = parse_body(args.data.as_deref())?;
            print_json(executor.put(&args.endpoint, body.as_ref(), Some(&call)).await?)?
        }
        Commands::Upload { endpoint, path } => {
            let file = UploadFile::from_path(path).await?;
            print_json(executor.upload(endpoint, file, Some(&call)).await?)?
        }
        Commands::Download { endpoint, output } => {
            let bytes = executor.download(endpoint, Some(&call)).await?;
            match output {
                Some(path) => tokio::fs::write(path, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {:?}", path))?,
                None => std::io::stdout()
                    .write_all(&bytes)
                    .context("Failed to write to stdout")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_get_parsing() {
        let cli =
            Cli::try_parse_from(["fetchwrap", "--base-url", "http://h", "get", "/a"]).unwrap();
        match cli.command {
            Commands::Get { endpoint } => assert_eq!(endpoint, "/a"),
            _ => panic!("Expected Get command"),
        }
        assert_eq!(cli.base_url.as_deref(), Some("http://h"));
        assert_eq!(cli.retries, 3);
        assert_eq!(cli.timeout_ms, 5000);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fetchwrap", "post", "/users", "--data", "{}", "--retries", "1", "-H", "X-A: b",
        ])
        .unwrap();
        match &cli.command {
            Commands::Post(args) => {
                assert_eq!(args.endpoint, "/users");
                assert_eq!(args.data.as_deref(), Some("{}"));
            }
            _ => panic!("Expected Post command"),
        }
        assert_eq!(cli.retries, 1);
        assert_eq!(cli.headers, vec![("X-A".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["fetchwrap", "/users"]).is_err());
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept: text/plain").unwrap(),
            ("Accept".to_string(), "text/plain".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": v").is_err());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(None).unwrap(), None);
        assert_eq!(
            parse_body(Some(r#"{"a":1}"#)).unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
        assert!(parse_body(Some("{")).is_err());
    }

    #[test]
    fn test_client_config_requires_base_url() {
        let mut cli = Cli::try_parse_from(["fetchwrap", "get", "/a"]).unwrap();
        cli.base_url = None;
        let err = cli.client_config().unwrap_err();
        assert!(err.to_string().contains("No base URL"));
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::try_parse_from([
            "fetchwrap", "--base-url", "http://h", "--token", "t", "--timeout-ms", "10", "-v",
            "get", "/a",
        ])
        .unwrap();
        let config = cli.client_config().unwrap();
        assert_eq!(config.base_url, "http://h");
        assert_eq!(config.auth_token.as_deref(), Some("t"));
        assert_eq!(config.timeout, Duration::from_millis(10));
        assert!(config.log_requests);
        assert!(config.log_responses);
    }
}
