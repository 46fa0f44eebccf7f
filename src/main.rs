use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use deskapi::{
    ApiTokenCredential, BasicAuthCredential, BearerTokenCredential, Client, CursorPagination,
    RequestContext, add_options,
};
use log::debug;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// deskapi - tenant REST API client
///
/// Sends a single authenticated request and prints the response body.
/// Throttled requests (HTTP 429) are retried according to the server's
/// Retry-After header.
///
/// Examples:
///   deskapi --subdomain acme --email me@acme.io --token T get /tickets.json
///   deskapi --subdomain acme --token T --bearer delete /tickets/42.json
#[derive(Parser, Debug)]
#[command(author, version = env!("DESKAPI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tenant subdomain (e.g. "acme" for acme.example-service.com)
    #[arg(long, env = "DESKAPI_SUBDOMAIN", global = true)]
    subdomain: Option<String>,

    /// Full API base URL; overrides --subdomain
    #[arg(long = "endpoint-url", env = "DESKAPI_ENDPOINT_URL", value_name = "URL", global = true)]
    endpoint_url: Option<String>,

    /// Account email used for basic and API token authentication
    #[arg(long, env = "DESKAPI_EMAIL", global = true)]
    email: Option<String>,

    /// Account password (basic authentication)
    #[arg(long, env = "DESKAPI_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// API token, or OAuth access token with --bearer
    #[arg(long, env = "DESKAPI_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Send --token as a bearer token
    #[arg(long, global = true)]
    bearer: bool,

    /// Extra header sent with the request, as KEY:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "KEY:VALUE", global = true)]
    headers: Vec<String>,

    /// Total attempts when throttled
    #[arg(long = "max-retry", value_name = "N", global = true)]
    max_retry: Option<i64>,

    /// Longest Retry-After to honour, in seconds
    #[arg(long = "max-retry-sleep", value_name = "SECONDS", global = true)]
    max_retry_sleep: Option<u64>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// GET a path
    Get(GetArgs),
    /// POST a JSON body to a path
    Post(BodyArgs),
    /// PUT a JSON body to a path
    Put(BodyArgs),
    /// DELETE a path
    Delete(PathArgs),
}

#[derive(clap::Args, Debug)]
struct PathArgs {
    /// Path relative to the API base URL, e.g. /tickets.json
    path: String,
}

#[derive(clap::Args, Debug)]
struct GetArgs {
    /// Path relative to the API base URL, e.g. /tickets.json
    path: String,

    /// Results per page
    #[arg(long = "page-size")]
    page_size: Option<u32>,

    /// Cursor of the next page
    #[arg(long = "page-after", value_name = "CURSOR")]
    page_after: Option<String>,

    /// Cursor of the previous page
    #[arg(long = "page-before", value_name = "CURSOR")]
    page_before: Option<String>,
}

#[derive(clap::Args, Debug)]
struct BodyArgs {
    /// Path relative to the API base URL, e.g. /tickets.json
    path: String,

    /// JSON request body
    #[arg(long, short = 'd', default_value = "{}")]
    data: String,
}

fn build_client(cli: &Cli) -> Result<Client> {
    let mut client = Client::default();

    match (&cli.endpoint_url, &cli.subdomain) {
        (Some(url), _) => client
            .set_endpoint_url(url)
            .with_context(|| format!("Invalid endpoint URL {}", url))?,
        (None, Some(subdomain)) => client
            .set_subdomain(subdomain)
            .context("Invalid subdomain")?,
        (None, None) => bail!("Either --subdomain or --endpoint-url is required"),
    }

    match (&cli.token, &cli.email, &cli.password) {
        (Some(token), _, _) if cli.bearer => {
            client.set_credential(Arc::new(BearerTokenCredential::new(token.clone())));
        }
        (Some(token), Some(email), _) => {
            client.set_credential(Arc::new(ApiTokenCredential::new(email.clone(), token.clone())));
        }
        (Some(_), None, _) => bail!("--token requires --email unless --bearer is given"),
        (None, Some(email), Some(password)) => {
            client.set_credential(Arc::new(BasicAuthCredential::new(
                email.clone(),
                password.clone(),
            )));
        }
        _ => debug!("No credentials given, sending anonymous request"),
    }

    for header in &cli.headers {
        let (key, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Header must be KEY:VALUE, got {:?}", header))?;
        client.set_header(key.trim(), value.trim());
    }

    if let Some(max_retry) = cli.max_retry {
        client.set_max_retry(max_retry);
    }
    if let Some(secs) = cli.max_retry_sleep {
        client.set_max_retry_sleep_delay(Duration::from_secs(secs));
    }

    Ok(client)
}

fn parse_body(data: &str) -> Result<serde_json::Value> {
    serde_json::from_str(data).context("--data is not valid JSON")
}

async fn run(cli: Cli, ctx: &RequestContext) -> Result<Vec<u8>> {
    let client = build_client(&cli)?;

    let body = match cli.command {
        Commands::Get(args) => {
            let page = CursorPagination {
                page_size: args.page_size,
                page_after: args.page_after,
                page_before: args.page_before,
            };
            let path = add_options(&args.path, &page)?;
            client.get(ctx, &path).await?
        }
        Commands::Post(args) => client.post(ctx, &args.path, &parse_body(&args.data)?).await?,
        Commands::Put(args) => client.put(ctx, &args.path, &parse_body(&args.data)?).await?,
        Commands::Delete(args) => {
            client.delete(ctx, &args.path).await?;
            Vec::new()
        }
    };
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let ctx = match cli.timeout {
        Some(secs) => RequestContext::with_timeout(Duration::from_secs(secs)),
        None => RequestContext::with_cancel(),
    };
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let body = run(cli, &ctx).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body).context("Failed to write response")?;
    if !body.is_empty() && !body.ends_with(b"\n") {
        writeln!(stdout)?;
    }
    Ok(())
}
