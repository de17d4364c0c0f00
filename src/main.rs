//! Command-line entry point: parse the target, find its address, run one
//! HTTP exchange or an interactive WebSocket session.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use rurl::cache::{FileCache, IpCache};
use rurl::conn::{Connector, Target, TrustRoots};
use rurl::dns::{Resolver, DEFAULT_DNS_SERVER};
use rurl::http::{parse_method, Request, Response};
use rurl::output::Printer;
use rurl::target::{parse_target, ParsedTarget, Protocol};
use rurl::ws;

/// HTTP and WebSocket client speaking raw TCP/TLS, with built-in DNS.
#[derive(Parser)]
#[command(name = "rurl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target, e.g. https://example.com/path, ws://localhost:8080/chat
    target: String,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    method: String,

    /// JSON request body (sets Content-Type: application/json)
    #[arg(long, conflicts_with = "text")]
    json: Option<String>,

    /// Plain text request body (sets Content-Type: text/plain)
    #[arg(long)]
    text: Option<String>,

    /// Cookie header value, e.g. 'name1=value1; name2=value2'
    #[arg(long)]
    cookies: Option<String>,

    /// Deadline in seconds for dialing and HTTP reads/writes
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Extra trusted root certificates (PEM bundle)
    #[arg(long, value_name = "FILE")]
    cacert: Option<PathBuf>,

    /// Print the outbound request and connection details
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose { "debug" } else { "warn" })
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new(cli.verbose);
    if let Err(e) = run(cli, printer).await {
        printer.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, printer: Printer) -> rurl::Result<()> {
    let parsed = parse_target(&cli.target)?;
    let ip = find_ip(&parsed).await?;

    let target = Target {
        ip,
        port: parsed.port(),
        use_tls: parsed.use_tls,
        host: parsed.host.clone(),
    };

    let connector = Connector::with_timeout(trust_roots(&cli), Duration::from_secs(cli.timeout))?;

    match parsed.protocol {
        Protocol::Http => http_exchange(&cli, &parsed, &target, &connector, printer).await,
        Protocol::Ws => ws_session(&parsed, &target, &connector, printer).await,
    }
}

/// Bundled roots, extended from a PEM bundle when one was given. Borrows
/// the arguments; they are still needed for the request itself.
fn trust_roots(cli: &Cli) -> TrustRoots {
    match &cli.cacert {
        Some(path) => TrustRoots::WebPkiPlusPem(path.clone()),
        None => TrustRoots::default(),
    }
}

/// Localhost and IP literals skip DNS; everything else goes cache first,
/// then the resolver. Cache problems are logged and treated as misses.
async fn find_ip(parsed: &ParsedTarget) -> rurl::Result<IpAddr> {
    if parsed.is_localhost() {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    if let Some(ip) = parsed.ip_literal() {
        return Ok(ip);
    }

    let cache = FileCache::open_default().await?;
    match cache.get(&parsed.host).await {
        Ok(Some(ip)) => return Ok(ip),
        Ok(None) => {}
        Err(e) => warn!("ignoring cache entry: {e}"),
    }

    let resolver = Resolver::new(DEFAULT_DNS_SERVER.into());
    let ip = resolver.resolve(&parsed.labels()).await?;
    if let Err(e) = cache.put(&parsed.host, ip).await {
        warn!("skipped ip caching: {e}");
    }
    Ok(ip)
}

async fn http_exchange(
    cli: &Cli,
    parsed: &ParsedTarget,
    target: &Target,
    connector: &Connector,
    printer: Printer,
) -> rurl::Result<()> {
    let method = parse_method(&cli.method)?;
    let mut request = Request::new(method, parsed.host_header(), &parsed.path);
    if let Some(cookies) = &cli.cookies {
        request = request.with_cookie(cookies);
    }
    if let Some(json) = &cli.json {
        request = request.with_body("application/json", json.clone().into_bytes());
    } else if let Some(text) = &cli.text {
        request = request.with_body("text/plain", text.clone().into_bytes());
    }

    let encoded = request.encode();
    let mut conn = connector.connect(target).await?;
    printer.request_sent(&target.ip.to_string(), &encoded);

    let raw = connector.dispatch(&mut conn, &encoded).await?;
    let response = Response::parse(&raw)?;
    printer.response(&response);
    Ok(())
}

async fn ws_session(
    parsed: &ParsedTarget,
    target: &Target,
    connector: &Connector,
    printer: Printer,
) -> rurl::Result<()> {
    let stream = connector.connect(target).await?;
    let (reader, writer, head) =
        ws::upgrade(stream, &parsed.host_header(), &parsed.path).await?;

    printer.upgrade_response(&target.ip.to_string(), &head);

    ws::run_session(
        reader,
        writer,
        tokio::io::stdin(),
        move |msg| printer.server_msg(&msg),
        move |line| printer.client_msg(line),
    )
    .await
}
