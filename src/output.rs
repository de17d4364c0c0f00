//! Terminal rendering: colorized response sections, verbose request echo
//! and the live-session message tags.

use console::{style, Color};

use crate::http::Response;

/// Status class to color: green for success, cyan for redirects, red for
/// client errors, magenta for server errors.
fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::White,
    }
}

/// Stdout printer for one invocation.
#[derive(Clone, Copy)]
pub struct Printer {
    verbose: bool,
}

impl Printer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Echoes the outbound request and the server address. Verbose mode
    /// only.
    pub fn request_sent(&self, ip: &str, request: &[u8]) {
        if !self.verbose {
            return;
        }
        println!("{}", style("[To Server] >>").white().bold());
        println!("{} {ip}\n", style("Server IP:").magenta());
        print!("{}", String::from_utf8_lossy(request));
        if !request.ends_with(b"\n") {
            println!();
        }
        println!("\n{}", style("[From Server] <<").white().bold());
    }

    pub fn response(&self, resp: &Response) {
        let color = status_color(resp.status_code);
        println!(
            "{} {} {}",
            resp.version,
            style(resp.status_code).fg(color).bold(),
            style(&resp.status_message).fg(color)
        );

        for (name, value) in &resp.headers {
            println!("{}: {value}", style(name).dim());
        }

        if !resp.body.is_empty() {
            println!("\n{}", String::from_utf8_lossy(&resp.body));
        }
    }

    /// Shows the handshake response from the server. Verbose mode only.
    pub fn upgrade_response(&self, ip: &str, head: &str) {
        if !self.verbose {
            return;
        }
        println!("{} {ip}\n", style("Server IP:").magenta());
        println!("{}", style("[From Server] <<").white().bold());
        print!("{head}");
    }

    pub fn server_msg(&self, msg: &str) {
        println!("{} {msg}", style("[SERVER]:").cyan().bold());
    }

    pub fn client_msg(&self, msg: &str) {
        println!("{} {msg}", style("[CLIENT]:").green().bold());
    }

    pub fn warning(&self, msg: &str) {
        eprintln!("{} {msg}", style("[WARNING]:").yellow().bold());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{} {msg}", style("[ERROR]:").red().bold());
    }
}
