use cinebot_core::config::CoreSettings;
use cinebot_transport_telegram::config::{BotSettings, TelegramSettings};
use cinebot_transport_telegram::runner::run_server;
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    api_url: Regex,
    webhook_path: Regex,
    bare_token: Regex,
    tmdb_key: Regex,
    r2_key_id: Regex,
    r2_secret: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            api_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)")?,
            webhook_path: Regex::new(r"(/telegram/webhook/)([^/\s]+)")?,
            bare_token: Regex::new(r"\b[0-9]{6,12}:[A-Za-z0-9_-]{30,}")?,
            tmdb_key: Regex::new(r"(api_key=)[^\s&]+")?,
            r2_key_id: Regex::new(r"R2_ACCESS_KEY_ID=[^\s&]+")?,
            r2_secret: Regex::new(r"R2_SECRET_ACCESS_KEY=[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .api_url
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .webhook_path
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .bare_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .tmdb_key
            .replace_all(&output, "$1[MASKED]")
            .to_string();
        output = self
            .r2_key_id
            .replace_all(&output, "R2_ACCESS_KEY_ID=[MASKED]")
            .to_string();
        output = self
            .r2_secret
            .replace_all(&output, "R2_SECRET_ACCESS_KEY=[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the input length even though the redacted output differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Compiled before logging so nothing unredacted is ever written
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting Cinebot webhook server...");

    let settings = init_settings();

    run_server(settings).await?;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "cinebot_core=info,cinebot_transport_telegram=info,cinebot_telegram_bot=info,hyper=warn,h2=error,reqwest=warn,tokio=warn,tower=warn,axum=warn,teloxide=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let core_settings = match CoreSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load core configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load telegram configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully.");
    Arc::new(BotSettings::new(core_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().unwrap_or_else(|e| panic!("patterns: {e}"))
    }

    #[test]
    fn test_redacts_tokens() {
        let p = patterns();
        let token = "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw1";
        assert_eq!(
            p.redact(&format!("POST https://api.telegram.org/bot{token}/sendMessage")),
            "POST https://api.telegram.org/bot[TELEGRAM_TOKEN]/sendMessage"
        );
        assert_eq!(
            p.redact(&format!("POST /telegram/webhook/{token}/ 200")),
            "POST /telegram/webhook/[TELEGRAM_TOKEN]/ 200"
        );
        assert_eq!(p.redact(&format!("token {token}")), "token [TELEGRAM_TOKEN]");
    }

    #[test]
    fn test_redacts_api_keys() {
        let p = patterns();
        assert_eq!(
            p.redact("GET /3/movie/popular?api_key=abcdef&page=2"),
            "GET /3/movie/popular?api_key=[MASKED]&page=2"
        );
        assert_eq!(
            p.redact("R2_SECRET_ACCESS_KEY=xyz R2_ACCESS_KEY_ID=abc"),
            "R2_SECRET_ACCESS_KEY=[MASKED] R2_ACCESS_KEY_ID=[MASKED]"
        );
    }
}
