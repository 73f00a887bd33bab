use anyhow::Context;
use cavatica::CavaticaClient;
use clap::Parser;
use fhir2vis_core::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use fhir2vis_core::{CookieClient, CoreConfig, FailurePolicy, Pipeline, RecordFetcher};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments.
///
/// The three credentials are required; everything else has a default matching
/// the public Cavatica and INCLUDE services.
#[derive(Parser)]
#[command(name = "fhir2vis")]
#[command(
    about = "Retrieve INCLUDE FHIR metadata for the files of a Cavatica project and print it as JSON"
)]
struct Cli {
    /// Cavatica developer token (https://cavatica.sbgenomics.com/developer/token)
    #[arg(long, alias = "cavatica_token")]
    cavatica_token: String,

    /// Cavatica project holding the files imported from the INCLUDE portal
    #[arg(long, alias = "cavatica_project")]
    cavatica_project: String,

    /// Value of the `AWSELBAuthSessionCookie-0` cookie of the INCLUDE FHIR server
    #[arg(long, alias = "include_fhir_authentication_cookie")]
    include_fhir_authentication_cookie: String,

    /// Cavatica API base URL
    #[arg(long)]
    cavatica_api_url: Option<String>,

    /// INCLUDE FHIR server base URL
    #[arg(long)]
    fhir_base_url: Option<String>,

    /// Write the report to this file instead of standard output
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log and count per-file failures instead of aborting the run
    #[arg(long)]
    keep_going: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Attempts per workspace request when rate limited or in maintenance
    #[arg(long, default_value_t = 10)]
    max_attempts: u32,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(CoreConfig, Option<PathBuf>)> {
        let mut config = CoreConfig::new(
            self.cavatica_token,
            self.cavatica_project,
            self.include_fhir_authentication_cookie,
        )?
        .with_request_timeout(Duration::from_secs(self.timeout_secs))?
        .with_max_attempts(self.max_attempts)?;

        if let Some(url) = self.cavatica_api_url.as_deref() {
            config = config.with_cavatica_api_url(url)?;
        }
        if let Some(url) = self.fhir_base_url.as_deref() {
            config = config.with_fhir_base_url(url)?;
        }
        if self.keep_going {
            config = config.with_failure_policy(FailurePolicy::Continue);
        }

        Ok((config, self.output))
    }
}

/// Entry point for the metadata run.
///
/// Logs go to stderr (filter with `RUST_LOG`); standard output carries only the
/// JSON report, so the output can be piped straight into the visualisation step.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhir2vis=info".parse()?)
                .add_directive("cavatica=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (config, output) = Cli::parse().into_config().context("invalid arguments")?;

    let workspace = CavaticaClient::new(
        config.cavatica_api_url(),
        config.cavatica_token(),
        config.request_timeout(),
        config.retry_policy().clone(),
    )
    .context("failed to create Cavatica client")?;
    let transport = CookieClient::new(config.fhir_auth_cookie(), config.request_timeout())
        .context("failed to create FHIR client")?;

    let pipeline = Pipeline::new(
        workspace,
        RecordFetcher::new(transport, config.fhir_base_url()),
        config.failure_policy(),
    );

    tracing::info!("++ Collecting metadata for project {}", config.project_id());
    let (report, summary) = pipeline
        .run(config.project_id())
        .with_context(|| format!("metadata run for project {} failed", config.project_id()))?;

    if summary.failed > 0 {
        tracing::warn!("{} files failed and are missing from the report", summary.failed);
    }

    match output {
        Some(path) => {
            report
                .write_to_path(&path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("wrote {} rows to {}", report.len(), path.display());
        }
        None => report.write_json(std::io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "fhir2vis",
        "--cavatica-token",
        "tok",
        "--cavatica-project",
        "owner/project",
        "--include-fhir-authentication-cookie",
        "cookie",
    ];

    #[test]
    fn required_arguments_build_default_config() {
        let cli = Cli::try_parse_from(REQUIRED).expect("parse args");
        let (config, output) = cli.into_config().expect("config");

        assert_eq!(config.cavatica_token(), "tok");
        assert_eq!(config.project_id(), "owner/project");
        assert_eq!(config.fhir_auth_cookie(), "cookie");
        assert_eq!(config.failure_policy(), FailurePolicy::Abort);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(output.is_none());
    }

    #[test]
    fn accepts_underscore_spellings() {
        let cli = Cli::try_parse_from([
            "fhir2vis",
            "--cavatica_token",
            "tok",
            "--cavatica_project",
            "p",
            "--include_fhir_authentication_cookie",
            "c",
        ])
        .expect("parse args");
        assert_eq!(cli.cavatica_project, "p");
    }

    #[test]
    fn missing_credentials_are_rejected() {
        assert!(Cli::try_parse_from(REQUIRED[..5].iter().copied()).is_err());
    }

    #[test]
    fn optional_flags_override_defaults() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend([
            "--fhir-base-url",
            "http://localhost:8000/fhir",
            "--keep-going",
            "--timeout-secs",
            "5",
            "--output",
            "report.json",
        ]);

        let (config, output) = Cli::try_parse_from(args)
            .expect("parse args")
            .into_config()
            .expect("config");
        assert_eq!(config.fhir_base_url(), "http://localhost:8000/fhir/");
        assert_eq!(config.failure_policy(), FailurePolicy::Continue);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(output, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn blank_cookie_is_rejected_at_config_time() {
        let mut args = REQUIRED;
        args[6] = " ";
        let cli = Cli::try_parse_from(args).expect("parse args");
        assert!(cli.into_config().is_err());
    }
}
