use aneelwatch_cli::config::{Cli, Command, ExtractArgs, OutputFormat, RunArgs};
use aneelwatch_cli::display::print_record_card;
use aneelwatch_cli::pipeline::Pipeline;
use aneelwatch_core::Extractor;
use aneelwatch_notify::{MailConfig, Notifier, SmtpMailer};
use aneelwatch_store::{PageDumper, ResultsFile};
use aneelwatch_sync::PortalClient;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("aneelwatch v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Extract(args) => extract(args),
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let plan = args.plan(chrono::Local::now().date_naive());
    let client = PortalClient::new(args.base_url.clone()).context("building HTTP client")?;
    let extractor = Extractor::new().with_origin(args.base_url.trim_end_matches('/'));
    let results = ResultsFile::new(&args.output);
    let dumper = args.dump_dir.as_ref().map(PageDumper::new);
    if let Some(dumper) = &dumper {
        tracing::info!(dir = %dumper.dir().display(), "saving fetched pages");
    }
    let notifier = build_notifier(&args);

    let pipeline = Pipeline {
        fetcher: &client,
        extractor: &extractor,
        results: &results,
        notifier: &notifier,
        dumper: dumper.as_ref(),
    };
    let outcome = pipeline.run(&plan).await?;

    eprintln!(
        "  {} document(s) ({} extracted, {} page(s)) written to {} in {:.1}s",
        outcome.result.total_documents,
        outcome.stats.extracted,
        outcome.stats.pages_fetched,
        results.path().display(),
        outcome.stats.elapsed_secs
    );
    Ok(())
}

/// SMTP notifier when mail credentials are present, otherwise a no-op one.
fn build_notifier(args: &RunArgs) -> Notifier {
    let Some(config) = MailConfig::from_env() else {
        tracing::info!("EMAIL_SENDER / EMAIL_APP_PASSWORD / EMAIL_RECIPIENT not all set; email disabled");
        return Notifier::disabled();
    };
    let notifier = match SmtpMailer::new(&config) {
        Ok(mailer) => Notifier::new(Box::new(mailer), config.recipient.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "invalid mail configuration; email disabled");
            Notifier::disabled()
        }
    };
    notifier
        .send_when_empty(args.notify_empty)
        .with_policy(args.relevance_policy())
}

fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let records = Extractor::new()
        .with_origin(args.origin.trim_end_matches('/'))
        .extract_bytes(&bytes, &args.term, date)
        .with_context(|| format!("extracting {}", args.file.display()))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Card => records.iter().for_each(print_record_card),
    }
    eprintln!("  {} record(s)", records.len());
    Ok(())
}
