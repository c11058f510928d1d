use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use sentiscope_core::{
    Analyzer, ClientConfig, ContentStore, DisplayedContent, ExportKind, ExtractOptions, Extractor,
    HttpBackend, ScopeApi, SignInForm, SignUpForm, UrlKind, classifier,
    events::{BusConfig, EventBus},
    export_to_dir, format_outcome_readable, format_stats,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::presenter::Presenter;

mod presenter;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for ExportKind (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliExportKind {
    All,
    Portal,
    Single,
    Youtube,
}

impl From<CliExportKind> for ExportKind {
    fn from(cli: CliExportKind) -> Self {
        match cli {
            CliExportKind::All => ExportKind::All,
            CliExportKind::Portal => ExportKind::Portal,
            CliExportKind::Single => ExportKind::Single,
            CliExportKind::Youtube => ExportKind::Youtube,
        }
    }
}

#[derive(Parser)]
#[command(name = "sentiscope")]
#[command(about = "Extract news articles and YouTube transcripts, then analyze sentiment and summarize")]
struct Cli {
    /// Backend base URL (overrides SENTISCOPE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides SENTISCOPE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Page to fetch a CSRF token from before sending requests
    #[arg(long, global = true)]
    csrf_page: Option<String>,

    /// Print every pipeline event as a JSON line
    #[arg(long, global = true)]
    events: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which extraction route each URL would take
    Classify {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Extract content from one or more URLs
    Extract {
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Write an export after extracting
        #[arg(long, value_enum)]
        export: Option<CliExportKind>,

        /// Export directory (overrides SENTISCOPE_EXPORT_DIR)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Run sentiment analysis and summarization
    Analyze {
        /// Text to analyze
        #[arg(long, conflicts_with_all = ["file", "url"])]
        text: Option<String>,

        /// File whose contents to analyze
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Extract this URL first, then analyze what was extracted
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Sign in to the SentiScope server
    Signin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        remember_me: bool,
    },

    /// Create an account on the SentiScope server
    Signup {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        confirm_password: String,
    },

    /// Work with headlines saved on the server
    Headlines {
        #[command(subcommand)]
        action: HeadlineAction,
    },
}

#[derive(Subcommand)]
enum HeadlineAction {
    /// Send a saved headline to the analyzer
    Analyze { document_id: String },

    /// Delete every saved headline
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Transcript language for YouTube URLs
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Maximum number of articles to scrape from a portal
    #[arg(short, long, default_value_t = 10)]
    max_articles: u32,

    /// Only collect headlines from portals
    #[arg(long)]
    headlines_only: bool,

    /// Let the server classify URLs
    #[arg(long)]
    remote_classify: bool,
}

impl From<&ExtractArgs> for ExtractOptions {
    fn from(args: &ExtractArgs) -> Self {
        ExtractOptions {
            remote_classification: args.remote_classify,
            max_articles: args.max_articles,
            extract_full_content: !args.headlines_only,
            language: args.lang.clone(),
        }
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentiscope=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct Session {
    config: ClientConfig,
    api: ScopeApi,
    bus: EventBus,
}

async fn connect(cli: &Cli) -> Result<Session> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs.max(1));
    }

    let backend = HttpBackend::new(&config)?;
    debug!(base_url = %backend.base_url(), "backend configured");
    if let Some(page) = &cli.csrf_page {
        match backend.prime_csrf(page).await {
            Ok(true) => debug!(page = %page, "csrf token ready"),
            Ok(false) => warn!(page = %page, "no csrf token found, sending requests without one"),
            Err(e) => warn!(page = %page, error = %e, "could not fetch csrf page"),
        }
    }

    Ok(Session {
        config,
        api: ScopeApi::new(Arc::new(backend)),
        bus: EventBus::new(BusConfig::default()),
    })
}

fn print_banner() {
    println!(
        "\n{}  {}\n",
        style("sentiscope").cyan().bold(),
        style("Content Analyzer").dim()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Classify { urls } => {
            for url in urls {
                let route = classifier::classify(url);
                match classifier::extract_video_id(url) {
                    Some(id) => {
                        println!("{} {} {}", style(route).cyan().bold(), url, style(id).dim())
                    }
                    None => println!("{} {}", style(route).cyan().bold(), url),
                }
            }
            Ok(())
        }
        Command::Extract {
            urls,
            extract,
            export,
            out_dir,
        } => {
            let session = connect(&cli).await?;
            run_extract(&cli, &session, urls, extract, *export, out_dir.clone()).await
        }
        Command::Analyze {
            text,
            file,
            url,
            extract,
        } => {
            let session = connect(&cli).await?;
            run_analyze(
                &cli,
                &session,
                text.as_deref(),
                file.as_ref(),
                url.as_deref(),
                extract,
            )
            .await
        }
        Command::Signin {
            email,
            password,
            remember_me,
        } => {
            let session = connect(&cli).await?;
            let form = SignInForm {
                email: email.clone(),
                password: password.clone(),
                remember_me: *remember_me,
            };
            let response = session.api.sign_in(&form).await?;
            println!(
                "{} {} {}",
                style("✓").green().bold(),
                response.message,
                style(format!("→ {}", response.redirect_target())).dim()
            );
            Ok(())
        }
        Command::Signup {
            full_name,
            email,
            password,
            confirm_password,
        } => {
            let session = connect(&cli).await?;
            let form = SignUpForm {
                full_name: full_name.clone(),
                email: email.clone(),
                password: password.clone(),
                confirm_password: confirm_password.clone(),
            };
            let response = session.api.sign_up(&form).await?;
            println!("{} {}", style("✓").green().bold(), response.message);
            Ok(())
        }
        Command::Headlines { action } => {
            let session = connect(&cli).await?;
            run_headlines(&session, action).await
        }
    }
}

async fn run_headlines(session: &Session, action: &HeadlineAction) -> Result<()> {
    match action {
        HeadlineAction::Analyze { document_id } => {
            let response = session.api.analyze_headline(document_id).await?;
            println!(
                "{} {} {}",
                style("✓").green().bold(),
                response.message,
                style(format!("→ {}", response.redirect_target())).dim()
            );
        }
        HeadlineAction::Clear { yes } => {
            if !yes && !confirm_clear()? {
                println!("{}", style("Cancelled").dim());
                return Ok(());
            }
            let response = session.api.clear_headlines().await?;
            println!("{} {}", style("✓").green().bold(), response.message);
        }
    }
    Ok(())
}

fn confirm_clear() -> Result<bool> {
    let term = Term::stderr();
    term.write_str("Clear all saved headlines? This cannot be undone. [y/N] ")?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn run_extract(
    cli: &Cli,
    session: &Session,
    urls: &[String],
    args: &ExtractArgs,
    export: Option<CliExportKind>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    print_banner();
    let total_start = Instant::now();

    let spinner = create_spinner("Extracting...");
    let presenter = Presenter::new(spinner.clone(), cli.events).spawn(&session.bus);

    let extractor = Extractor::new(session.api.clone());
    let mut store = ContentStore::with_bus(session.bus.clone());
    let options = ExtractOptions::from(args);

    let mut failures = 0usize;
    for url in urls {
        spinner.set_message(format!("Extracting {url}..."));
        if let Err(e) = extractor.quick_extract(&mut store, url, &options).await {
            failures += 1;
            spinner.println(format!(
                "{} {} {}",
                style("✗").red().bold(),
                url,
                style(e.user_message()).red()
            ));
        }
    }

    presenter.finish().await;
    spinner.finish_and_clear();

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} {} {}",
        style("Extracted:").dim(),
        style(format_stats(&store.stats())).cyan().bold(),
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    );

    if let Some(kind) = export {
        let dir = out_dir.unwrap_or_else(|| session.config.export_dir.clone());
        let path = export_to_dir(kind.into(), store.snapshot(), &dir).await?;
        println!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
    }

    if failures == urls.len() {
        bail!("nothing could be extracted");
    }
    Ok(())
}

async fn run_analyze(
    cli: &Cli,
    session: &Session,
    text: Option<&str>,
    file: Option<&PathBuf>,
    url: Option<&str>,
    args: &ExtractArgs,
) -> Result<()> {
    print_banner();
    let total_start = Instant::now();

    let spinner = create_spinner("Preparing content...");
    let presenter = Presenter::new(spinner.clone(), cli.events).spawn(&session.bus);

    let content = match (text, file, url) {
        (Some(text), _, _) => DisplayedContent::manual("manual", text),
        (None, Some(path), _) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            DisplayedContent::manual(path.display().to_string(), text)
        }
        (None, None, Some(url)) => {
            let extractor = Extractor::new(session.api.clone());
            let mut store = ContentStore::with_bus(session.bus.clone());
            let report = extractor
                .quick_extract(&mut store, url, &ExtractOptions::from(args))
                .await?;
            match report.route {
                UrlKind::Youtube => store
                    .latest_transcript()
                    .map(DisplayedContent::from_transcript),
                _ => store.latest_article().map(DisplayedContent::from_article),
            }
            .unwrap_or_else(|| DisplayedContent {
                target_id: url.to_string(),
                ..DisplayedContent::default()
            })
        }
        (None, None, None) => bail!("one of --text, --file or --url is required"),
    };

    let analyzer = Analyzer::new(session.api.clone()).with_bus(session.bus.clone());
    let outcome = analyzer.analyze(&content).await?;

    presenter.finish().await;
    spinner.finish_and_clear();

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_outcome_readable(&outcome));
    println!(
        "{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    if let Some(error) = outcome.error {
        return Err(error.into());
    }
    Ok(())
}
