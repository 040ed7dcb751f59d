use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storelens::settings::DEFAULT_CONFIG_FILE;
use storelens::{PageController, Settings};
use storelens_analytics::{audit, Page, Version};
use storelens_core::{AgeGroup, DateRange, Gender, PaymentMethod};
use storelens_source::RecordSource;

#[derive(Parser, Debug)]
#[command(
    name = "storelens",
    about = "Aggregated e-commerce views from transaction records"
)]
struct Args {
    /// Page to build: dashboard, categoryInsights, userSegments or cohorts.
    /// Every page is built when omitted.
    page: Option<Page>,

    /// View version (v1 or v2). Defaults to the configured version.
    version: Option<Version>,

    /// Config file (TOML); ./storelens.toml is read when present
    #[arg(long, env = "STORELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Record feed base URL; an empty value serves fixture data only
    #[arg(long, env = "STORELENS_API_URL")]
    api_url: Option<String>,

    /// First day of the date filter (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last day of the date filter (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Category filter, repeatable
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Payment method filter, repeatable
    #[arg(long = "payment")]
    payment_methods: Vec<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Age group filter, repeatable (e.g. 25-34)
    #[arg(long = "age")]
    age_groups: Vec<String>,

    /// Also print a record quality report
    #[arg(long)]
    audit: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let settings = Settings::resolve(args.config.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
        .context("Failed to load settings")?
        .with_api_url(args.api_url.clone());
    tracing::info!(
        api_url = settings.source.api_url.as_deref().unwrap_or("<none>"),
        "Starting storelens"
    );

    let source = RecordSource::from_config(&settings.source).context("Failed to build record source")?;
    let controller = PageController::new(Arc::new(source), settings.view_options());

    controller
        .update_criteria(|c| {
            if let (Some(from), Some(to)) = (args.from, args.to) {
                c.set_date_range(Some(DateRange::new(from, to)));
            }
            c.set_categories(args.categories.iter().cloned());
            c.set_payment_methods(args.payment_methods.iter().map(|m| PaymentMethod::from(m.as_str())));
            c.set_gender(args.gender.as_deref().map(Gender::from));
            c.set_age_groups(args.age_groups.iter().map(|a| AgeGroup::from(a.as_str())));
        })
        .await;

    let version = args.version.unwrap_or(settings.version);
    let pages = match args.page {
        Some(page) => vec![page],
        None => Page::ALL.to_vec(),
    };

    let mut views = Vec::with_capacity(pages.len());
    for page in pages {
        if let Some(view) = controller
            .load(page, version)
            .await
            .with_context(|| format!("Failed to build {page} ({version})"))?
        {
            views.push(view);
        }
    }

    if controller.source().is_degraded() {
        tracing::warn!("Record feed unavailable; views are built from fixture data");
    }

    let output = if views.len() == 1 {
        serde_json::to_string_pretty(&views[0])?
    } else {
        serde_json::to_string_pretty(&views)?
    };
    println!("{output}");

    if args.audit {
        let records = controller.source().fetch_records().await;
        println!("{}", serde_json::to_string_pretty(&audit(&records))?);
    }

    Ok(())
}
