use clap::Parser;
use thesis_watch::utils::{logger, validation::Validate};
use thesis_watch::{
    CliArgs, FileSnapshotStore, HttpPageSource, RunReport, RunStatus, SmtpMailer, WatchConfig,
    WatchError, Watcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting thesis-watch");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match WatchConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }
    tracing::debug!("Config: {:?}", config.source);

    let source = HttpPageSource::new(&config.source).unwrap_or_else(|e| fail(&e));
    let store = FileSnapshotStore::new(&config.snapshot.path);
    tracing::debug!("Snapshot file: {}", store.path().display());
    let mailer = SmtpMailer::from_config(&config).unwrap_or_else(|e| fail(&e));
    tracing::debug!("Mail relay: {}", mailer.relay());

    let watcher = Watcher::new(source, store, mailer, config.watch_settings());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no email is sent and the snapshot is left alone");
        let (report, digest) = watcher.preview().await.unwrap_or_else(|e| fail(&e));
        if let Some(digest) = digest {
            println!("Subject: {}", digest.subject);
            println!();
            print!("{}", digest.text_body);
        }
        print_report(&report, args.json)?;
        return Ok(());
    }

    let report = watcher.run().await.unwrap_or_else(|e| fail(&e));
    print_report(&report, args.json)?;

    Ok(())
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match report.status {
        RunStatus::Baseline => println!(
            "📋 Baseline recorded: {} titles from {}",
            report.total_titles, report.source
        ),
        RunStatus::Unchanged => println!("✅ No new thesis topics ({} listed)", report.total_titles),
        RunStatus::NewTitles => {
            println!("🚨 {} new thesis topics:", report.new_titles.len());
            for title in &report.new_titles {
                println!("  - {}", title);
            }
        }
        RunStatus::Skipped => println!(
            "⚠️ Run skipped: {}",
            report.skip_reason.as_deref().unwrap_or("fetch failed")
        ),
    }

    if report.status != RunStatus::Skipped && !report.email_sent && report.snapshot_written {
        println!("⚠️ Email could not be sent; snapshot was updated anyway");
    }

    Ok(())
}

fn fail(e: &WatchError) -> ! {
    tracing::error!(
        "❌ thesis-watch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}
