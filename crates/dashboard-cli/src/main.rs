//! Stock dashboard CLI
//!
//! # Usage
//!
//! ```bash
//! # Interactive session
//! cargo run -p dashboard-cli
//!
//! # One page, then exit
//! cargo run -p dashboard-cli -- technical AAPL --timeframe 6mo --data
//! cargo run -p dashboard-cli -- forecast GOOG --chart-dir charts
//! cargo run -p dashboard-cli -- news --watch --interval 15
//! ```

mod cli;

use clap::Parser;
use cli::{Cli, PageCommand};
use std::future::Future;
use std::io::{self, BufRead, Write};
use stock_dashboard::{Dashboard, NewsPage, Outcome, Selection, Session};
use tracing::info;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dashboard_utils::init_tracing(cli.log_format());

    let config = cli.load_config()?;
    let dashboard = Dashboard::new(config)?;

    match cli.page {
        None => run_repl(Session::new(dashboard)).await,
        Some(PageCommand::News {
            watch: true,
            select,
            ..
        }) => watch_news(&dashboard, select, tokio::signal::ctrl_c()).await,
        Some(PageCommand::News { select, .. }) => {
            let mut page = dashboard.news().await?;
            if let Some(selection) = &select {
                page.select(selection)?;
            }
            println!("{page}");
            Ok(())
        }
        Some(page @ PageCommand::Technical { .. }) => {
            let request = page.technical_request().unwrap_or_default();
            let report = dashboard.technical(&request).await?;
            println!("{report}");
            let charts: Vec<_> = report.chart.into_iter().collect();
            print_saved(&dashboard.save_charts(&charts)?);
            Ok(())
        }
        Some(PageCommand::Forecast { symbol }) => {
            let report = dashboard.forecast(&symbol).await?;
            println!("{report}");
            print_saved(&dashboard.save_charts(&report.charts)?);
            Ok(())
        }
    }
}

fn print_saved(paths: &[std::path::PathBuf]) {
    for path in paths {
        println!("Saved chart: {}", path.display());
    }
}

/// Re-fetch the news page on every tick until `shutdown` completes
async fn watch_news(
    dashboard: &Dashboard,
    selection: Option<Selection>,
    shutdown: impl Future,
) -> anyhow::Result<()> {
    let period = dashboard.config().refresh_interval();
    info!(?period, "watching news page");

    let mut ticker = tokio::time::interval(period);
    let mut previous: Option<NewsPage> = None;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                println!("\nGoodbye!");
                break;
            }
            _ = ticker.tick() => {
                match dashboard.refresh_news().await {
                    Ok(mut page) => {
                        match (&previous, &selection) {
                            (Some(prev), _) => page.keep_selection(prev),
                            (None, Some(selection)) => {
                                page.select(selection)?;
                            }
                            (None, None) => {}
                        }
                        print!("{CLEAR_SCREEN}");
                        println!("{page}");
                        println!("\nRefreshing every {}s, Ctrl-C to stop", period.as_secs());
                        previous = Some(page);
                    }
                    // A failed fetch keeps the last page on screen
                    Err(e) => eprintln!("❌ Error: {e}"),
                }
            }
        }
    }

    Ok(())
}

async fn run_repl(mut session: Session) -> anyhow::Result<()> {
    println!("{}\n", session.welcome());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", session.prompt());
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match session.process_input(input).await {
            Ok(Outcome::Render(output)) => println!("{output}\n"),
            Ok(Outcome::Exit) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => eprintln!("❌ Error: {e}\n"),
        }
    }

    Ok(())
}
