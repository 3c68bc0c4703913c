//! Report workflow and the interactive follow-up session.
//!
//! Collaborator failures are independent: a missing infobox, an unknown
//! ticker, or an LLM error each produce their own notice without taking the
//! rest of the run down with them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use prep_common::LlmConfig;
use prep_config::{LlmProviderConfig, PrepConfig};
use prep_llm::ensure_llm_ready;
use prep_llm::traits::LlmClient;
use prep_markets::FmpClient;
use prep_wiki::WikiClient;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Cli;
use crate::report;

/// Most recently generated guide, carried explicitly between handlers for
/// the lifetime of the interactive session. Nothing here is persisted.
#[derive(Default)]
pub struct PrepSession {
    guide: Option<String>,
}

impl PrepSession {
    pub fn set_guide(&mut self, guide: String) {
        self.guide = Some(guide);
    }

    pub fn guide(&self) -> Option<&str> {
        self.guide.as_deref()
    }
}

struct Clients {
    wiki: WikiClient,
    markets: FmpClient,
    llm: Arc<dyn LlmClient + Send + Sync>,
}

fn build_clients(cfg: &PrepConfig) -> Result<Clients> {
    let wiki = WikiClient::with_base_url(&cfg.wiki.base_url)
        .and_then(|c| c.with_user_agent(&cfg.wiki.user_agent))
        .and_then(|c| c.with_accept_language(&cfg.wiki.accept_language))
        .map(|c| c.with_timeout(Duration::from_secs(cfg.wiki.timeout_secs)))
        .context("wiki client init")?;

    let markets = FmpClient::with_base_url(cfg.markets.api_key.clone(), &cfg.markets.endpoint)
        .context("markets client init")?;

    let LlmProviderConfig::Cohere {
        api_key,
        model,
        temperature,
        endpoint,
    } = &cfg.llm;
    let llm = ensure_llm_ready(&LlmConfig::Cohere {
        api_key: api_key.clone(),
        model: model.clone(),
        temperature: *temperature,
        base_url: Some(endpoint.clone()),
    })
    .context("LLM client init")?;

    Ok(Clients { wiki, markets, llm })
}

pub async fn run(cli: Cli, cfg: PrepConfig) -> Result<()> {
    let clients = build_clients(&cfg)?;
    let mut session = PrepSession::default();

    tracing::info!(company = %cli.company, role = %cli.role, "app.report.start");

    // 1) Infobox
    report::section("1. Encyclopedia Infobox");
    match clients.wiki.infobox(&cli.company).await {
        Ok(infobox) => {
            if let Some(url) = &infobox.image {
                println!("Logo: {url}");
                println!();
            }
            let rows: Vec<(String, String)> = infobox
                .rows
                .iter()
                .map(|r| (r.label.clone(), r.value.clone()))
                .collect();
            report::kv_table(&rows);
        }
        Err(e) => {
            tracing::warn!(error = %e, "app.infobox.failed");
            report::notice(
                "Sorry, it seems that we cannot fetch this company's information right now. \
                 Make sure the name of the company you are searching for is entered correctly \
                 and that the company also exists.",
            );
            return Ok(());
        }
    }

    // 2) Profile & financial metrics
    report::section("2. Company Profile & Financial Metrics");
    let ticker = match clients.markets.search_ticker(&cli.company).await {
        Ok(ticker) => ticker,
        Err(e) => {
            tracing::warn!(error = %e, "app.ticker.failed");
            None
        }
    };
    match &ticker {
        None => report::notice(
            "Sorry, we can't pull the company's profile or financial details right now. \
             It also seems like this company is not traded publicly and thus we cannot \
             provide a stock ticker.",
        ),
        Some(symbol) => {
            println!("Ticker symbol: {symbol}");
            match clients.markets.profile(symbol).await {
                Ok(profile) => {
                    if let Some(desc) = profile.description() {
                        println!();
                        println!("Description: {desc}");
                    }
                    let fields = profile.fields();
                    if !fields.is_empty() {
                        println!();
                        report::kv_table(&fields);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "app.profile.failed");
                    report::notice(
                        "Sorry, we can't pull the company's profile or financial details \
                         right now. We're working to expand our coverage - please check back \
                         soon! In the meantime, feel free to use the ticker symbol shown \
                         above to look up this company's information on any financial website.",
                    );
                }
            }
        }
    }

    // 3) Prep guide
    report::section("3. Interview Prep Guide");
    match clients.llm.prep_guide(&cli.company, &cli.role).await {
        Ok(guide) => {
            println!("{guide}");
            if let Some(path) = &cli.save {
                save_guide(path, &guide);
            }
            session.set_guide(guide);
        }
        Err(e) => {
            tracing::warn!(error = %e, "app.guide.failed");
            report::notice(&format!("Failed to generate the prep guide: {e}"));
        }
    }

    // 4) Follow-up Q&A and practice questions need a guide to ground in
    if session.guide().is_some() && !cli.non_interactive {
        interactive_loop(&clients, &session, &cli).await?;
    }

    Ok(())
}

async fn interactive_loop(clients: &Clients, session: &PrepSession, cli: &Cli) -> Result<()> {
    use std::io::Write as _;

    report::section("4. Follow-up");
    println!("Commands: ask <question> | quiz | save [path] | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        // the loop only starts once a guide exists
        let Some(guide) = session.guide() else {
            break;
        };

        match command {
            "ask" => {
                if rest.is_empty() {
                    report::notice("Please enter a follow-up question.");
                    continue;
                }
                match clients.llm.followup_answer(guide, rest).await {
                    Ok(answer) => {
                        println!();
                        println!("Answer: {answer}");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "app.followup.failed");
                        report::notice(&format!("Failed to generate an answer: {e}"));
                    }
                }
            }
            "quiz" => match clients.llm.practice_question(&cli.role, guide).await {
                Ok(question) => {
                    println!();
                    println!("Practice question: {question}");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "app.practice.failed");
                    report::notice(&format!("Failed to generate a practice question: {e}"));
                }
            },
            "save" => {
                let path = if rest.is_empty() {
                    default_save_path(&cli.company)
                } else {
                    PathBuf::from(rest)
                };
                save_guide(&path, guide);
            }
            "quit" | "exit" => break,
            other => report::notice(&format!(
                "Unknown command '{other}'. Commands: ask <question> | quiz | save [path] | quit"
            )),
        }
    }

    Ok(())
}

fn default_save_path(company: &str) -> PathBuf {
    PathBuf::from(format!("{company}_prep.txt"))
}

fn save_guide(path: &Path, guide: &str) {
    match std::fs::write(path, guide) {
        Ok(()) => println!("Saved prep guide to {}", path.display()),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "app.save.failed");
            report::notice(&format!(
                "Could not save the guide to {}: {e}",
                path.display()
            ));
        }
    }
}
