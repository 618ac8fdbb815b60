//! `postify search` and `postify suggest`: the debounced search controller
//! driven from the terminal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use postify_content::CachedContentApi;
use postify_search::{SearchController, SearchState, SuggestionBox};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::content::build_client;
use super::output::{print_json, print_posts, Output};
use crate::config::ClientConfig;

/// Longest we wait for a search to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Controller over the configured CMS, with its state changes streamed
/// into a channel.
fn controller(
    config: &ClientConfig,
) -> Result<(SearchController, mpsc::UnboundedReceiver<SearchState>)> {
    let api = Arc::new(CachedContentApi::new(build_client(config)?));
    let controller = SearchController::new(api, config.search);
    let (tx, rx) = mpsc::unbounded_channel();
    controller.subscribe(move |state| {
        let _ = tx.send(state.clone());
    });
    Ok((controller, rx))
}

/// Wait until the search for `query` has gone through loading and back.
async fn settle(rx: &mut mpsc::UnboundedReceiver<SearchState>, query: &str) -> Option<SearchState> {
    let mut started = false;
    while let Some(state) = rx.recv().await {
        if state.query != query {
            started = false;
            continue;
        }
        if state.loading {
            started = true;
        } else if started {
            return Some(state);
        }
    }
    None
}

async fn settle_or_timeout(
    rx: &mut mpsc::UnboundedReceiver<SearchState>,
    query: &str,
) -> Result<SearchState> {
    tokio::time::timeout(SETTLE_TIMEOUT, settle(rx, query))
        .await
        .map_err(|_| anyhow::anyhow!("Search timed out."))?
        .ok_or_else(|| anyhow::anyhow!("Search controller closed."))
}

fn print_state(state: &SearchState, output: Output) -> Result<()> {
    if let Some(err) = &state.error {
        anyhow::bail!("{}", err);
    }
    print_posts(&state.results, output)
}

/// One-shot debounced search.
pub async fn search(config: &ClientConfig, query: &str, output: Output) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Search query must not be empty.");
    }
    let (controller, mut rx) = controller(config)?;
    controller.set_query(query);
    let state = settle_or_timeout(&mut rx, query).await?;
    controller.dispose();
    print_state(&state, output)
}

/// Replay keystrokes from stdin, one line per state of the text box, and
/// print the suggestions that settle for the final text.
pub async fn suggest(config: &ClientConfig, interval: Duration, output: Output) -> Result<()> {
    let (controller, mut rx) = controller(config)?;
    let mut suggestions = SuggestionBox::new(controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut typed = 0usize;
    while let Some(line) = lines.next_line().await? {
        debug!(text = %line, "keystroke");
        suggestions.input(line);
        typed += 1;
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    info!(keystrokes = typed, "input finished");

    let query = suggestions.controller().query();
    if !suggestions.is_open() {
        println!("Nothing to search.");
        return Ok(());
    }
    // Every state change is buffered in the channel, so a search that
    // settled while stdin was still being read is found there too.
    let state = settle_or_timeout(&mut rx, &query).await?;

    match output {
        Output::Json => print_json(&state.results)?,
        Output::Table => {
            if suggestions.no_results() {
                println!("No results for \"{}\".", query.trim());
            } else {
                print_state(&state, output)?;
            }
            if let Some(route) = suggestions.view_all() {
                println!();
                println!("View all results: {}", route.href());
            }
        }
    }
    Ok(())
}
