use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use bus::{ActionRequest, ActionResponse};
use clap::{Parser, Subcommand};
use popup::{ChannelConnector, MessageClient, RetryPolicy};
use runtime_storage::{JsonFileArea, MemoryArea, StorageArea, start_storage_runtime};

mod config;
mod logging;

use crate::config::Config;

const TAB: core_types::TabId = 1;

/// Hide and restore page elements by selector, with the hidden set kept per page URL.
#[derive(Debug, Parser)]
#[command(name = "veil", version)]
struct Cli {
    /// HTML file to load as the page.
    #[arg(long)]
    page: PathBuf,
    /// URL the page is treated as coming from; keys the persisted record.
    #[arg(long)]
    url: String,
    /// JSON store file; overrides `storage_path` from the config.
    #[arg(long)]
    store: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the page HTML after the action.
    #[arg(long)]
    dump: bool,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Hide a comma list of bare tag names and selectors.
    Hide { selector: String },
    Show { selector: String },
    /// Hide instances of a tag that carry no id or class.
    HideTag { tag: String },
    ShowTag { tag: String },
    Reset,
    List,
    /// Send a raw JSON message, as the popup would.
    Raw { message: String },
}

impl Action {
    fn into_request(self) -> Result<ActionRequest, ActionResponse> {
        Ok(match self {
            Action::Hide { selector } => ActionRequest::HideElementsUnified { selector },
            Action::Show { selector } => ActionRequest::ShowElementsUnified { selector },
            Action::HideTag { tag } => ActionRequest::HideBareTagElements { tag_name: tag },
            Action::ShowTag { tag } => ActionRequest::ShowTagElements { tag_name: tag },
            Action::Reset => ActionRequest::ResetAll,
            Action::List => ActionRequest::GetHiddenElements,
            Action::Raw { message } => {
                let value: serde_json::Value =
                    serde_json::from_str(&message).map_err(|err| ActionResponse::Failed {
                        error: err.to_string(),
                    })?;
                return bus::decode_request(&value);
            }
        })
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.log_filter)?;

    let url = url::Url::parse(&cli.url).with_context(|| format!("invalid page URL `{}`", cli.url))?;
    let html = std::fs::read_to_string(&cli.page)
        .with_context(|| format!("failed to read page {}", cli.page.display()))?;

    let area: Box<dyn StorageArea + Send> = match cli.store.or(config.storage_path.clone()) {
        Some(path) => Box::new(JsonFileArea::open(&path)?),
        None => {
            tracing::info!("no store configured; hidden state lasts for this run only");
            Box::new(MemoryArea::new())
        }
    };
    let (storage_tx, storage_rx) = mpsc::channel();
    let storage = start_storage_runtime(area, storage_rx);

    let mut connector = ChannelConnector::new(storage_tx);
    connector.open_tab(TAB, url.as_str(), html);
    let policy = RetryPolicy {
        max_retries: config.retry_attempts,
        delay: Duration::from_millis(config.retry_delay_ms),
    };
    let mut client = MessageClient::with_policy(connector, policy);

    let response = match cli.action.into_request() {
        Ok(request) => {
            tracing::debug!(action = request.action_name(), url = %url, "sending request");
            client.request(TAB, &request)
        }
        Err(rejected) => rejected,
    };

    let pages = client.into_connector().close_all();
    // Every storage sender is gone once the pages are closed.
    storage
        .join()
        .map_err(|_| anyhow::anyhow!("storage runtime panicked"))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if cli.dump {
        for (_, page) in &pages {
            println!("{}", page.to_html());
        }
    }
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["veil", "--page", "p.html", "--url", "https://a.test/"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn subcommands_map_to_requests() {
        assert_eq!(
            parse(&["hide", "#banner, footer"]).action.into_request(),
            Ok(ActionRequest::HideElementsUnified {
                selector: "#banner, footer".into()
            })
        );
        assert_eq!(
            parse(&["show-tag", "div"]).action.into_request(),
            Ok(ActionRequest::ShowTagElements {
                tag_name: "div".into()
            })
        );
        assert_eq!(
            parse(&["--dump", "list"]).action.into_request(),
            Ok(ActionRequest::GetHiddenElements)
        );
    }

    #[test]
    fn raw_messages_go_through_the_protocol_decoder() {
        assert_eq!(
            parse(&["raw", r#"{"action":"resetAll"}"#]).action.into_request(),
            Ok(ActionRequest::ResetAll)
        );
        assert_eq!(
            parse(&["raw", r#"{"action":"nope"}"#]).action.into_request(),
            Err(ActionResponse::unknown_action())
        );
        assert!(parse(&["raw", "not json"]).action.into_request().is_err());
    }

    #[test]
    fn page_and_url_are_required() {
        assert!(Cli::try_parse_from(["veil", "list"]).is_err());
    }
}
