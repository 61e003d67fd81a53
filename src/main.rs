use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use agent_query::{
    build_app, run_server, AppConfig, AppState, HttpTransport, QueryForm, QueryView, Submission,
};

#[derive(Parser)]
#[command(name = "agent-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the query API, optionally with a static front-end
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        /// Shell command that answers the prompt in $AGENT_PROMPT
        #[arg(long)]
        agent_cmd: Option<String>,

        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Send prompts to the query API; reads stdin when no prompt is given
    Ask {
        prompt: Option<String>,

        /// Origin the client runs under; `file:` origins target the local dev server
        #[arg(long)]
        origin: Option<String>,
    },
}

/// Shared submit flag. Pressing enter takes it; the form gives it back.
#[derive(Clone)]
struct SubmitControl(Arc<AtomicBool>);

impl SubmitControl {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    fn set_enabled(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Accepts a line only while enabled, disabling the control.
    fn press(&self, line: String) -> Option<String> {
        self.0
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| line)
    }
}

/// Terminal rendition of the query form.
struct TerminalView<W> {
    out: W,
    prompt: String,
    output: String,
    revealed: bool,
    submit: SubmitControl,
}

impl<W: Write> TerminalView<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            prompt: String::new(),
            output: String::new(),
            revealed: false,
            submit: SubmitControl::new(),
        }
    }

    fn submit_control(&self) -> SubmitControl {
        self.submit.clone()
    }

    fn show_input_marker(&mut self) -> std::io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }
}

impl<W: Write> QueryView for TerminalView<W> {
    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn set_output(&mut self, text: &str) {
        self.output = text.to_string();
        if self.revealed {
            writeln!(self.out, "{text}").ok();
        }
    }

    fn reveal_result(&mut self) {
        if !self.revealed {
            self.revealed = true;
            writeln!(self.out, "--- result ---").ok();
            writeln!(self.out, "{}", self.output).ok();
        }
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit.set_enabled(enabled);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "agent_query=debug,tower_http=debug"
    } else {
        "agent_query=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::from_env();

    match cli.command {
        Commands::Serve {
            port,
            agent_cmd,
            static_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(agent_cmd) = agent_cmd {
                config.agent_cmd = agent_cmd;
            }
            if static_dir.is_some() {
                config.static_dir = static_dir;
            }

            let app = build_app(AppState::from_config(&config));
            run_server(app, config.port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { prompt, origin } => {
            if let Some(origin) = origin {
                config.page_origin = origin;
            }

            let form = QueryForm::new(HttpTransport::for_origin(&config.page_origin));
            info!(url = form.transport().url(), "query endpoint");

            let mut view = TerminalView::new(std::io::stdout());
            match prompt {
                Some(prompt) => {
                    view.prompt = prompt;
                    match form.submit(&mut view).await {
                        Submission::Failed(_) => Ok(ExitCode::FAILURE),
                        _ => Ok(ExitCode::SUCCESS),
                    }
                }
                None => {
                    prompt_loop(&form, &mut view).await?;
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
    }
}

async fn prompt_loop<W: Write>(
    form: &QueryForm<HttpTransport>,
    view: &mut TerminalView<W>,
) -> Result<()> {
    let control = view.submit_control();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Lines typed while a query is pending hit a disabled control and are dropped.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match control.press(line) {
                    Some(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    None => debug!("submit disabled, input dropped"),
                },
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read stdin");
                    break;
                }
            }
        }
    });

    view.show_input_marker()?;
    while let Some(line) = rx.recv().await {
        view.prompt = line;
        form.submit(&mut *view).await;
        // Blank prompts never reach the form's re-enable step.
        if !view.submit.is_enabled() {
            view.set_submit_enabled(true);
        }
        view.show_input_marker()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use agent_query::{QueryError, QueryTransport, PENDING_TEXT};

    use super::*;

    fn rendered(view: &TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.out.clone()).unwrap()
    }

    #[test]
    fn header_prints_once_on_first_reveal() {
        let mut view = TerminalView::new(Vec::<u8>::new());

        view.set_output(PENDING_TEXT);
        assert_eq!(rendered(&view), "");

        view.reveal_result();
        view.set_output("Sunny, 22°C");
        view.set_output(PENDING_TEXT);
        view.reveal_result();
        view.set_output("Error: rate limited");

        assert_eq!(
            rendered(&view),
            "--- result ---\nThinking...\nSunny, 22°C\nThinking...\nError: rate limited\n"
        );
    }

    #[test]
    fn disabled_control_drops_input() {
        let view = TerminalView::new(Vec::<u8>::new());
        let control = view.submit_control();

        assert_eq!(control.press("first".to_string()), Some("first".to_string()));
        assert!(!control.is_enabled());
        assert_eq!(control.press("typed while pending".to_string()), None);

        control.set_enabled(true);
        assert_eq!(control.press("second".to_string()), Some("second".to_string()));
    }

    struct CheckingTransport {
        control: SubmitControl,
    }

    #[async_trait]
    impl QueryTransport for CheckingTransport {
        async fn query(&self, _prompt: &str) -> Result<String, QueryError> {
            if self.control.press("typed while pending".to_string()).is_some() {
                return Err(QueryError::Decode("control was enabled".to_string()));
            }
            Ok("Sunny, 22°C".to_string())
        }
    }

    #[tokio::test]
    async fn control_is_disabled_only_while_pending() {
        let mut view = TerminalView::new(Vec::<u8>::new());
        let form = QueryForm::new(CheckingTransport {
            control: view.submit_control(),
        });

        view.prompt = "weather in Paris".to_string();
        let outcome = form.submit(&mut view).await;

        assert_eq!(outcome, Submission::Answered("Sunny, 22°C".to_string()));
        assert!(view.submit.is_enabled());
        assert_eq!(rendered(&view), "--- result ---\nThinking...\nSunny, 22°C\n");
    }
}
