use tracing::{debug, warn};

use super::transport::QueryTransport;

pub const PENDING_TEXT: &str = "Thinking...";

pub trait QueryView {
    fn prompt(&self) -> String;
    fn set_output(&mut self, text: &str);
    fn reveal_result(&mut self);
    fn set_submit_enabled(&mut self, enabled: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Skipped,
    Answered(String),
    Failed(String),
}

pub struct QueryForm<T> {
    transport: T,
}

impl<T: QueryTransport> QueryForm<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handles one submit. The submit control stays disabled for exactly the
    /// duration of the request and is re-enabled on every path.
    pub async fn submit<V: QueryView + ?Sized>(&self, view: &mut V) -> Submission {
        let raw = view.prompt();
        let prompt = raw.trim();
        if prompt.is_empty() {
            debug!("blank prompt, nothing submitted");
            return Submission::Skipped;
        }

        view.set_submit_enabled(false);
        view.set_output(PENDING_TEXT);
        view.reveal_result();

        let outcome = match self.transport.query(prompt).await {
            Ok(output) => {
                view.set_output(&output);
                Submission::Answered(output)
            }
            Err(err) => {
                warn!(error = %err, "query failed");
                let text = format!("Error: {err}");
                view.set_output(&text);
                Submission::Failed(text)
            }
        };

        view.set_submit_enabled(true);
        outcome
    }
}
