//! External renderer invocation.

use async_trait::async_trait;
use tokio::process::Command;

use crate::presence::RenderTuple;

/// Sink for render tuples. The gateway client never inspects the outcome;
/// a failing renderer must not disturb the connection.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, tuple: &RenderTuple);
}

/// Invokes an external program as `<command> set <name>,<color>,<headline>`
/// once per state change, fire-and-forget.
pub struct ProcessRenderer {
    command: String,
}

impl ProcessRenderer {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Renderer for ProcessRenderer {
    async fn render(&self, tuple: &RenderTuple) {
        let message = tuple.as_argument();
        tracing::info!(%message, "presence changed");

        match Command::new(&self.command).arg("set").arg(&message).spawn() {
            Ok(mut child) => {
                // Reap in the background; the exit status is not our concern.
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => {
                tracing::warn!("renderer invocation failed: {}", e);
            }
        }
    }
}
