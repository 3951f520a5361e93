use tokio::sync::mpsc;

use crate::gateway::Gateway;
use crate::tui::types::{CompletionCall, TuiMsg};

/// Runs one gateway call off the event loop. At most one of these is in
/// flight at a time; there is no cancellation, the task always reports back.
pub fn spawn_completion(gateway: Gateway, tx: mpsc::UnboundedSender<TuiMsg>, call: CompletionCall) {
    tokio::spawn(async move {
        let res = gateway
            .complete(&call.prompt, &call.context, call.max_tokens)
            .await;
        let _ = tx.send(TuiMsg::Completed(res));
    });
}
