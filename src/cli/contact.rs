use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use folio_contact::{Controller, EntryKind, HttpTransport, Outcome, Status, Variant};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flow {
    /// Single message prompt
    Terminal,
    /// Message, email, then name
    Conversation,
}

impl From<Flow> for Variant {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Terminal => Variant::Terminal,
            Flow::Conversation => Variant::Conversation,
        }
    }
}

/// Run the contact prompt against a send endpoint over stdin/stdout.
pub async fn run(endpoint: String, flow: Flow) -> Result<()> {
    let variant = Variant::from(flow);
    let controller = Controller::new(variant, Arc::new(HttpTransport::new(endpoint)));

    let printer = tokio::spawn(print_status(controller.subscribe(), variant));

    println!("user@guest:~$ ./contact.sh");
    println!("{}", controller.prompt());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let seen = controller.history().len();
        // A blank line keeps the buffer, so enter alone resends after a failure
        if !line.trim().is_empty() {
            controller.set_input(line);
        }

        match controller.submit().await {
            Outcome::Advanced(_) | Outcome::Rejected(_) => {
                for entry in controller.history().into_iter().skip(seen) {
                    if entry.kind == EntryKind::Question {
                        println!("{}", entry.text);
                    }
                }
            }
            Outcome::Ignored | Outcome::Busy => {}
            Outcome::Delivered => {
                printer.await?;
                return Ok(());
            }
            Outcome::Failed if variant.error_reset().is_none() => {
                printer.await?;
                anyhow::bail!("transmission failed");
            }
            Outcome::Failed => {
                let mut recovered = controller.subscribe();
                recovered
                    .wait_for(|status| *status == Status::Collecting)
                    .await?;
                println!("Press enter to retransmit, or type a new message:");
            }
        }
    }

    Ok(())
}

/// Print status lines as they change, until a state the session cannot leave.
async fn print_status(mut status: watch::Receiver<Status>, variant: Variant) {
    while status.changed().await.is_ok() {
        let current = *status.borrow_and_update();
        for line in current.lines() {
            println!("{line}");
        }

        let finished = match current {
            Status::Sent => true,
            Status::Error => variant.error_reset().is_none(),
            Status::Collecting | Status::Sending => false,
        };
        if finished {
            break;
        }
    }
}
