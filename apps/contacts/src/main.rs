use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    load_gateway_config, load_gateway_config_from, ConfirmationDialog, ContactForm,
    ContactListController, DialogOutcome, FormField, HttpContactGateway, LocalClock,
    RemoveOutcome, SaveOutcome, SortField, UnderageNotice,
};
use shared::{
    domain::{ContactId, Gender},
    protocol::{Contact, NewContact},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "contacts", about = "Manage contacts kept by a REST backend")]
struct Cli {
    /// Backend base URL; `/contatos` is appended.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// TOML file with api_url, auth_token and request_timeout_secs.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        gender: Option<Gender>,
        /// nome, data_nascimento or sexo
        #[arg(long)]
        sort: Option<SortField>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        gender: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
    Remove {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

struct TerminalConfirmation {
    assume_yes: bool,
}

#[async_trait]
impl ConfirmationDialog for TerminalConfirmation {
    async fn confirm_removal(&self, contact: &Contact) -> DialogOutcome {
        if self.assume_yes {
            return DialogOutcome::Confirmed;
        }

        let mut stdout = tokio::io::stdout();
        let prompt = format!("Remove contact {} ({})? [y/N] ", contact.id, contact.name);
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return DialogOutcome::Dismissed;
        }

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(0) | Err(_) => DialogOutcome::Dismissed,
            Ok(_) => match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "s" | "sim" => DialogOutcome::Confirmed,
                _ => DialogOutcome::Declined,
            },
        }
    }
}

struct TerminalUnderageNotice;

impl UnderageNotice for TerminalUnderageNotice {
    fn notify_underage(&self, contact: &NewContact) {
        eprintln!(
            "{} (born {}) is under 18 and cannot be added.",
            contact.name, contact.birth_date
        );
    }
}

fn print_contact(contact: &Contact) {
    println!(
        "{:>5}  {} {:<32} {:<12} {}",
        contact.id,
        contact.gender.symbol(),
        contact.name,
        contact.birth_date,
        contact.gender
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_gateway_config_from(path)?,
        None => load_gateway_config(),
    };
    if let Some(api_url) = cli.api_url {
        config.base_url = api_url;
    }

    let gateway = HttpContactGateway::new(&config).context("failed to set up contacts gateway")?;
    tracing::debug!(collection_url = gateway.collection_url(), "contacts backend configured");
    let assume_yes = matches!(cli.command, Command::Remove { yes: true, .. });
    let controller = ContactListController::new_with_dependencies(
        Arc::new(gateway),
        Arc::new(TerminalConfirmation { assume_yes }),
        Arc::new(TerminalUnderageNotice),
        Arc::new(LocalClock),
    );

    match cli.command {
        Command::List {
            gender,
            sort,
            search,
        } => {
            controller.load().await?;
            if let Some(gender) = gender {
                controller.filter_by_gender(gender).await;
            }
            if let Some(field) = sort {
                controller.sort_by(field).await;
            }
            controller.set_search_term(search).await;

            let snapshot = controller.snapshot().await;
            for contact in &snapshot.visible {
                print_contact(contact);
            }
            println!("{} of {} contacts", snapshot.visible.len(), snapshot.contacts.len());
        }
        Command::Show { id } => {
            let contact = controller.select(ContactId(id)).await?;
            controller.cancel().await;
            print_contact(&contact);
        }
        Command::Add {
            name,
            birth_date,
            gender,
        } => {
            controller.start_create().await;
            controller
                .set_form(ContactForm {
                    name,
                    birth_date,
                    gender,
                })
                .await;
            match controller.save().await? {
                SaveOutcome::Created(contact) => {
                    print!("created ");
                    print_contact(&contact);
                }
                SaveOutcome::Underage => bail!("contact was not saved"),
            }
        }
        Command::Edit {
            id,
            name,
            birth_date,
            gender,
        } => {
            controller.select(ContactId(id)).await?;
            let edits = [
                (FormField::Name, name),
                (FormField::BirthDate, birth_date),
                (FormField::Gender, gender),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    controller.set_field(field, value).await;
                }
            }
            let contact = controller.update().await?;
            print!("updated ");
            print_contact(&contact);
        }
        Command::Remove { id, .. } => {
            let contact = controller.select(ContactId(id)).await?;
            match controller.remove(&contact).await? {
                RemoveOutcome::Removed { id, .. } => println!("removed contact {id}"),
                RemoveOutcome::Declined | RemoveOutcome::Dismissed => println!("nothing removed"),
            }
        }
    }

    Ok(())
}
