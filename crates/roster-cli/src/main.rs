//! `roster` — command-line access to the Roster contact layer.
//!
//! # Usage
//!
//! ```text
//! roster list --json
//! roster add --first Ada --surname Lovelace --source ada@example.com --phone 555-0100:2
//! roster edit 3 --note "Analytical engine" --photo ~/ada.jpg
//! roster add --first Eve --private
//! roster favorite 3 1000000 --private
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use roster_core::contact::{
  Address, Contact, Email, Event, PRIVATE_SOURCE, PhoneNumber, PhotoUpdate,
};
use roster_helper::{ContactsHelper, FilePhotoLoader, PhotoLoader};
use roster_store_sqlite::{SqliteLocalStore, SqliteProvider};
use serde::Serialize;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

type Helper = ContactsHelper<SqliteProvider, SqliteLocalStore>;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Manage provider and private contacts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List every contact, one entry per aggregate.
  List,
  /// Show one contact in full.
  Show(Target),
  /// Create a contact.
  Add(AddArgs),
  /// Change fields of an existing contact.
  Edit(EditArgs),
  /// Delete contacts.
  Delete(Targets),
  /// Star contacts.
  Favorite(Targets),
  /// Unstar contacts.
  Unfavorite(Targets),
  /// List the accounts contacts can be stored in.
  Sources,
  /// Print the lookup key of a provider contact.
  Lookup {
    /// Raw contact id.
    id: i64,
  },
}

#[derive(ClapArgs, Debug)]
struct Target {
  /// Raw contact id (or private contact id with `--private`).
  id:      i64,
  /// The id refers to a private contact.
  #[arg(long)]
  private: bool,
}

#[derive(ClapArgs, Debug)]
struct Targets {
  #[arg(required = true)]
  ids:     Vec<i64>,
  /// The ids refer to private contacts.
  #[arg(long)]
  private: bool,
}

#[derive(ClapArgs, Debug)]
struct Fields {
  #[arg(long)]
  first:     Option<String>,
  #[arg(long)]
  middle:    Option<String>,
  #[arg(long)]
  surname:   Option<String>,
  /// `NUMBER[:TYPE]`, repeatable. Replaces all numbers when editing.
  #[arg(long = "phone", value_parser = parse_typed)]
  phones:    Vec<Typed>,
  /// `ADDRESS[:TYPE]`, repeatable.
  #[arg(long = "email", value_parser = parse_typed)]
  emails:    Vec<Typed>,
  /// `ADDRESS[:TYPE]`, repeatable.
  #[arg(long = "address", value_parser = parse_typed)]
  addresses: Vec<Typed>,
  /// `DATE[:TYPE]`, repeatable.
  #[arg(long = "event", value_parser = parse_typed)]
  events:    Vec<Typed>,
  #[arg(long)]
  note:      Option<String>,
  /// Photo file to attach.
  #[arg(long, value_name = "PATH")]
  photo:     Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
  #[command(flatten)]
  fields:  Fields,
  /// Account name to store the contact under.
  #[arg(long, conflicts_with = "private")]
  source:  Option<String>,
  /// Keep the contact in the private store.
  #[arg(long)]
  private: bool,
  #[arg(long)]
  starred: bool,
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
  #[command(flatten)]
  target:       Target,
  #[command(flatten)]
  fields:       Fields,
  #[arg(long, conflicts_with = "photo")]
  remove_photo: bool,
}

/// A `(value, type)` argument such as `555-0100:2`.
#[derive(Debug, Clone)]
struct Typed {
  value: String,
  kind:  Option<i32>,
}

fn parse_typed(raw: &str) -> std::result::Result<Typed, String> {
  if raw.is_empty() {
    return Err("value must not be empty".into());
  }
  let typed = match raw.rsplit_once(':') {
    Some((value, kind)) if !value.is_empty() => match kind.parse() {
      Ok(kind) => Typed { value: value.to_owned(), kind: Some(kind) },
      Err(_) => Typed { value: raw.to_owned(), kind: None },
    },
    _ => Typed { value: raw.to_owned(), kind: None },
  };
  Ok(typed)
}

// Provider type codes used when none is given.
const MOBILE: i32 = 2;
const HOME: i32 = 1;
const BIRTHDAY: i32 = 3;

fn typed<T>(args: &[Typed], default: i32, new: fn(String, i32) -> T) -> Vec<T> {
  args
    .iter()
    .map(|t| new(t.value.clone(), t.kind.unwrap_or(default)))
    .collect()
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  for path in [&settings.provider_path, &settings.local_store_path] {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
  }

  let provider = SqliteProvider::open(&settings.provider_path)
    .await
    .with_context(|| format!("failed to open provider at {:?}", settings.provider_path))?;
  let local = SqliteLocalStore::open(&settings.local_store_path)
    .await
    .with_context(|| format!("failed to open private store at {:?}", settings.local_store_path))?;

  let helper = ContactsHelper::new(Arc::new(provider), Arc::new(local), settings.helper);
  run(&helper, cli.command, cli.json).await
}

async fn run(helper: &Helper, command: Command, json: bool) -> Result<()> {
  match command {
    Command::List => {
      let contacts = helper
        .spawn_get_contacts()
        .await
        .context("listing task ended without a result")?;
      if json {
        return print_json(&contacts);
      }
      for c in &contacts {
        let star = if c.starred { "*" } else { " " };
        let number = c.phone_numbers.first().map_or("", |n| n.value.as_str());
        println!("{star} {:>8}  {:<32} {number}", c.id, c.full_name());
      }
    }

    Command::Show(target) => {
      let contact = fetch(helper, &target).await?;
      if json {
        return print_json(&contact);
      }
      print_contact(&contact);
    }

    Command::Add(args) => {
      let source = match (args.private, args.source) {
        (true, _) => PRIVATE_SOURCE.to_owned(),
        (false, Some(source)) => source,
        (false, None) => bail!("pass --source <ACCOUNT> or --private"),
      };
      let mut contact = Contact { source, starred: args.starred, ..Contact::default() };
      apply_fields(&mut contact, args.fields)?;
      if !helper.insert_contact(&contact).await {
        bail!("failed to save contact");
      }
      tracing::info!(name = %contact.full_name(), "contact added");
    }

    Command::Edit(args) => {
      let mut contact = fetch(helper, &args.target).await?;
      let had_photo = !contact.thumbnail_uri.is_empty() || contact.photo.is_some();
      let new_photo = args.fields.photo.is_some();
      apply_fields(&mut contact, args.fields)?;

      let photo = if args.remove_photo {
        contact.photo = None;
        PhotoUpdate::Removed
      } else if new_photo && had_photo {
        PhotoUpdate::Changed
      } else if new_photo {
        PhotoUpdate::Added
      } else {
        PhotoUpdate::Unchanged
      };

      if !helper.update_contact(&contact, photo).await {
        bail!("failed to update contact {}", contact.id);
      }
      tracing::info!(id = contact.id, "contact updated");
    }

    Command::Delete(targets) => {
      let contacts = fetch_all(helper, &targets).await?;
      if !helper.delete_contacts(&contacts).await {
        bail!("failed to delete contacts");
      }
      tracing::info!(count = contacts.len(), "contacts deleted");
    }

    Command::Favorite(targets) => {
      let contacts = fetch_all(helper, &targets).await?;
      if !helper.add_favorites(&contacts).await {
        bail!("failed to star contacts");
      }
    }

    Command::Unfavorite(targets) => {
      let contacts = fetch_all(helper, &targets).await?;
      if !helper.remove_favorites(&contacts).await {
        bail!("failed to unstar contacts");
      }
    }

    Command::Sources => {
      let sources = helper.get_contact_sources().await;
      if json {
        return print_json(&sources);
      }
      for s in &sources {
        println!("{}\t{}", s.name, s.kind);
      }
    }

    Command::Lookup { id } => {
      let key = helper.get_contact_lookup_key(id).await;
      if key.is_empty() {
        bail!("no provider contact with id {id}");
      }
      println!("{key}");
    }
  }

  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn fetch(helper: &Helper, target: &Target) -> Result<Contact> {
  helper
    .get_contact_with_id(target.id, target.private)
    .await
    .with_context(|| format!("no contact with id {}", target.id))
}

async fn fetch_all(helper: &Helper, targets: &Targets) -> Result<Vec<Contact>> {
  let mut contacts = Vec::with_capacity(targets.ids.len());
  for &id in &targets.ids {
    contacts.push(fetch(helper, &Target { id, private: targets.private }).await?);
  }
  Ok(contacts)
}

/// Copy the given fields onto `contact`. Lists replace what was there.
fn apply_fields(contact: &mut Contact, fields: Fields) -> Result<()> {
  if let Some(first) = fields.first {
    contact.first_name = first;
  }
  if let Some(middle) = fields.middle {
    contact.middle_name = middle;
  }
  if let Some(surname) = fields.surname {
    contact.surname = surname;
  }
  if !fields.phones.is_empty() {
    contact.phone_numbers = typed(&fields.phones, MOBILE, |v, k| PhoneNumber::new(v, k));
  }
  if !fields.emails.is_empty() {
    contact.emails = typed(&fields.emails, HOME, |v, k| Email::new(v, k));
  }
  if !fields.addresses.is_empty() {
    contact.addresses = typed(&fields.addresses, HOME, |v, k| Address::new(v, k));
  }
  if !fields.events.is_empty() {
    contact.events = typed(&fields.events, BIRTHDAY, |v, k| Event::new(v, k));
  }
  if let Some(note) = fields.note {
    contact.notes = note;
  }

  if let Some(path) = fields.photo {
    let path = settings::expand_tilde(&path);
    let uri = path.to_string_lossy().into_owned();
    // Private contacts keep their photo inline.
    if contact.is_private() {
      contact.photo = Some(FilePhotoLoader.load(&uri).context("failed to read photo")?.full);
    }
    contact.photo_uri = uri;
  }
  Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_contact(c: &Contact) {
  println!("{}{}", c.full_name(), if c.starred { " *" } else { "" });
  println!("  id:       {} (aggregate {})", c.id, c.contact_id);
  println!("  source:   {}", c.source);
  for n in &c.phone_numbers {
    println!("  phone:    {} ({})", n.value, n.kind);
  }
  for e in &c.emails {
    println!("  email:    {} ({})", e.value, e.kind);
  }
  for a in &c.addresses {
    println!("  address:  {} ({})", a.value, a.kind);
  }
  for e in &c.events {
    println!("  event:    {} ({})", e.value, e.kind);
  }
  if !c.notes.is_empty() {
    println!("  notes:    {}", c.notes);
  }
  if !c.photo_uri.is_empty() {
    println!("  photo:    {}", c.photo_uri);
  }
}
