//! `rollbook` command-line front end.
//!
//! # Responsibility
//! - Run one store operation per invocation against the configured file.
//! - Render the record table as plain text.

use clap::{Args, Parser, Subcommand};
use log::debug;
use rollbook_core::{
    init_logging_from_config, FieldClause, FilterSpec, JsonFileRecordRepository, PresenceState,
    RecordFields, RecordId, RecordStore, RollbookConfig, SortColumn, SortDirection, SortSpec,
    ViewProjection,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rollbook", version, about = "Student record table")]
struct Cli {
    /// JSON config file (data_file, page_size, log_level, log_dir).
    #[arg(long, value_name = "PATH", default_value = "rollbook.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the record table.
    List(ListArgs),
    /// Print every field of one record.
    Show { id: RecordId },
    /// Add a record.
    Add(RecordArgs),
    /// Change fields of a record; omitted fields keep their value.
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Delete one or more records.
    Delete {
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Sort column: id, name, git or contact.
    #[arg(long, default_value = "name")]
    sort: String,
    #[arg(long)]
    desc: bool,
    /// Substring of the display name.
    #[arg(long)]
    name: Option<String>,
    /// present, absent or any.
    #[arg(long, value_name = "STATE")]
    git: Option<String>,
    #[arg(long, value_name = "STATE")]
    email: Option<String>,
    #[arg(long, value_name = "STATE")]
    phone: Option<String>,
    #[arg(long, value_name = "STATE")]
    telegram: Option<String>,
    #[arg(long, value_name = "STATE")]
    contact: Option<String>,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long)]
    last: String,
    #[arg(long)]
    first: String,
    #[arg(long)]
    patronymic: Option<String>,
    #[arg(long)]
    git: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    telegram: Option<String>,
}

/// Edit options; an empty string clears an optional field.
#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long)]
    last: Option<String>,
    #[arg(long)]
    first: Option<String>,
    #[arg(long)]
    patronymic: Option<String>,
    #[arg(long)]
    git: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    telegram: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = RollbookConfig::load(&cli.config).map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;
    debug!(
        "event=cli_start module=cli status=ok page_size={}",
        config.page_size
    );

    let repo = JsonFileRecordRepository::new(&config.data_file);
    let mut store = RecordStore::try_open(repo, config.page_size).map_err(|err| err.to_string())?;

    match cli.command {
        Command::List(args) => {
            let column = SortColumn::from_label(&args.sort)
                .ok_or_else(|| format!("unknown sort column `{}`", args.sort))?;
            let direction = if args.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            store.set_filter(list_filter(&args));
            store.set_sort_spec(SortSpec { column, direction });
            store.set_page(args.page);
            print_table(&store.projection());
        }
        Command::Show { id } => {
            let record = store
                .get(id)
                .ok_or_else(|| format!("record not found: {id}"))?;
            println!("{record}");
        }
        Command::Add(args) => {
            let record = store
                .add(new_fields(args))
                .map_err(|err| err.to_string())?;
            println!("added {}", record.short_info());
        }
        Command::Edit { id, fields } => {
            let current = store
                .get(id)
                .ok_or_else(|| format!("record not found: {id}"))?;
            let record = store
                .update(id, edited_fields(current.fields(), fields))
                .map_err(|err| err.to_string())?;
            println!("updated {}", record.short_info());
        }
        Command::Delete { ids } => {
            let removed = store.delete_many(&ids).map_err(|err| err.to_string())?;
            println!("deleted {removed} of {} record(s)", ids.len());
        }
    }
    Ok(())
}

fn list_filter(args: &ListArgs) -> FilterSpec {
    let clause = |state: &Option<String>| {
        state.as_deref().map(|label| FieldClause {
            state: PresenceState::from_label(label),
            text: None,
        })
    };
    FilterSpec {
        name: args.name.clone(),
        git: clause(&args.git),
        email: clause(&args.email),
        phone: clause(&args.phone),
        messaging: clause(&args.telegram),
        contact: clause(&args.contact),
    }
}

fn new_fields(args: RecordArgs) -> RecordFields {
    RecordFields {
        first_name: args.first,
        last_name: args.last,
        patronymic: args.patronymic,
        git: args.git,
        email: args.email,
        phone: args.phone,
        messaging_handle: args.telegram,
    }
}

fn edited_fields(mut fields: RecordFields, edit: EditArgs) -> RecordFields {
    if let Some(last) = edit.last {
        fields.last_name = last;
    }
    if let Some(first) = edit.first {
        fields.first_name = first;
    }
    let optional = [
        (&mut fields.patronymic, edit.patronymic),
        (&mut fields.git, edit.git),
        (&mut fields.email, edit.email),
        (&mut fields.phone, edit.phone),
        (&mut fields.messaging_handle, edit.telegram),
    ];
    for (slot, value) in optional {
        if let Some(value) = value {
            *slot = Some(value);
        }
    }
    fields
}

fn print_table(projection: &ViewProjection) {
    let rows: Vec<[String; 4]> = projection
        .rows
        .iter()
        .map(|row| {
            [
                row.row_number.to_string(),
                row.display_name.clone(),
                row.git.clone(),
                row.contact.clone(),
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for (index, header) in projection.headers.iter().enumerate().take(4) {
        widths[index] = header.chars().count();
    }
    for row in &rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(projection.headers.as_slice()));
    for row in &rows {
        println!("{}", render(row.as_slice()));
    }
    println!(
        "{} ({} record(s), sorted by {} {}{})",
        projection.page_label(),
        projection.total_count,
        projection.sort.column.as_str(),
        projection.sort.direction.as_str(),
        if projection.filter_active {
            ", filtered"
        } else {
            ""
        }
    );
}
