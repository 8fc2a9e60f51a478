//! Person command implementation.

use crate::cli::{PersonAction, PersonArgs};
use crate::config::OutputFormat;
use crate::context::{self, Context};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use kinfolk_domain::{Gender, Person};

/// Execute the person command.
pub fn execute_person(args: PersonArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    match args.action {
        PersonAction::Add { name, gender } => add_person(ctx, name, gender.into(), formatter),
        PersonAction::Show { person } => show_person(ctx, &person, formatter),
        PersonAction::List => list_persons(ctx, formatter),
    }
}

fn add_person(ctx: &Context, name: String, gender: Gender, formatter: &Formatter) -> Result<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(CliError::InvalidInput("name must not be empty".to_string()));
    }

    let mut store = ctx.open_store()?;
    let person = Person::new(name, gender);
    store.add_person(&person)?;
    tracing::debug!(person = %person.id, "person added");

    match formatter.format() {
        OutputFormat::Table => println!(
            "{}",
            formatter.success(&format!("Added {} ({})", person.display_name, person.id))
        ),
        _ => println!("{}", formatter.format_persons(&[person])?),
    }
    Ok(())
}

fn show_person(ctx: &Context, input: &str, formatter: &Formatter) -> Result<()> {
    let store = ctx.open_store()?;
    let person = context::resolve_person(&store, input)?;
    let edges = store.edges_for(person.id)?;
    let names = context::all_names(&store)?;
    println!("{}", formatter.format_person_detail(&person, &edges, &names)?);
    Ok(())
}

fn list_persons(ctx: &Context, formatter: &Formatter) -> Result<()> {
    let store = ctx.open_store()?;
    println!("{}", formatter.format_persons(&store.list_persons()?)?);
    Ok(())
}
