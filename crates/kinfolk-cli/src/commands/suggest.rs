//! Suggest command implementation.

use crate::cli::SuggestArgs;
use crate::context::{self, Context};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the suggest command.
pub fn execute_suggest(args: SuggestArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let service = ctx.open_service()?;
    let person = context::resolve_person(service.store(), &args.person)?;

    let mut suggestions = service.suggest(person.id)?;
    if let Some(limit) = args.limit {
        suggestions.truncate(limit);
    }

    let names = context::all_names(service.store())?;
    println!("{}", formatter.format_suggestions(&suggestions, &names)?);
    Ok(())
}
