//! Edges command implementation.

use crate::cli::EdgesArgs;
use crate::context::{self, Context};
use crate::error::Result;
use crate::output::Formatter;
use kinfolk_domain::traits::EdgeStore;

/// Execute the edges command.
///
/// Lists the accepted edges the person holds, or every edge touching them
/// (pending and rejected included) with `--all`.
pub fn execute_edges(args: EdgesArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let store = ctx.open_store()?;
    let person = context::resolve_person(&store, &args.person)?;

    let edges = if args.all {
        store.edges_for(person.id)?
    } else {
        store.find_accepted(person.id)?
    };
    let names = context::all_names(&store)?;
    println!("{}", formatter.format_edges(&edges, &names)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};
    use crate::error::CliError;
    use kinfolk_domain::{Gender, Person, RelationCode};
    use tempfile::TempDir;

    #[test]
    fn test_edges_for_known_and_unknown_person() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(Config::default(), dir.path().join("config.toml"), None);
        let mut service = ctx.open_service().unwrap();
        let me = Person::new("Ana", Gender::Female);
        let mum = Person::new("Rosa", Gender::Female);
        service.store_mut().add_person(&me).unwrap();
        service.store_mut().add_person(&mum).unwrap();
        service.confirm(me.id, mum.id, RelationCode::Mother).unwrap();
        drop(service);

        let formatter = Formatter::new(OutputFormat::Table, false);
        for all in [false, true] {
            let args = EdgesArgs {
                person: "Ana".to_string(),
                all,
            };
            execute_edges(args, &ctx, &formatter).unwrap();
        }

        let args = EdgesArgs {
            person: "Nobody".to_string(),
            all: false,
        };
        assert!(matches!(
            execute_edges(args, &ctx, &formatter),
            Err(CliError::NotFound(_))
        ));
    }
}
