//! Relationship commands: relate, request, accept, reject and unrelate.

use crate::cli::{EdgeArgs, RelateArgs, UnrelateArgs};
use crate::config::OutputFormat;
use crate::context::{self, Context};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the relate command.
pub fn execute_relate(args: RelateArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut service = ctx.open_service()?;
    let subject = context::resolve_person(service.store(), &args.subject)?;
    let other = context::resolve_person(service.store(), &args.other)?;
    let code = context::parse_code(&args.code)?;

    let outcome = service.confirm(subject.id, other.id, code)?;
    let names = context::all_names(service.store())?;
    println!("{}", formatter.format_confirm(&outcome, &names)?);
    Ok(())
}

/// Execute the request command.
pub fn execute_request(args: RelateArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut service = ctx.open_service()?;
    let subject = context::resolve_person(service.store(), &args.subject)?;
    let other = context::resolve_person(service.store(), &args.other)?;
    let code = context::parse_code(&args.code)?;

    let id = service.request(subject.id, other.id, code)?;
    match formatter.format() {
        OutputFormat::Table => println!(
            "{}",
            formatter.success(&format!(
                "Requested {} as {}'s {} ({})",
                other.display_name,
                subject.display_name,
                code.label(),
                id
            ))
        ),
        _ => println!("{}", id),
    }
    Ok(())
}

/// Execute the accept command.
pub fn execute_accept(args: EdgeArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut service = ctx.open_service()?;
    let id = context::parse_edge_id(&args.edge)?;

    let outcome = service.accept_request(id)?;
    let names = context::all_names(service.store())?;
    println!("{}", formatter.format_confirm(&outcome, &names)?);
    Ok(())
}

/// Execute the reject command.
pub fn execute_reject(args: EdgeArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut service = ctx.open_service()?;
    let id = context::parse_edge_id(&args.edge)?;

    let edge = service.reject_request(id)?;
    let names = context::all_names(service.store())?;
    println!("{}", formatter.format_edges(&[edge], &names)?);
    Ok(())
}

/// Execute the unrelate command.
pub fn execute_unrelate(args: UnrelateArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let mut service = ctx.open_service()?;
    let first = context::resolve_person(service.store(), &args.first)?;
    let second = context::resolve_person(service.store(), &args.second)?;

    let removed = service.remove(first.id, second.id)?;
    match formatter.format() {
        OutputFormat::Table if removed == 0 => println!(
            "{}",
            formatter.info(&format!(
                "{} and {} were not related",
                first.display_name, second.display_name
            ))
        ),
        OutputFormat::Table => println!(
            "{}",
            formatter.success(&format!(
                "Removed {} edge(s) between {} and {}",
                removed, first.display_name, second.display_name
            ))
        ),
        _ => println!("{}", removed),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::CliError;
    use kinfolk_domain::traits::EdgeStore;
    use kinfolk_domain::{EdgeStatus, Gender, Person, RelationCode};
    use kinfolk_inference::InferenceError;
    use tempfile::TempDir;

    struct Family {
        _dir: TempDir,
        ctx: Context,
        formatter: Formatter,
        me: Person,
        dad: Person,
        uncle: Person,
    }

    fn family() -> Family {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(Config::default(), dir.path().join("config.toml"), None);
        let mut store = ctx.open_store().unwrap();
        let me = Person::new("Leo", Gender::Male);
        let dad = Person::new("Marco", Gender::Male);
        let uncle = Person::new("Paolo", Gender::Male);
        for p in [&me, &dad, &uncle] {
            store.add_person(p).unwrap();
        }
        Family {
            _dir: dir,
            ctx,
            formatter: Formatter::new(OutputFormat::Quiet, false),
            me,
            dad,
            uncle,
        }
    }

    fn relate(f: &Family, subject: &str, code: &str, other: &str) -> Result<()> {
        let args = RelateArgs {
            subject: subject.to_string(),
            code: code.to_string(),
            other: other.to_string(),
        };
        execute_relate(args, &f.ctx, &f.formatter)
    }

    #[test]
    fn test_relate_infers_uncle() {
        let f = family();
        relate(&f, "Marco", "brother", "Paolo").unwrap();
        relate(&f, "Leo", "father", "Marco").unwrap();

        let store = f.ctx.open_store().unwrap();
        let edges = store.find_accepted(f.me.id).unwrap();
        let uncle = edges
            .iter()
            .find(|e| e.subject == f.me.id && e.object == f.uncle.id)
            .unwrap();
        assert_eq!(uncle.code, RelationCode::UnclePaternal);
        assert!(uncle.created_automatically);
    }

    #[test]
    fn test_relate_twice_is_duplicate() {
        let f = family();
        relate(&f, "Leo", "father", "Marco").unwrap();
        let err = relate(&f, "Leo", "father", "Marco").unwrap_err();
        assert!(matches!(
            err,
            CliError::Inference(InferenceError::DuplicateEdge { .. })
        ));
    }

    #[test]
    fn test_relate_unknown_code() {
        let f = family();
        assert!(matches!(
            relate(&f, "Leo", "godfather", "Marco"),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_then_accept() {
        let f = family();
        let mut service = f.ctx.open_service().unwrap();
        let id = service.request(f.me.id, f.dad.id, RelationCode::Father).unwrap();
        drop(service);

        execute_accept(EdgeArgs { edge: id.to_string() }, &f.ctx, &f.formatter).unwrap();

        let store = f.ctx.open_store().unwrap();
        assert_eq!(store.get_edge(id).unwrap().unwrap().status, EdgeStatus::Accepted);
        assert!(store.exists(f.dad.id, f.me.id).unwrap());
    }

    #[test]
    fn test_request_then_reject() {
        let f = family();
        let args = RelateArgs {
            subject: "Leo".to_string(),
            code: "father".to_string(),
            other: "Marco".to_string(),
        };
        execute_request(args, &f.ctx, &f.formatter).unwrap();

        let store = f.ctx.open_store().unwrap();
        let pending = store.edges_for(f.me.id).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, EdgeStatus::Pending);
        drop(store);

        let edge = EdgeArgs {
            edge: pending[0].id.to_string(),
        };
        execute_reject(edge, &f.ctx, &f.formatter).unwrap();

        let store = f.ctx.open_store().unwrap();
        let edge = store.get_edge(pending[0].id).unwrap().unwrap();
        assert_eq!(edge.status, EdgeStatus::Rejected);
        assert!(!store.exists(f.me.id, f.dad.id).unwrap());
    }

    #[test]
    fn test_accept_bad_id() {
        let f = family();
        let args = EdgeArgs {
            edge: "not-an-id".to_string(),
        };
        assert!(matches!(
            execute_accept(args, &f.ctx, &f.formatter),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unrelate_removes_both_directions() {
        let f = family();
        relate(&f, "Leo", "father", "Marco").unwrap();

        let args = UnrelateArgs {
            first: "Marco".to_string(),
            second: "Leo".to_string(),
        };
        execute_unrelate(args, &f.ctx, &f.formatter).unwrap();

        let store = f.ctx.open_store().unwrap();
        assert!(!store.exists(f.me.id, f.dad.id).unwrap());
        assert!(!store.exists(f.dad.id, f.me.id).unwrap());
    }
}
