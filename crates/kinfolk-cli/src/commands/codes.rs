//! Codes command implementation.

use crate::context::Context;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the codes command: list every enabled relation type.
pub fn execute_codes(ctx: &Context, formatter: &Formatter) -> Result<()> {
    let service = ctx.open_service()?;
    let defs = service.engine().catalog().all()?;
    println!("{}", formatter.format_codes(&defs)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};
    use kinfolk_domain::RelationCode;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_codes_are_hidden() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(Config::default(), dir.path().join("config.toml"), None);
        let mut store = ctx.open_store().unwrap();
        store.set_relation_enabled(RelationCode::Stepsister, false).unwrap();
        drop(store);

        let service = ctx.open_service().unwrap();
        let defs = service.engine().catalog().all().unwrap();
        assert!(defs.iter().any(|d| d.code == RelationCode::Mother));
        assert!(!defs.iter().any(|d| d.code == RelationCode::Stepsister));

        execute_codes(&ctx, &Formatter::new(OutputFormat::Quiet, false)).unwrap();
    }
}
