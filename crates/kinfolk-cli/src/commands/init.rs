//! Init command implementation.

use crate::cli::InitArgs;
use crate::context::Context;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the init command.
pub fn execute_init(args: InitArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    if ctx.config_path.exists() && !args.force {
        println!(
            "{}",
            formatter.info(&format!("Config already exists at {}", ctx.config_path.display()))
        );
    } else {
        ctx.config.save_to(&ctx.config_path)?;
        println!(
            "{}",
            formatter.success(&format!("Wrote config to {}", ctx.config_path.display()))
        );
    }

    ctx.open_store()?;
    println!(
        "{}",
        formatter.success(&format!("Database ready at {}", ctx.db_path.display()))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OutputFormat};
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config_and_database() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(Config::default(), dir.path().join("kin").join("config.toml"), None);
        let formatter = Formatter::new(OutputFormat::Table, false);

        execute_init(InitArgs { force: false }, &ctx, &formatter).unwrap();
        assert!(ctx.config_path.exists());
        assert!(ctx.db_path.exists());

        // Second run keeps the existing file
        std::fs::write(&ctx.config_path, "[settings]\ncolor = false\n").unwrap();
        execute_init(InitArgs { force: false }, &ctx, &formatter).unwrap();
        assert!(!Config::load_from(&ctx.config_path).unwrap().settings.color);

        execute_init(InitArgs { force: true }, &ctx, &formatter).unwrap();
        assert!(Config::load_from(&ctx.config_path).unwrap().settings.color);
    }
}
