//! Generator entry point: entity declarations in, data-access modules out.

use repogen::codegen::{emit, module_name, EmitOptions};
use repogen::schema::{introspect, load_decl};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("usage: repogen <entity.json>... <out-dir>");
        return ExitCode::FAILURE;
    }
    let (decls, out_dir) = args.split_at(args.len() - 1);
    let out_dir = PathBuf::from(&out_dir[0]);

    match run(decls, &out_dir) {
        Ok(count) => {
            tracing::info!(count, out_dir = %out_dir.display(), "generation complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(decls: &[String], out_dir: &Path) -> Result<u32, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;
    let opts = EmitOptions::default();
    let mut count = 0;
    for decl_path in decls {
        let decl = load_decl(Path::new(decl_path))?;
        let descriptor = introspect(&decl)?;
        let code = emit(&descriptor, &opts);
        let target = out_dir.join(format!("{}.rs", module_name(&descriptor)));
        std::fs::write(&target, code)?;
        tracing::info!(
            entity = %descriptor.entity_name,
            target = %target.display(),
            "emitted module"
        );
        count += 1;
    }
    Ok(count)
}
