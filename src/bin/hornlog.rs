//! Answers the queries of a rule file.
//!
//! `.json` files are read as a [`Program`] document; anything else uses the
//! text syntax. Set `RUST_LOG=debug` to follow the saturation passes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hornlog::{build_knowledge_base, entails_with, Program, Status};

fn load(path: &Path) -> Result<Program> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        return serde_json::from_str(&source)
            .with_context(|| format!("invalid rule document {}", path.display()));
    }

    #[cfg(feature = "parsing")]
    {
        hornlog::parse_program(&source).with_context(|| format!("in {}", path.display()))
    }
    #[cfg(not(feature = "parsing"))]
    {
        bail!(
            "{} is not JSON and text rules need the `parsing` feature",
            path.display()
        )
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = std::env::args_os().nth(1) else {
        bail!("usage: hornlog <rules.json | rules.hl>");
    };
    let program = load(Path::new(&path))?;
    let kb = build_knowledge_base(&program.rules).context("invalid knowledge base")?;

    for (index, spec) in program.queries.iter().enumerate() {
        let query = spec
            .to_atom()
            .with_context(|| format!("invalid query {index}"))?;
        let result = entails_with(&kb, &query, program.config);
        match (result.status, result.witness) {
            (Status::Proved, Some(witness)) => println!("proved {query} with {witness}"),
            (Status::IterationLimit, _) => println!(
                "unknown {query}: stopped after {} passes",
                result.iterations
            ),
            _ => println!("not entailed {query}"),
        }
    }
    Ok(())
}
