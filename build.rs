use anyhow::Result;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=templates");

    Emitter::default()
        .add_instructions(&GitclBuilder::all_git()?)?
        .emit()?;

    Ok(())
}
