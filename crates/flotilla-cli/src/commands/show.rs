//! Show command - print a desired state file

use std::path::Path;

use console::style;
use miette::Result;

use crate::loader;

pub fn run(file: &Path) -> Result<()> {
    println!(
        "{} Desired state at {}",
        style("→").blue(),
        file.display()
    );

    let state = loader::from_file(file)?;
    state.print();

    Ok(())
}
