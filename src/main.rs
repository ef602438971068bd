use anyhow::Result;

mod cli;
mod logging;
mod repl;

fn main() -> Result<()> {
    let args = cli::parse();
    repl::run(args)
}
