use anyhow::Result;
use minish::{interrupt, Interpreter};

fn main() -> Result<()> {
    env_logger::init();
    interrupt::install()?;

    let mut shell = Interpreter::default();
    let code = shell.repl()?;
    std::process::exit(code)
}
