//! AJIT CLI - AArch64 arithmetic JIT

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ajit::{Emitter, Result};
use cli::{Cli, Commands, EXIT_FAILURE, EXIT_SUCCESS, Op};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "ajit=trace" } else { "ajit=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .init();

    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Emit { ops, bytes } => {
            let parsed: Vec<Op> = match ops.iter().map(|s| cli::parse_op(s)).collect() {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    return EXIT_FAILURE;
                }
            };

            let mut emitter = Emitter::new();
            if let Err(err) = emit_all(&mut emitter, &parsed) {
                eprintln!("error: {err}");
                return EXIT_FAILURE;
            }

            if *bytes {
                for byte in emitter.buf().to_bytes() {
                    print!("{byte:02x}");
                }
                println!();
            } else {
                for word in emitter.words() {
                    println!("{word:08x}");
                }
            }
            EXIT_SUCCESS
        }
    }
}

fn emit_all(emitter: &mut Emitter, ops: &[Op]) -> Result<()> {
    for &op in ops {
        match op {
            Op::Add(z, a) => emitter.add(z, a)?,
            Op::Sub(z, a) => emitter.sub(z, a)?,
            Op::Mul(z, a) => emitter.mul(z, a)?,
            Op::Quo(z, a) => emitter.quo(z, a)?,
            Op::Rem(z, a) => emitter.rem(z, a)?,
            Op::Neg(z) => emitter.neg(z),
        }
    }
    Ok(())
}
