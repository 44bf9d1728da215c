use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use eventual::{future::Future, task::EventLoop, timer::Timer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Race,
    All,
}

/// Combine a set of delayed futures and print the outcome.
///
/// Each entry is `<millis>` to fulfill with its own label, or `!<millis>` to
/// reject after that many milliseconds.
#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Mode::Race)]
    mode: Mode,

    #[arg(default_values = ["300", "!100", "200"])]
    delays: Vec<String>,
}

fn contender(index: usize, spec: &str) -> Result<Future<String, String>> {
    let (fail, millis) = match spec.strip_prefix('!') {
        Some(millis) => (true, millis),
        None => (false, spec),
    };
    let d = Duration::from_millis(millis.parse()?);

    Ok(if fail {
        Timer::reject_after(d, format!("#{index} failed after {d:?}"))
    } else {
        Timer::delay(d, format!("#{index} done after {d:?}"))
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let contenders = args
        .delays
        .iter()
        .enumerate()
        .map(|(i, spec)| contender(i, spec))
        .collect::<Result<Vec<_>>>()?;

    let outcome = match args.mode {
        Mode::Race => Future::race(contenders),
        Mode::All => Future::all(contenders).map(|results| results.join(", ")),
    }
    .finally(|| println!("settled at {:?}", EventLoop::now()));

    match EventLoop::block_on(&outcome)? {
        Ok(value) => println!("fulfilled: {value}"),
        Err(reason) => println!("rejected: {reason}"),
    }

    Ok(())
}
