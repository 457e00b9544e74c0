use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use designpatterns::{contend, Singleton, UnsyncSingleton, ValueHolder};
use tracing::info;

mod params;

use params::{Params, Variant};

// cargo run --bin singleton-demo
// cargo run --bin singleton-demo -- --variant unsync --race 8 -v

fn main() -> Result<()> {
    let params = Params::parse();

    tracing_subscriber::fmt()
        .with_max_level(params.log_level())
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();

    info!(variant = ?params.variant, "singleton demo starting");

    let stdout = io::stdout();
    demo(&params, &mut stdout.lock())
}

fn demo<W: Write>(params: &Params, out: &mut W) -> Result<()> {
    match params.variant {
        Variant::ThreadSafe => run::<Singleton, W>(params, Singleton::instance, out),
        Variant::Unsync => run::<UnsyncSingleton, W>(params, UnsyncSingleton::instance, out),
    }
}

fn run<T, W>(params: &Params, access: fn(&str) -> &'static T, out: &mut W) -> Result<()>
where
    T: ValueHolder + 'static,
    W: Write,
{
    let first = access(&params.first);
    let second = access(&params.second);

    writeln!(out, "{}", first.value())?;
    writeln!(out, "{}", second.value())?;

    if let Some(threads) = params.race {
        let report = contend(threads, access)
            .with_context(|| format!("contention probe with {threads} threads"))?;
        writeln!(out, "{report}")?;
    }

    out.flush()?;
    Ok(())
}
