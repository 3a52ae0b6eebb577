use core::sync::atomic::{AtomicU32, Ordering};

use clap::Parser;
use inkstand::cmds::App;
use tracing_subscriber::EnvFilter;

static NUM: AtomicU32 = AtomicU32::new(0);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(::std::io::stderr)
        .init();

    let app = App::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name_fn(|| format!("inkstand-worker-{}", NUM.fetch_add(1, Ordering::SeqCst)))
        .build()
    {
        Ok(r) => r,
        Err(e) => return eprintln!("{}", e),
    };

    if let Err(e) = rt.block_on(inkstand::start(app)) {
        eprintln!("error: {}", e);
        ::std::process::exit(1);
    }
}
