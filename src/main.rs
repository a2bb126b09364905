use clap::Parser;
use site_assistant_lib::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "site-assistant", version, about = "Site chat assistant, visitor beacon and contact form")]
struct Args {
    /// Page path reported to the site owner by the visitor beacon
    #[arg(long, default_value = "/")]
    page: String,

    /// Do not send the visitor notification email
    #[arg(long)]
    no_beacon: bool,

    /// Open the chat panel immediately
    #[arg(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    site_assistant_lib::run(RunOptions {
        page_path: args.page,
        track_visitor: !args.no_beacon,
        open_on_start: args.open,
    })
    .await
}
