use binconsolidate::{
    cli::{parse_args, Command},
    copy, filter, pipeline,
};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args();

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()?;

    match cli.command {
        Command::Filter(args) => {
            filter::run(&args.into())?;
        }
        Command::Compare(args) => {
            pipeline::run(&args.into())?;
        }
        Command::Copy(args) => {
            let copied = copy::run(&args.into())?;
            info!("Copied {} bins", copied);
        }
    }

    Ok(())
}
