use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DumpArgs {
    #[arg(help = "Parameter file to load")]
    pub file: PathBuf,

    #[arg(
        long = "namespace",
        short = 'n',
        help = "Scope to a namespace before dumping (repeat to nest)"
    )]
    pub namespaces: Vec<String>,

    #[arg(long, help = "Print keys relative to the namespace instead of fully qualified")]
    pub relative: bool,

    #[arg(long, help = "Start the dump with a timestamp comment")]
    pub timestamp: bool,

    #[arg(long, help = "Output as JSON", conflicts_with = "timestamp")]
    pub json: bool
}

pub fn run(args: DumpArgs) -> Result<()> {
    let params = super::load_scoped(&args.file, &args.namespaces)?;

    if args.json {
        let output: serde_json::Map<String, serde_json::Value> = params
            .keys()
            .map(|key| {
                let name = if args.relative {
                    key.to_string()
                } else {
                    params.full_name(key)
                };
                params
                    .get_string(key)
                    .map(|value| (name, serde_json::Value::String(value)))
            })
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", params.dump_with(args.timestamp, !args.relative));
    Ok(())
}
