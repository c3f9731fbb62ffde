use anyhow::Result;
use clap::{Args, ValueEnum};
use parameters::Parameters;
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
pub enum Accessor {
    String,
    Integer,
    Double,
    Probability,
    Boolean,
    List,
    ExistingFile,
    ExistingDirectory
}

#[derive(Args)]
pub struct GetArgs {
    #[arg(help = "Parameter file to load")]
    pub file: PathBuf,

    #[arg(help = "Key to resolve, relative to the namespace")]
    pub key: String,

    #[arg(
        long = "as",
        value_enum,
        default_value = "string",
        help = "Accessor used to decode and validate the value"
    )]
    pub accessor: Accessor,

    #[arg(
        long = "namespace",
        short = 'n',
        help = "Scope to a namespace before resolving (repeat to nest)"
    )]
    pub namespaces: Vec<String>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

fn resolve(params: &Parameters, key: &str, accessor: Accessor) -> Result<serde_json::Value> {
    Ok(match accessor {
        Accessor::String => params.get_string(key)?.into(),
        Accessor::Integer => params.get_integer(key)?.into(),
        Accessor::Double => params.get_double(key)?.into(),
        Accessor::Probability => params.get_probability(key)?.into(),
        Accessor::Boolean => params.get_boolean(key)?.into(),
        Accessor::List => params.get_string_list(key)?.into(),
        Accessor::ExistingFile => params.get_existing_file(key)?.display().to_string().into(),
        Accessor::ExistingDirectory => params
            .get_existing_directory(key)?
            .display()
            .to_string()
            .into()
    })
}

pub fn run(args: GetArgs) -> Result<()> {
    let params = super::load_scoped(&args.file, &args.namespaces)?;
    let value = resolve(&params, &args.key, args.accessor)?;

    if args.json {
        let output = serde_json::json!({
            "key": params.full_name(&args.key),
            "value": value
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match value {
        serde_json::Value::String(s) => println!("{s}"),
        serde_json::Value::Array(items) => {
            for item in items {
                match item {
                    serde_json::Value::String(s) => println!("{s}"),
                    other => println!("{other}")
                }
            }
        }
        other => println!("{other}")
    }
    Ok(())
}
