use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::Env;
use log::error;
use redstone_anvil::Region;
use redstone_tools::{extract_chunk, local_chunk, parse_coord, replace_chunk};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn chunk_arg(args: &ArgMatches) -> Result<(usize, usize)> {
    let chunk = args.value_of("chunk").ok_or("no chunk given")?;
    let (x, z) = parse_coord(chunk).ok_or("chunk should be given as X,Z")?;
    Ok(local_chunk(x, z).ok_or("chunk coordinates within a region file should be 0..32")?)
}

fn extract(args: &ArgMatches) -> Result<()> {
    let (x, z) = chunk_arg(args)?;
    let path = args.value_of("region").ok_or("no region given")?;
    let mut region = Region::from_stream(File::open(path)?);

    match args.value_of("output") {
        Some(output) => {
            let mut file = File::create(output)?;
            extract_chunk(&mut region, x, z, &mut file)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            extract_chunk(&mut region, x, z, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn replace(args: &ArgMatches) -> Result<()> {
    let (x, z) = chunk_arg(args)?;
    let path = args.value_of("region").ok_or("no region given")?;
    let input = args.value_of("input").ok_or("no input given")?;

    let data = std::fs::read(input)?;
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    let mut region = Region::from_stream(file);

    replace_chunk(&mut region, x, z, &data)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let region = Arg::with_name("region")
        .help("region file, r.X.Z.mca")
        .takes_value(true)
        .required(true);

    let chunk = Arg::with_name("chunk")
        .help("chunk X,Z within the region, both 0..32")
        .takes_value(true)
        .required(true);

    let matches = App::new("redstone")
        .about("Extract or replace single chunks of a region file")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("extract")
                .about("write a chunk's uncompressed NBT to a file or stdout")
                .arg(region.clone())
                .arg(chunk.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .help("file to write to instead of stdout")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("replace")
                .about("store an NBT file as a chunk, replacing what was there")
                .arg(region)
                .arg(chunk)
                .arg(
                    Arg::with_name("input")
                        .help("NBT file, uncompressed, gzip or zlib")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("extract", Some(args)) => extract(args),
        ("replace", Some(args)) => replace(args),
        _ => Err("no action given".into()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
