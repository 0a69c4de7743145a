use std::io::{self, Write};
use std::path::PathBuf;

use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use log::{error, info};
use redstone_anvil::{Region, RegionFileLoader};
use redstone_nbt::{Document, ParseOpts};
use redstone_tools::{dump_tree, local_chunk, parse_coord};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn load(args: &ArgMatches) -> Result<Document> {
    let path: PathBuf = args.value_of("path").ok_or("no path given")?.into();

    let mut opts = ParseOpts::new();
    if let Some(depth) = args.value_of("max-depth") {
        opts = opts.max_depth(depth.parse()?);
    }

    let chunk = match args.value_of("chunk") {
        Some(c) => Some(parse_coord(c).ok_or("chunk should be given as X,Z")?),
        None => None,
    };

    let doc = match chunk {
        None => Document::open_with_opts(&path, opts)?,
        // A directory is a world's region directory, coordinates are world
        // chunk coordinates.
        Some((x, z)) if path.is_dir() => RegionFileLoader::new(path).chunk_with_opts(x, z, opts)?,
        // Otherwise a single region file, coordinates are within the region.
        Some((x, z)) => {
            let (x, z) = local_chunk(x, z)
                .ok_or("chunk coordinates within a region file should be 0..32")?;
            let mut region = Region::from_stream(std::fs::File::open(&path)?);
            Document::from_chunk_with_opts(&mut region, x, z, opts)?
        }
    };

    Ok(doc)
}

fn list(args: &ArgMatches) -> Result<()> {
    let path = args.value_of("path").ok_or("no path given")?;
    let mut region = Region::from_stream(std::fs::File::open(path)?);

    let chunks = region.present_chunks()?;
    info!("{} chunks in {}", chunks.len(), path);
    for (x, z) in chunks {
        println!("{},{}", x, z);
    }
    Ok(())
}

fn run(args: &ArgMatches) -> Result<()> {
    if args.is_present("list") {
        return list(args);
    }

    let doc = load(args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.is_present("json") {
        serde_json::to_writer_pretty(&mut out, &doc)?;
        writeln!(out)?;
    } else {
        dump_tree(&mut out, &doc)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let matches = App::new("nbt-dump")
        .about("Print the contents of an NBT file or region chunk")
        .arg(
            Arg::with_name("path")
                .help("NBT file, region file, or region directory")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("chunk")
                .long("chunk")
                .help("load chunk X,Z from a region file or directory")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("list")
                .long("list")
                .help("list the chunks present in a region file")
                .takes_value(false)
                .conflicts_with("chunk"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("print as JSON instead of a tree")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("max-depth")
                .long("max-depth")
                .help("maximum nesting of compounds")
                .takes_value(true)
                .required(false),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        error!("{}", e);
        std::process::exit(1);
    }
}
