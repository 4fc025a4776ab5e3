use std::path::Path;
use std::process;

use clap::{App, Arg, ArgMatches};
use slog::info;
use slog::Logger;

use mmpaxos::conf::ClusterInfo;
use pkv::setup::init_logger;
use pkv::setup::parse_level;
use pkv::PkvError;
use pkv::Server;

fn main() {
    let matches = App::new("pkv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("a redis compatible kv store replicated with multi-column paxos")
        .arg(
            Arg::with_name("cluster")
                .long("cluster")
                .takes_value(true)
                .required(true)
                .help("cluster config file in yaml"),
        )
        .arg(
            Arg::with_name("id")
                .long("id")
                .takes_value(true)
                .required(true)
                .help("replica id of this server, one of the ids in the cluster config"),
        )
        .arg(
            Arg::with_name("log-path")
                .long("log-path")
                .takes_value(true)
                .help("log file path, logs go to stderr if absent"),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .takes_value(true)
                .default_value("info")
                .help("one of trace, debug, info, warn, error, critical"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("pkv: {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), PkvError> {
    let level = matches.value_of("log-level").unwrap_or("info");
    let level = parse_level(level).ok_or_else(|| PkvError::BadArg(format!("log level: {}", level)))?;

    let logger = init_logger(matches.value_of("log-path").map(Path::new), level)?;

    let cluster_path = matches
        .value_of("cluster")
        .ok_or_else(|| PkvError::BadArg("--cluster is required".into()))?;
    let cluster = ClusterInfo::from_file(cluster_path)?;

    let id = matches
        .value_of("id")
        .ok_or_else(|| PkvError::BadArg("--id is required".into()))?;
    let replica_id = id
        .parse::<i64>()
        .map_err(|_| PkvError::BadArg(format!("replica id: {}", id)))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(cluster, replica_id, logger))
}

async fn serve(cluster: ClusterInfo, replica_id: i64, logger: Logger) -> Result<(), PkvError> {
    let mut server = Server::new(&cluster, replica_id, &logger)?;
    info!(logger, "starting replica {}: {:?}", replica_id, server.node);

    server.start();

    tokio::signal::ctrl_c().await?;
    info!(logger, "interrupted, stopping");

    server.stop()?;
    server.join().await?;
    Ok(())
}
