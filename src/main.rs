use clap::Parser;
use local_web_server::logger;
use local_web_server::server::config::Cli;
use local_web_server::server::HttpServer;
use log::debug;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init(cli.log_file().as_deref(), cli.timezone)?;

    let config = cli.server_config()?;
    debug!("Starting local web server with config: {:?}", config);

    let server = HttpServer::new(config)?;
    server.launch()?;

    Ok(())
}
