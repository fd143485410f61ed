mod app;
mod core;
mod db;
mod download;
mod http;
mod models;
mod paging;
mod repository;
#[cfg(test)]
mod test_support;

use app::{cli::Args, config::Config, Photoreel};
use clap::Parser;
use models::notification::Notification;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    crate::core::settings::init(args.verbose);

    let result = match Photoreel::new(Config::config()).await {
        Ok(app) => app.update(args.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("{}", Notification::from(&e));
            std::process::exit(1);
        }
    }
}
