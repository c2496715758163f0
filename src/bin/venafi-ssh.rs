use std::process;

use venafi_ssh::cli;
use venafi_ssh::cli::options::Options;

#[tokio::main]
async fn main() {
    let options = Options::from_args();
    let format = options.general.format;

    let report = match cli::run(options).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1)
        }
    };

    match report.report(format) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => eprintln!("No SSH certificate available"),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1)
        }
    }
    process::exit(report.exit_code())
}
