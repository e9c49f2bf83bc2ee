use std::error::Error;
use std::io::{self, BufRead};
use std::sync::Arc;

use time::OffsetDateTime;

use log::{error, info, initialize_logger, warn};
use survey::config::Config;
use survey::intake::Intake;
use survey::store::{JsonLinesSink, RecordSink};

/// Reads one JSON submission per line from standard input and writes the
/// pseudonymized records to standard output. Rejections are logged.
fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let config = Config::from_env().map_err(|e| {
        error!(logger, "Invalid configuration"; "error" => %e);
        e
    })?;

    info!(logger, "Starting..."; "source_ip" => config.source_ip());
    let logger = Arc::new(logger);

    let intake = Intake::new(logger.clone());
    let sink = JsonLinesSink::new(io::stdout());

    let mut accepted = 0usize;
    let mut rejected = 0usize;

    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        let number = index + 1;

        if line.trim().is_empty() {
            continue;
        }

        match intake.accept_json(number, &line, OffsetDateTime::now_utc(), config.source_ip()) {
            Ok(record) => {
                sink.write(&record.export()).map_err(|e| {
                    error!(logger, "Failed to write record"; "line" => number, "error" => %e);
                    e
                })?;
                accepted += 1;
            }
            Err(rejection) => {
                let body = serde_json::to_string(&rejection.flatten())?;
                warn!(logger, "Skipping invalid submission"; "line" => number, "rejection" => body);
                rejected += 1;
            }
        }
    }

    info!(logger, "Finished"; "accepted" => accepted, "rejected" => rejected);

    Ok(())
}
