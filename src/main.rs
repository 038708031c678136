use clap::Parser;
use dupescan::adapters::{
    ConsoleOutputAdapter, CsvOutputAdapter, JsonOutputAdapter, ProgressBarAdapter, TreeOutputAdapter,
};
use dupescan::cli::{Cli, OutputFormat};
use dupescan::logging::init_logging;
use dupescan::ports::OutputPort;
use dupescan::services::ScanWorker;
use std::process;

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose, args.quiet);

    let config = args.to_scan_config();
    let progress = ProgressBarAdapter::new().with_quiet(args.quiet);

    let results = match ScanWorker::new(config).spawn().and_then(|handle| handle.wait_with(&progress)) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error during scan: {}", e);
            process::exit(1);
        }
    };

    let output: Box<dyn OutputPort> = match (args.output_format, &args.output_file) {
        (OutputFormat::Text, Some(path)) => {
            Box::new(ConsoleOutputAdapter::with_file(path).with_summary_only(args.summary_only))
        }
        (OutputFormat::Text, None) => Box::new(ConsoleOutputAdapter::new().with_summary_only(args.summary_only)),
        (OutputFormat::Json, Some(path)) => Box::new(JsonOutputAdapter::with_file(path)),
        (OutputFormat::Json, None) => Box::new(JsonOutputAdapter::with_stdout()),
        (OutputFormat::Csv, Some(path)) => Box::new(CsvOutputAdapter::with_file(path)),
        (OutputFormat::Csv, None) => Box::new(CsvOutputAdapter::with_stdout()),
        (OutputFormat::Tree, Some(path)) => Box::new(TreeOutputAdapter::with_file(path)),
        (OutputFormat::Tree, None) => Box::new(TreeOutputAdapter::with_stdout()),
    };

    if let Err(e) = output.write_results(&results) {
        eprintln!("Error writing results: {:#}", e);
        process::exit(1);
    }
}
