use clap::Parser;
use smps_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    if let Err(error) = commands::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("SMPS Processor - Particle Sizer Export Reader");
    println!("=============================================");
    println!();
    println!("Read Scanning Mobility Particle Sizer CSV exports into time-indexed");
    println!("size distributions, query them by date and render heatmaps.");
    println!();
    println!("USAGE:");
    println!("    smps_processor <COMMAND> <INPUT> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    summary     Print the time range and scan count of every record");
    println!("    heatmap     Render a time by diameter concentration heatmap");
    println!("    pnsd        Plot every scan of each record as a size distribution");
    println!("    save        Load a directory of exports and save it as one dataset file");
    println!("    export      Export a dataset to a Parquet file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Increase logging verbosity");
    println!("    -q, --quiet      Suppress output except errors");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Summarise a directory of exports:");
    println!("    smps_processor summary ./data");
    println!();
    println!("    # Heatmap of one day, with records recorded in Tokyo time:");
    println!("    smps_processor heatmap ./data --date 2024-01-02 --time-zone Asia/Tokyo");
    println!();
    println!("    # Heatmap of a range shown in UTC:");
    println!("    smps_processor heatmap ./data --from 2024-01-01 --to 2024-01-07 \\");
    println!("                           --output-time-zone UTC --output-dir figures");
    println!();
    println!("    # Save once, then reuse the saved dataset:");
    println!("    smps_processor save ./data --output dataset.json");
    println!("    smps_processor export dataset.json --output dataset.parquet");
    println!();
    println!("For detailed help on any command, use:");
    println!("    smps_processor <COMMAND> --help");
}
