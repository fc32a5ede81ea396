use clap::Parser;

/// This is an analytics tabulation program for quadratic-voting events.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON description of the event: its identity, its options and
    /// optionally the canvas size used for the network graph layout.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) The file containing the vote records to analyze.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default json) The type of the vote input: json, csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the analytics summary will be written
    /// in JSON format to the given location instead of the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the tabular report (per-option credits, votes
    /// and quadratic scores) will be written in CSV format to the given location.
    #[clap(short, long, value_parser)]
    pub export: Option<String>,

    /// (file path) A reference file containing an analytics summary in JSON format. If
    /// provided, qvtally will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default: first sheet) When using an Excel file, indicates the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
