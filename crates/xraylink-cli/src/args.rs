use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "xraylink",
    version,
    about = "Sync a Postman CLI run report into the issue tracker and test-management service"
)]
pub struct Cli {
    /// Path to the JSON run report.
    #[arg(default_value = "./results.json", env = "XRAYLINK_RESULTS")]
    pub results: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_results_json() {
        let cli = Cli::parse_from(["xraylink"]);
        assert_eq!(cli.results, PathBuf::from("./results.json"));
    }

    #[test]
    fn positional_path_overrides_default() {
        let cli = Cli::parse_from(["xraylink", "out/report.json"]);
        assert_eq!(cli.results, PathBuf::from("out/report.json"));
    }
}
