//! encopt binary
//!
//! Positional-argument CLI over the compression pipeline. This is the single
//! place that maps the error taxonomy to process exit behavior: every error
//! is reported as a human-readable message and exits non-zero; invalid
//! arguments never reach the warehouse.

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use encopt_common::{CompressionMode, JobConfig, WarehouseTarget};
use encopt_core::applier::RunSummary;

/// Analyze a schema and alter column compression encodings using the
/// warehouse's own compression advisor. Decisions are journaled in
/// public.encoding_control.
#[derive(Parser, Debug)]
#[command(name = "encopt")]
#[command(version)]
#[command(about = "Alter column compression encodings for a warehouse schema")]
#[command(long_about = "\
Analyzes every table of a schema with the warehouse's compression advisor \
and alters column encodings where the estimated reduction is positive. \
Progress and outcomes are journaled in public.encoding_control.

Modes:
  compress-all    analyze and compress every table in the schema
  compress-small  only tables at or under the threshold (TB)
  compress-large  only tables over the threshold (TB)")]
struct Args {
    /// Cluster identifier.
    cluster_id: String,

    /// Database to connect to.
    database: String,

    /// Secret ARN or friendly name holding the cluster credentials.
    secret_arn: String,

    /// Schema to analyze and compress.
    schema: String,

    /// Compression mode.
    #[arg(value_enum)]
    mode: CompressionMode,

    /// Size threshold in TB; required for compress-small and
    /// compress-large, ignored for compress-all.
    threshold: Option<u64>,
}

impl Args {
    fn into_job(self) -> JobConfig {
        JobConfig::new(
            WarehouseTarget::new(self.cluster_id, self.database, self.secret_arn),
            self.schema,
            self.mode,
            self.threshold,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Bare invocation prints the usage text and succeeds, without touching
    // the warehouse.
    if std::env::args().len() <= 1 {
        Args::command().print_long_help()?;
        return Ok(());
    }

    let job = Args::parse().into_job();

    // Argument validation happens before any client is built.
    if let Err(err) = job.validate() {
        tracing::error!("{err}");
        std::process::exit(1);
    }

    let api = Arc::new(encopt_client::RedshiftDataApi::connect().await);
    match encopt_core::pipeline::run(&job, api).await {
        Ok(summary) => {
            report_completion(&job, &summary);
            Ok(())
        }
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
}

fn report_completion(job: &JobConfig, summary: &RunSummary) {
    let scope = match (job.mode, job.threshold) {
        (CompressionMode::CompressAll, _) => "all required tables".to_string(),
        (CompressionMode::CompressSmall, Some(t)) => {
            format!("all required tables under {t} TB")
        }
        (CompressionMode::CompressLarge, Some(t)) => {
            format!("all required tables over {t} TB")
        }
        (mode, None) => format!("tables selected by {mode}"),
    };
    tracing::info!(
        "compression altered for {scope} in schema {}: {} column(s) altered, \
         {} column(s) left as-is; see public.encoding_control for detail",
        job.schema,
        summary.columns_altered,
        summary.columns_skipped,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(argv)
    }

    const BASE: [&str; 5] = ["encopt", "my-cluster", "dev", "arn:secret", "sales"];

    fn with_mode<'a>(mode: &'a str, threshold: Option<&'a str>) -> Vec<&'a str> {
        let mut argv = BASE.to_vec();
        argv.push(mode);
        if let Some(t) = threshold {
            argv.push(t);
        }
        argv
    }

    #[test]
    fn test_compress_all_without_threshold_parses() {
        let args = parse(&with_mode("compress-all", None)).unwrap();
        assert_eq!(args.mode, CompressionMode::CompressAll);
        assert_eq!(args.threshold, None);
        assert!(args.into_job().validate().is_ok());
    }

    #[test]
    fn test_compress_all_with_trailing_threshold_is_accepted() {
        // The threshold positional is allowed alongside compress-all; the
        // mode just ignores it.
        let args = parse(&with_mode("compress-all", Some("5"))).unwrap();
        assert_eq!(args.mode, CompressionMode::CompressAll);
        assert_eq!(args.threshold, Some(5));
        assert!(args.into_job().validate().is_ok());
    }

    #[test]
    fn test_threshold_modes_parse_with_positive_threshold() {
        let args = parse(&with_mode("compress-large", Some("5"))).unwrap();
        assert_eq!(args.mode, CompressionMode::CompressLarge);
        assert_eq!(args.threshold, Some(5));
        assert!(args.into_job().validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_is_rejected_at_parse() {
        assert!(parse(&with_mode("compress-small", Some("-5"))).is_err());
    }

    #[test]
    fn test_non_numeric_threshold_is_rejected_at_parse() {
        assert!(parse(&with_mode("compress-small", Some("abc"))).is_err());
    }

    #[test]
    fn test_zero_threshold_fails_validation() {
        let args = parse(&with_mode("compress-small", Some("0"))).unwrap();
        assert!(args.into_job().validate().is_err());
    }

    #[test]
    fn test_missing_threshold_fails_validation() {
        let args = parse(&with_mode("compress-small", None)).unwrap();
        assert!(args.into_job().validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(parse(&with_mode("compress-some", None)).is_err());
    }

    #[test]
    fn test_excess_arguments_are_rejected() {
        let mut argv = with_mode("compress-large", Some("5"));
        argv.push("extra");
        assert!(parse(&argv).is_err());
    }
}
