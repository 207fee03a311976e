use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use dslab_cloud_energy::experiment::{Experiment, NoCallbacks};
use dslab_cloud_energy::SimulationReport;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Paths to simulation configs (YAML or JSON)
    #[clap(short, long, required = true, multiple_values = true)]
    config: Vec<String>,

    /// Directory for CSV reports
    #[clap(short, long, default_value = "output/csv")]
    output_dir: String,

    /// Number of threads to run configs on
    #[clap(short, long, default_value_t = 1)]
    threads: usize,

    /// Also write per-host details
    #[clap(long)]
    host_details: bool,
}

fn config_stem(config: &str) -> String {
    Path::new(config)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}

/// Names of report files per config: the config file stem,
/// prefixed with the run index if several configs share the stem.
fn report_names(configs: &[String]) -> Vec<String> {
    let stems: Vec<String> = configs.iter().map(|c| config_stem(c)).collect();
    stems
        .iter()
        .enumerate()
        .map(|(i, stem)| {
            if stems.iter().filter(|s| *s == stem).count() > 1 {
                format!("{}-{}", i, stem)
            } else {
                stem.clone()
            }
        })
        .collect()
}

fn report_path(output_dir: &str, name: &str, suffix: &str) -> PathBuf {
    Path::new(output_dir).join(format!("{}{}.csv", name, suffix))
}

fn save_report(report: &SimulationReport, args: &Args, name: &str) -> anyhow::Result<()> {
    let path = report_path(&args.output_dir, name, "");
    report
        .write_csv(&path)
        .with_context(|| format!("can't write report {}", path.display()))?;
    println!("Energy report saved to {}", path.display());
    if args.host_details {
        let path = report_path(&args.output_dir, name, "_hosts");
        report
            .host_details_csv(&path)
            .with_context(|| format!("can't write host details {}", path.display()))?;
        println!("Host details saved to {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logger();
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("can't create output directory {}", args.output_dir))?;

    let names = report_names(&args.config);
    let mut experiment = Experiment::from_files(&args.config, Box::new(NoCallbacks))?;
    let t = Instant::now();
    let results = experiment.run(args.threads);
    info!("Finished {} runs in {:.2}s", results.len(), t.elapsed().as_secs_f64());

    // runs which panicked have no result
    let mut failed = args.config.len() - results.len();
    for run in results {
        match run.result {
            Ok(report) => {
                println!("==== {} ====", run.name);
                report.print();
                save_report(&report, &args, &names[run.id])?;
            }
            Err(e) => {
                eprintln!("Run {} failed: {}", run.name, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} runs failed", failed, args.config.len());
    }
    Ok(())
}
