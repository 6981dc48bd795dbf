use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use accident_stats::analysis::AccidentFrame;
use accident_stats::analysis::alcohol::{alcohol_cause_table, locality_share, most_frequent_alcohol_cause};
use accident_stats::analysis::hypothesis::road_class_fatality;
use accident_stats::config::Settings;
use accident_stats::geo::cluster::{DEFAULT_CLUSTERS, KMeans};
use accident_stats::geo::make_geo;
use accident_stats::ingest::DataDownloader;
use accident_stats::logging::{self, Stage};
use accident_stats::model::{AccidentError, Region, Result};
use accident_stats::regions::parse_region_list;
use accident_stats::{plot, verify};

#[derive(Parser)]
#[command(name = "accident_stats", version, about = "Czech road accident statistics")]
struct Cli {
    /// Print timestamps on console log lines
    #[arg(long, global = true)]
    timestamps: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the latest archive of every year into the data folder
    Download,
    /// Count accidents per year and region and plot them
    Stat {
        /// Region codes, comma separated; configured regions when omitted
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        regions: Vec<String>,
        #[arg(long)]
        fig_location: Option<PathBuf>,
        #[arg(long)]
        show_figure: bool,
    },
    /// Write the combined dataset of the given regions to a file
    Export {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        regions: Vec<String>,
    },
    /// Consequence, damage and surface charts from an exported dataset
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        verbose: bool,
        #[arg(long)]
        conseq: Option<PathBuf>,
        #[arg(long)]
        damage: Option<PathBuf>,
        #[arg(long)]
        surface: Option<PathBuf>,
        #[arg(long)]
        show_figure: bool,
    },
    /// Alcohol involvement by main cause
    Table {
        #[arg(long)]
        input: PathBuf,
        /// Map of the JHM alcohol accidents
        #[arg(long)]
        alcohol_fig: Option<PathBuf>,
    },
    /// Chi-squared test: fatality on first- vs third-class roads
    Hypothesis {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 0.05)]
        alpha: f64,
    },
    /// Accident maps and clustering for the South Moravian region
    Geo {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        geo_fig: Option<PathBuf>,
        #[arg(long)]
        cluster_fig: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_CLUSTERS)]
        clusters: usize,
        #[arg(long)]
        show_figure: bool,
    },
    /// Check the data portal, or the local archives with --local
    Verify {
        #[arg(long)]
        local: bool,
        /// Write the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    logging::init_logger(settings.log_level, settings.log_file.as_deref(), cli.timestamps);

    if let Err(e) = run(cli.command, settings) {
        logging::error(Stage::System, None, &e.to_string());
        process::exit(1);
    }
}

fn regions_or_default(codes: &[String], settings: &Settings) -> Result<Vec<Region>> {
    if codes.is_empty() {
        Ok(settings.default_regions.clone())
    } else {
        parse_region_list(codes)
    }
}

fn run(command: Command, settings: Settings) -> Result<()> {
    match command {
        Command::Download => {
            let downloader = DataDownloader::new(settings)?;
            let saved = downloader.download_data()?;
            logging::info(Stage::Download, None, &format!("{} archives ready", saved.len()));
        }

        Command::Stat { regions, fig_location, show_figure } => {
            let regions = regions_or_default(&regions, &settings)?;
            let mut downloader = DataDownloader::new(settings)?;
            let records = downloader.get_list(&regions)?;
            plot::plot_stat(&records, fig_location.as_deref(), show_figure)?;
        }

        Command::Export { output, regions } => {
            let regions = regions_or_default(&regions, &settings)?;
            let mut downloader = DataDownloader::new(settings)?;
            let frame = AccidentFrame::new(downloader.get_list(&regions)?);
            frame.save(&output)?;
            logging::info(
                Stage::Cache,
                None,
                &format!("{} records written to {}", frame.len(), output.display()),
            );
        }

        Command::Analyze { input, verbose, conseq, damage, surface, show_figure } => {
            let frame = AccidentFrame::load(&input, verbose)?;
            plot::plot_conseq(&frame.records, conseq.as_deref(), show_figure)?;
            plot::plot_damage(&frame.records, damage.as_deref(), show_figure)?;
            plot::plot_surface(&frame.records, surface.as_deref(), show_figure)?;
        }

        Command::Table { input, alcohol_fig } => {
            let frame = AccidentFrame::load(&input, false)?;
            let rows = alcohol_cause_table(&frame.records);
            if rows.is_empty() {
                return Err(AccidentError::EmptyDataset);
            }

            println!("{:<30} {:>10} {:>10}", "Hlavní příčina", "Absolutně", "Relativně");
            for row in &rows {
                println!("{:<30} {:>10} {:>9.2}%", row.cause.label(), row.absolute, row.relative_pct);
            }
            println!();
            if let Some(top) = rows.last() {
                println!(
                    "Relatively most alcohol-related cause: {} ({:.2}%)",
                    top.cause.label(),
                    top.relative_pct
                );
            }
            if let Some(top) = most_frequent_alcohol_cause(&rows) {
                println!(
                    "Most alcohol accidents in absolute numbers: {} ({})",
                    top.cause.label(),
                    top.absolute
                );
            }
            match locality_share(&frame.records, Region::Jhm) {
                Some(share) => println!("JHM alcohol accidents in town: {:.2}%", share),
                None => println!("JHM: no alcohol accidents"),
            }
            if alcohol_fig.is_some() {
                plot::plot_alcohol_map(&frame.records, alcohol_fig.as_deref(), false)?;
            }
        }

        Command::Hypothesis { input, alpha } => {
            let frame = AccidentFrame::load(&input, false)?;
            let outcome = road_class_fatality(&frame.records)?;
            let result = &outcome.result;
            println!("chi2 = {:.4}, dof = {}, p = {:.6e}", result.statistic, result.dof, result.p_value);
            if result.rejects(alpha) {
                let direction = if outcome.first_class_more_fatal() { "more" } else { "less" };
                println!(
                    "Rejected at alpha = {}: fatal accidents are {} likely on first-class roads",
                    alpha, direction
                );
            } else {
                println!("Not rejected at alpha = {}: no evidence of a difference", alpha);
            }
        }

        Command::Geo { input, geo_fig, cluster_fig, clusters, show_figure } => {
            let frame = AccidentFrame::load(&input, false)?;
            let geo = make_geo(&frame.records);
            logging::info(
                Stage::Geo,
                None,
                &format!("{} of {} records have coordinates", geo.len(), frame.len()),
            );
            plot::plot_geo(&geo, geo_fig.as_deref(), show_figure)?;
            plot::plot_cluster(&geo, &KMeans::new(clusters), cluster_fig.as_deref(), show_figure)?;
        }

        Command::Verify { local, output } => {
            let report = if local {
                verify::verify_local(&settings)?
            } else {
                let downloader = DataDownloader::new(settings)?;
                verify::verify_source(downloader.client(), downloader.settings())
            };
            verify::print_summary(&report);
            if let Some(path) = output {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
            }
        }
    }
    Ok(())
}
