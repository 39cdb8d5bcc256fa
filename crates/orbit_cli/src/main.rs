use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orbit_control::{AutoDesigner, DesignLimit, DesignSource};
use orbit_core::{constants::HOURS_PER_YEAR, Event, EventEnvelope, ThermalState};
use orbit_world::{
    apply_overrides, build_initial_state, create_run_dir, generate_run_id, load_config,
    load_state, parse_override, save_state, validate_config, write_run_info, MetricsFileWriter,
    RunInfo, SimConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "orbit_cli", about = "Orbital compute fleet thermal simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a fixed number of ticks.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    ticks: u64,
    /// RNG seed. A random seed is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Resume from a saved ThermalState JSON file instead of initializing the fleet.
    #[arg(long = "state")]
    state_file: Option<PathBuf>,
    #[arg(long, default_value = "./content")]
    config_dir: String,
    /// Tick length in hours. Overrides `dt_hours` from the config.
    #[arg(long)]
    dt_hours: Option<f64>,
    #[arg(long, default_value_t = 1)]
    print_every: u64,
    /// Config override as key=value. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
    /// Disable automatic metrics collection to runs/ directory.
    #[arg(long)]
    no_metrics: bool,
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn resolve_config(args: &RunArgs) -> Result<(SimConfig, BTreeMap<String, serde_json::Value>)> {
    let mut config = load_config(&args.config_dir)?;

    let mut overrides = args
        .overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<HashMap<_, _>>>()?;
    if let Some(dt_hours) = args.dt_hours {
        overrides.insert("dt_hours".to_string(), serde_json::json!(dt_hours));
    }
    apply_overrides(&mut config, &overrides)?;
    validate_config(&config).context("validating config")?;

    Ok((config, overrides.into_iter().collect()))
}

struct MetricsSink {
    run_dir: PathBuf,
    writer: MetricsFileWriter,
}

impl MetricsSink {
    fn open(info: &RunInfo) -> Result<Self> {
        let run_dir = create_run_dir(Path::new("runs"), &info.run_id)?;
        write_run_info(&run_dir, info)?;
        let writer = MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        Ok(Self { run_dir, writer })
    }

    fn record(&mut self, state: &ThermalState) -> Result<()> {
        self.writer
            .write_row(&orbit_core::compute_metrics(state))
            .context("writing metrics row")
    }

    fn finish(mut self, state: &ThermalState) -> Result<()> {
        self.writer.flush().context("final metrics flush")?;
        save_state(&self.run_dir.join("final_state.json"), state)?;
        info!(run_dir = %self.run_dir.display(), "metrics written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(args: &RunArgs) -> Result<()> {
    let (config, overrides) = resolve_config(args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut state = match &args.state_file {
        Some(path) => load_state(path)?,
        None => build_initial_state(&config, &mut rng),
    };

    let mut metrics = if args.no_metrics {
        None
    } else {
        let info = RunInfo {
            run_id: generate_run_id(seed),
            seed,
            config_version: config.config_version.clone(),
            start_year: state.year,
            dt_hours: config.dt_hours,
            ticks: args.ticks,
            print_every: args.print_every,
            runner: "orbit_cli",
            overrides,
        };
        let mut sink = MetricsSink::open(&info)?;
        sink.record(&state)?;
        info!(run_dir = %sink.run_dir.display(), "run directory created");
        Some(sink)
    };

    info!(
        ticks = args.ticks,
        seed,
        pods = state.total_pods,
        dt_hours = config.dt_hours,
        config_version = %config.config_version,
        "starting simulation"
    );

    let mut designer = AutoDesigner::new(config.design_targets.clone());
    let mut binding: Option<DesignLimit> = None;
    let mut events = Vec::new();
    let print_every = args.print_every.max(1);

    for tick in 1..=args.ticks {
        let prepared = match designer.propose(&state) {
            Some(design) => {
                if binding != Some(design.binding) {
                    info!(
                        binding = ?design.binding,
                        compute_pflops = design.compute_flops / orbit_core::constants::FLOPS_PER_PFLOP,
                        power_kw = design.power_kw,
                        "auto-design limit changed"
                    );
                    binding = Some(design.binding);
                }
                design.apply_to(&state)
            }
            None => state.clone(),
        };

        let year = state.year + config.dt_hours / HOURS_PER_YEAR;
        events.clear();
        state = orbit_core::update_thermal_state_with_events(
            &prepared,
            config.dt_hours,
            year,
            &mut rng,
            &mut events,
        );
        for event in &events {
            log_event(event);
        }

        if tick % print_every == 0 {
            log_status(tick, &state);
        }
        if let Some(sink) = metrics.as_mut() {
            sink.record(&state)?;
        }
    }

    info!("done");
    log_status(args.ticks, &state);
    if let Some(sink) = metrics {
        sink.finish(&state)?;
    }
    Ok(())
}

fn log_event(envelope: &EventEnvelope) {
    let year = envelope.year;
    match &envelope.event {
        Event::ThermalDeath {
            death_fraction,
            lost_fraction,
        } => error!(year, death_fraction, lost_fraction, "thermal death"),
        Event::ComputeCollapse => error!(year, "sustained compute collapsed"),
        Event::RadiatorOverdrive { load_ratio } => {
            warn!(year, load_ratio, "radiator overdrive");
        }
        Event::MaintenanceOverload { ratio } => warn!(year, ratio, "maintenance overload"),
        Event::MicrometeoroidStrike {
            damage_added,
            damage_total,
        } => warn!(year, damage_added, damage_total, "micrometeoroid strike"),
        Event::PumpFailed { restart_failure } => warn!(year, restart_failure, "coolant pump failed"),
        Event::CoolantFroze { duration_hours } => warn!(year, duration_hours, "coolant froze"),
        Event::PumpRecovered => info!(year, "coolant pump recovered"),
        Event::CoolantThawed => info!(year, "coolant thawed"),
    }
}

fn log_status(tick: u64, state: &ThermalState) {
    let pflops = |flops: f64| flops / orbit_core::constants::FLOPS_PER_PFLOP;
    info!(
        tick,
        year = format_args!("{:.2}", state.year),
        core_c = format_args!("{:.1}", state.temp_core_c),
        reject_kw = format_args!("{:.0}/{:.0}", state.heat_reject_kw, state.heat_gen_kw),
        exportable_pflops = format_args!("{:.1}", pflops(state.compute_exportable_flops)),
        degraded = format_args!("{:.1}", state.degraded_pods),
        lost = format_args!("{:.3}", state.lost_fraction),
        constraint = state.dominant_constraint.label(),
        "status"
    );
    debug!(
        power_pct = state.power_utilization_percent,
        radiator_pct = state.radiator_utilization_percent,
        backhaul_pct = state.backhaul_utilization_percent,
        manufacturing_pct = state.manufacturing_utilization_percent,
        maintenance_pct = state.maintenance_utilization_percent,
        "utilization"
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(&args)?,
    }
    Ok(())
}
