use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use obesity_inference::{
    calculate_bmi, classify_bmi, AppConfig, ArtifactStore, PredictionPipeline, PredictorError,
    RawInputs,
};
use obesity_web::{build_telemetry, serve};
use serde_json::json;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "obesity", version, about = "Obesity level predictor")]
struct Cli {
    /// TOML configuration file. Defaults to `obesity.toml` in the working
    /// directory when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the patient form over HTTP. Run from the workspace root or pass
    /// `--config obesity.toml` so the bundled artifacts are found.
    Serve {
        /// Socket address, overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Runs one prediction and prints the report as JSON.
    Predict(PredictArgs),
    /// Computes and classifies a BMI.
    Bmi {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
    },
    /// Summarises the loaded artifacts.
    Artifacts {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args, Debug)]
struct Overrides {
    /// Artifact directory, overrides `artifacts.dir`.
    #[arg(long)]
    artifacts: Option<PathBuf>,
    /// JSON-lines log file, overrides `logging.path`.
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.artifacts {
            config.artifacts.dir = dir.clone();
        }
        if let Some(log) = &self.log {
            config.logging.path = Some(log.clone());
        }
    }
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    overrides: Overrides,
    /// Also write the assembled record to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,
    #[arg(long, default_value = "Male")]
    gender: String,
    #[arg(long, default_value_t = 30)]
    age: u32,
    #[arg(long, default_value_t = 1.70)]
    height: f64,
    #[arg(long, default_value_t = 70.0)]
    weight: f64,
    #[arg(long, default_value = "yes")]
    family_history: String,
    #[arg(long, default_value = "yes")]
    favc: String,
    #[arg(long, default_value_t = 2.0)]
    fcvc: f64,
    #[arg(long, default_value_t = 3.0)]
    ncp: f64,
    /// Defaults to the first vocabulary entry.
    #[arg(long)]
    caec: Option<String>,
    #[arg(long, default_value = "yes")]
    smoke: String,
    #[arg(long, default_value_t = 1.5)]
    ch2o: f64,
    #[arg(long, default_value = "yes")]
    scc: String,
    #[arg(long, default_value_t = 1.0)]
    faf: f64,
    #[arg(long, default_value_t = 1.0)]
    tue: f64,
    /// Defaults to the first vocabulary entry.
    #[arg(long)]
    calc: Option<String>,
    #[arg(long, default_value = "Automobile")]
    mtrans: String,
}

impl PredictArgs {
    fn to_inputs(&self, store: &ArtifactStore) -> RawInputs {
        let first = |field: &str| {
            store
                .vocabulary()
                .values(field)
                .and_then(<[String]>::first)
                .cloned()
                .unwrap_or_default()
        };
        RawInputs::new()
            .with("Gender", self.gender.as_str())
            .with("Age", self.age.to_string())
            .with("Height", self.height.to_string())
            .with("Weight", self.weight.to_string())
            .with("family_history", self.family_history.as_str())
            .with("FAVC", self.favc.as_str())
            .with("FCVC", self.fcvc.to_string())
            .with("NCP", self.ncp.to_string())
            .with("CAEC", self.caec.clone().unwrap_or_else(|| first("CAEC")))
            .with("SMOKE", self.smoke.as_str())
            .with("CH2O", self.ch2o.to_string())
            .with("SCC", self.scc.as_str())
            .with("FAF", self.faf.to_string())
            .with("TUE", self.tue.to_string())
            .with("CALC", self.calc.clone().unwrap_or_else(|| first("CALC")))
            .with("MTRANS", self.mtrans.as_str())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve { bind, overrides } => {
            overrides.apply(&mut config);
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let runtime = Runtime::new()?;
            runtime.block_on(serve(&config))
        }
        Commands::Predict(args) => {
            args.overrides.apply(&mut config);
            handle_predict(&config, &args)
        }
        Commands::Bmi { weight, height } => {
            anyhow::ensure!(height > 0.0, "height must be positive");
            let bmi = calculate_bmi(weight, height);
            let category = classify_bmi(bmi);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "bmi": bmi,
                    "category": category.label(),
                    "bucket": category.bucket(),
                }))?
            );
            Ok(())
        }
        Commands::Artifacts { overrides } => {
            overrides.apply(&mut config);
            let store = load_store(&config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "dir": config.artifacts.dir,
                    "classes": store.label_encoder().classes(),
                    "expected_columns": store.expected_columns(),
                    "categories": store.vocabulary(),
                }))?
            );
            Ok(())
        }
    }
}

fn load_store(config: &AppConfig) -> Result<ArtifactStore> {
    ArtifactStore::load(&config.artifacts.paths())
        .map_err(PredictorError::from)
        .context("Erro ao carregar arquivos")
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<()> {
    let telemetry = build_telemetry(config)?;
    let store = std::sync::Arc::new(load_store(config)?);
    let raw = args.to_inputs(&store);
    let pipeline = PredictionPipeline::new(store).with_telemetry(telemetry);
    let report = pipeline
        .run(&raw)
        .context("Erro ao processar predição; verifique os valores informados")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("{}", report.summary());
    if let Some(path) = &args.csv {
        report.record.write_csv(path)?;
        eprintln!("record written to {}", path.display());
    }
    Ok(())
}
