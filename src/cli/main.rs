use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Client;
use rkt_predictor::ml::{read_artifact, verify_artifact, FeatureKind, FeatureLayout};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rkt-cli")]
#[command(about = "RKT predictor CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "RKT_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Send one case to /predict
    Predict {
        /// JSON file with the feature fields (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print metadata of a model artifact without starting the server
    Inspect {
        #[arg(value_name = "ARTIFACT")]
        artifact: PathBuf,

        /// Also check the artifact against this feature layout
        #[arg(short, long)]
        layout: Option<Layout>,
    },

    /// List the fields of a feature layout in model order
    Fields {
        #[arg(value_enum, default_value = "rkt14")]
        layout: Layout,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Rkt14,
    Rkt13,
}

impl From<Layout> for FeatureLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Rkt14 => FeatureLayout::Rkt14,
            Layout::Rkt13 => FeatureLayout::Rkt13,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Predict { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let input: serde_json::Value =
                serde_json::from_str(&raw).context("input is not valid JSON")?;

            let response = client
                .post(format!("{}/predict", cli.endpoint))
                .json(&input)
                .send()
                .await?;

            let status = response.status();
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);

            if !status.is_success() {
                bail!("prediction failed with status {}", status);
            }
        }

        Commands::Inspect { artifact, layout } => {
            let model = read_artifact(&artifact)?;

            println!("{}", serde_json::to_string_pretty(&model.metadata)?);
            println!("Feature order:");
            for (idx, name) in model.feature_names.iter().enumerate() {
                println!("  {:>2}. {}", idx, name);
            }

            if let Some(layout) = layout {
                let layout = FeatureLayout::from(layout);
                verify_artifact(&model, layout)?;
                println!("Artifact matches layout {}", layout);
            }
        }

        Commands::Fields { layout } => {
            let layout = FeatureLayout::from(layout);
            for spec in layout.specs() {
                let kind = match spec.kind {
                    FeatureKind::Float => "float",
                    FeatureKind::Integer => "int",
                };
                println!("{:<24} {}", spec.name, kind);
            }
        }
    }

    Ok(())
}
