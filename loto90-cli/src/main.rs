mod display;
mod import;
mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::display::{
    display_history, display_load_summary, display_pattern_report, display_prediction,
    display_stats, display_submit_report,
};
use loto90_db::db::{MODEL_STATE_KEY, db_path, delete_key, load_json, migrate, open_db, save_json};
use loto90_db::models::{Prediction, Sequence};
use loto90_db::rusqlite::Connection;
use loto90_engine::analysis::{analyze_prediction, pattern_report};
use loto90_engine::random::seeded_rng;
use loto90_engine::stats::Stats;
use loto90_engine::{EngineConfig, Model, ModelState};

const DEFAULT_SAMPLE_COUNT: usize = 15;

#[derive(Parser)]
#[command(name = "loto90", about = "Prédicteur heuristique pour tirages 5 numéros sur 90")]
struct Cli {
    /// Chemin de la base SQLite (défaut : data/loto90.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Fichier JSON de configuration du moteur
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed pour la reproductibilité
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Charger des tirages historiques (une séquence par ligne, séparée par des virgules)
    #[command(alias = "import")]
    Load {
        /// Fichier à lire (entrée standard si absent)
        file: Option<PathBuf>,
    },

    /// Ajouter un résultat et évaluer la dernière prédiction
    #[command(alias = "result")]
    Add {
        /// Les 5 numéros, ex: "3,17,20,44,70"
        numbers: String,
    },

    /// Générer une nouvelle prédiction
    Predict,

    /// Afficher les statistiques du modèle
    Stats,

    /// Analyse détaillée des patterns
    Analysis,

    /// Prédictions passées et derniers tirages
    History,

    /// Générer des tirages aléatoires de démonstration
    Sample {
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        count: usize,
    },

    /// Exporter historique, prédictions et statistiques en JSON
    Export {
        /// Fichier de sortie (défaut : loto90-export-AAAA-MM-JJ.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Réinitialiser le modèle et effacer l'état sauvegardé
    Reset {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Mode interactif
    Interactive,
}

pub(crate) struct App {
    conn: Connection,
    model: Model,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    exported_at: DateTime<Utc>,
    history: &'a [Sequence],
    predictions: &'a [Prediction],
    stats: Stats,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,loto90=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire la configuration {:?}", path))?;
    let config: EngineConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Configuration invalide dans {:?}", path))?;
    Ok(config)
}

/// Un état illisible est remplacé par un modèle vierge plutôt que de bloquer l'outil.
fn load_model(conn: &Connection, config: EngineConfig, seed: Option<u64>) -> Result<Model> {
    let rng = seeded_rng(seed);
    let state = match load_json::<ModelState>(conn, MODEL_STATE_KEY) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "état sauvegardé illisible, démarrage à froid");
            None
        }
    };

    let model = match state {
        Some(state) => Model::from_state(state, config, rng)?,
        None => Model::with_config(config, rng)?,
    };
    Ok(model)
}

impl App {
    fn save(&self) -> Result<()> {
        save_json(&self.conn, MODEL_STATE_KEY, self.model.state())
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let path = cli.db.clone().unwrap_or_else(db_path);
    if let Command::DbPath = cli.command {
        println!("{}", path.display());
        return Ok(());
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;
    let config = load_config(cli.config.as_deref())?;
    let model = load_model(&conn, config, cli.seed)?;
    let mut app = App { conn, model };

    match cli.command {
        Command::Load { file } => cmd_load(&mut app, file.as_deref()),
        Command::Add { numbers } => cmd_add(&mut app, &numbers),
        Command::Predict => cmd_predict(&mut app),
        Command::Stats => cmd_stats(&app),
        Command::Analysis => cmd_analysis(&app),
        Command::History => cmd_history(&app),
        Command::Sample { count } => cmd_sample(&mut app, count),
        Command::Export { output } => cmd_export(&app, output.as_deref()),
        Command::Reset { yes } => {
            if yes || interactive::confirm_reset()? {
                cmd_reset(&mut app)
            } else {
                println!("Réinitialisation annulée.");
                Ok(())
            }
        }
        Command::DbPath => Ok(()),
        Command::Interactive => interactive::run_interactive(&mut app),
    }
}

pub(crate) fn cmd_load(app: &mut App, file: Option<&Path>) -> Result<()> {
    let batch = match file {
        Some(path) => import::parse_file(path)?,
        None => import::parse_sequences(std::io::stdin().lock()),
    };
    cmd_load_batch(app, &batch)
}

pub(crate) fn cmd_load_batch(app: &mut App, batch: &import::ParsedBatch) -> Result<()> {
    if batch.total_lines() == 0 {
        println!("Aucune donnée historique fournie.");
        return Ok(());
    }
    let valid_count = app.model.load_historical(&batch.sequences);
    app.save()?;
    display_load_summary(batch, valid_count);
    Ok(())
}

pub(crate) fn cmd_add(app: &mut App, input: &str) -> Result<()> {
    let numbers = import::parse_result(input)?;
    let report = app.model.submit_result(&numbers)?;
    app.save()?;
    display_submit_report(&report);
    Ok(())
}

pub(crate) fn cmd_predict(app: &mut App) -> Result<()> {
    let prediction = app.model.predict()?;
    app.save()?;
    let analysis = analyze_prediction(&prediction, app.model.history());
    display_prediction(&prediction, &analysis);
    Ok(())
}

pub(crate) fn cmd_stats(app: &App) -> Result<()> {
    display_stats(&app.model.stats());
    Ok(())
}

pub(crate) fn cmd_analysis(app: &App) -> Result<()> {
    display_pattern_report(pattern_report(&app.model).as_ref());
    Ok(())
}

pub(crate) fn cmd_history(app: &App) -> Result<()> {
    display_history(app.model.predictions(), app.model.history());
    Ok(())
}

pub(crate) fn cmd_sample(app: &mut App, count: usize) -> Result<()> {
    let samples = app.model.generate_sample_data(count);
    app.save()?;
    println!("🎲 {} séquences de test générées !", samples.len());
    for sequence in &samples {
        println!("  {}", sequence);
    }
    Ok(())
}

pub(crate) fn cmd_export(app: &App, output: Option<&Path>) -> Result<()> {
    let now = Utc::now();
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("loto90-export-{}.json", now.format("%Y-%m-%d"))),
    };

    let document = ExportDocument {
        exported_at: now,
        history: app.model.history(),
        predictions: app.model.predictions(),
        stats: app.model.stats(),
    };
    let json = serde_json::to_string_pretty(&document).context("Échec de la sérialisation")?;
    std::fs::write(&path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    info!(path = %path.display(), "export écrit");
    println!("📁 Données exportées dans {}", path.display());
    Ok(())
}

pub(crate) fn cmd_reset(app: &mut App) -> Result<()> {
    app.model.reset();
    delete_key(&app.conn, MODEL_STATE_KEY)?;
    println!("🔄 Modèle réinitialisé avec succès !");
    Ok(())
}
