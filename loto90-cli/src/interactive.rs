use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::App;
use crate::import;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Load,
    Add,
    Predict,
    Stats,
    Analysis,
    History,
    Sample,
    Export,
    Reset,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "charger" | "load" => Some(InteractiveCommand::Load),
        "2" | "resultat" | "résultat" | "add" => Some(InteractiveCommand::Add),
        "3" | "predire" | "prédire" | "predict" | "pred" => Some(InteractiveCommand::Predict),
        "4" | "stats" => Some(InteractiveCommand::Stats),
        "5" | "analyse" | "analysis" => Some(InteractiveCommand::Analysis),
        "6" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "7" | "exemples" | "sample" => Some(InteractiveCommand::Sample),
        "8" | "exporter" | "export" => Some(InteractiveCommand::Export),
        "9" | "reinitialiser" | "réinitialiser" | "reset" => Some(InteractiveCommand::Reset),
        "0" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. charger        Charger des tirages historiques");
    println!("  2. resultat       Ajouter un résultat");
    println!("  3. predire        Nouvelle prédiction");
    println!("  4. stats          Statistiques du modèle");
    println!("  5. analyse        Analyse des patterns");
    println!("  6. historique     Prédictions et derniers tirages");
    println!("  7. exemples       Générer des données de test");
    println!("  8. exporter       Exporter en JSON");
    println!("  9. reinitialiser  Réinitialiser le modèle");
    println!("  0. quitter        Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        anyhow::bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

pub fn confirm_reset() -> Result<bool> {
    println!("⚠️ Toutes les données et l'apprentissage seront perdus définitivement.");
    let answer = prompt("Confirmer la réinitialisation ? (o/n) : ")?;
    Ok(answer.to_lowercase() == "o")
}

/// Lit des lignes jusqu'à une ligne vide.
fn read_block() -> Result<String> {
    println!("Une séquence par ligne (ex: 5,12,23,34,45), ligne vide pour terminer :");
    let mut text = String::new();
    loop {
        let line = match prompt("  ") {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.is_empty() {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text)
}

fn cmd_load_interactive(app: &mut App) -> Result<()> {
    let source = prompt_with_default("Fichier (vide = saisie directe)", "")?;
    if source.is_empty() {
        let text = read_block()?;
        let batch = import::parse_sequences(text.as_bytes());
        super::cmd_load_batch(app, &batch)
    } else {
        super::cmd_load(app, Some(PathBuf::from(source).as_path()))
    }
}

fn cmd_add_interactive(app: &mut App) -> Result<()> {
    let input = prompt("Résultat (5 numéros, ex: 3,17,20,44,70) : ")?;
    super::cmd_add(app, &input)
}

fn cmd_sample_interactive(app: &mut App) -> Result<()> {
    let n_str = prompt_with_default("Nombre de séquences", &super::DEFAULT_SAMPLE_COUNT.to_string())?;
    let n: usize = n_str.parse().context("Nombre invalide")?;
    super::cmd_sample(app, n)
}

fn cmd_export_interactive(app: &App) -> Result<()> {
    let output = prompt_with_default("Fichier de sortie (vide = nom daté)", "")?;
    if output.is_empty() {
        super::cmd_export(app, None)
    } else {
        super::cmd_export(app, Some(PathBuf::from(output).as_path()))
    }
}

pub fn run_interactive(app: &mut App) -> Result<()> {
    println!("Bienvenue dans le mode interactif de loto90 !");

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Load) => cmd_load_interactive(app),
            Some(InteractiveCommand::Add) => cmd_add_interactive(app),
            Some(InteractiveCommand::Predict) => super::cmd_predict(app),
            Some(InteractiveCommand::Stats) => super::cmd_stats(app),
            Some(InteractiveCommand::Analysis) => super::cmd_analysis(app),
            Some(InteractiveCommand::History) => super::cmd_history(app),
            Some(InteractiveCommand::Sample) => cmd_sample_interactive(app),
            Some(InteractiveCommand::Export) => cmd_export_interactive(app),
            Some(InteractiveCommand::Reset) => match confirm_reset() {
                Ok(true) => super::cmd_reset(app),
                Ok(false) => {
                    println!("Réinitialisation annulée.");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            None => {
                println!("Commande inconnue : '{}'", input);
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("Erreur : {:#}", e);
        }
    }

    Ok(())
}
