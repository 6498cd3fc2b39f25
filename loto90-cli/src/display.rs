use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ParsedBatch;
use loto90_db::models::{Prediction, Sequence};
use loto90_engine::SubmitReport;
use loto90_engine::analysis::{ConfidenceBand, PatternReport, PredictionAnalysis, Spacing};
use loto90_engine::stats::Stats;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_load_summary(batch: &ParsedBatch, valid_count: usize) {
    for error in &batch.errors {
        println!("  Ligne {} rejetée : {}", error.line, error.message);
    }
    let total = batch.total_lines();
    if valid_count == total {
        println!("✅ {} séquence(s) chargée(s) avec succès !", valid_count);
    } else {
        println!("⚠️ {}/{} séquence(s) valide(s) chargée(s)", valid_count, total);
    }
}

pub fn display_submit_report(report: &SubmitReport) {
    println!("🎯 {}", report.message);
    if let Some(evaluation) = &report.evaluation {
        println!(
            "   Dernière prédiction : {} bon(s) numéro(s) ({}%)",
            evaluation.matches.len(),
            evaluation.accuracy_percent
        );
        if !evaluation.matches.is_empty() {
            println!("   Numéros trouvés : {}", format_numbers(&evaluation.matches));
        }
    }
}

pub fn display_prediction(prediction: &Prediction, analysis: &PredictionAnalysis) {
    println!("\n🔮 Prédiction : {}", format_numbers(prediction.numbers.numbers()));
    println!("   Confiance du modèle : {}%\n", prediction.confidence.round());

    let mut table = new_table(vec!["Critère", "Valeur", "Verdict"]);

    let sum_verdict = match &analysis.sum_deviation {
        Some(dev) if dev.balanced => Cell::new(format!(
            "✓ Proche de la moyenne ({})",
            dev.historical_average.round()
        ))
        .fg(Color::Green),
        Some(dev) => Cell::new(format!(
            "⚠ Écart notable de la moyenne ({})",
            dev.historical_average.round()
        ))
        .fg(Color::Yellow),
        None => Cell::new("—"),
    };
    table.add_row(vec![
        Cell::new("Somme totale"),
        Cell::new(analysis.sum),
        sum_verdict,
    ]);

    let parity_verdict = if analysis.parity_balanced {
        Cell::new("✓ Distribution équilibrée").fg(Color::Green)
    } else {
        Cell::new("⚠ Distribution déséquilibrée").fg(Color::Yellow)
    };
    table.add_row(vec![
        Cell::new("Nombres pairs"),
        Cell::new(format!("{}/5", analysis.even_count)),
        parity_verdict,
    ]);

    let spacing_verdict = match analysis.spacing {
        Spacing::Optimal => Cell::new("✓ Espacement optimal").fg(Color::Green),
        Spacing::Tight => Cell::new("ℹ Espacement serré").fg(Color::Cyan),
        Spacing::Wide => Cell::new("ℹ Espacement large").fg(Color::Cyan),
    };
    table.add_row(vec![
        Cell::new("Écart moyen"),
        Cell::new(format!("{:.1}", analysis.average_gap)),
        spacing_verdict,
    ]);

    let confidence_verdict = match analysis.confidence_band {
        ConfidenceBand::High => Cell::new("✓ Confiance élevée").fg(Color::Green),
        ConfidenceBand::Medium => Cell::new("⚠ Confiance modérée").fg(Color::Yellow),
        ConfidenceBand::Low => {
            Cell::new("⚠ Confiance faible - Plus de données nécessaires").fg(Color::Red)
        }
    };
    table.add_row(vec![
        Cell::new("Confiance"),
        Cell::new(format!("{}%", prediction.confidence.round())),
        confidence_verdict,
    ]);

    println!("{table}");
}

pub fn display_stats(stats: &Stats) {
    println!("\n📊 Statistiques du modèle\n");
    let mut table = new_table(vec!["Indicateur", "Valeur"]);
    table.add_row(vec!["Prédictions évaluées".to_string(), stats.total_predictions.to_string()]);
    table.add_row(vec!["Précision".to_string(), format!("{}%", stats.accuracy_percent)]);
    table.add_row(vec!["Confiance".to_string(), format!("{}%", stats.confidence_percent)]);
    table.add_row(vec!["Tirages analysés".to_string(), stats.data_point_count.to_string()]);
    table.add_row(vec![
        "Patterns d'écart distincts".to_string(),
        stats.distinct_pattern_count.to_string(),
    ]);
    table.add_row(vec!["Tendance récente".to_string(), stats.recent_trend.to_string()]);
    println!("{table}");

    if !stats.top_numbers.is_empty() {
        println!("\n── Numéros les plus fréquents ──");
        let mut table = new_table(vec!["Numéro", "Fréquence"]);
        for top in &stats.top_numbers {
            table.add_row(vec![format!("{:2}", top.number), top.frequency.to_string()]);
        }
        println!("{table}");
    }
}

pub fn display_pattern_report(report: Option<&PatternReport>) {
    let Some(report) = report else {
        println!("Ajoutez au moins 3 séquences pour voir l'analyse des patterns.");
        return;
    };

    println!("\n🔥 Numéros les plus fréquents\n");
    let mut table = new_table(vec!["Numéro", "Fréquence", "Part des tirages"]);
    for top in &report.top_numbers {
        table.add_row(vec![
            format!("{:2}", top.number),
            top.frequency.to_string(),
            format!("{:.1}%", top.share_percent),
        ]);
    }
    println!("{table}");

    println!("\n📏 Écarts récurrents\n");
    let mut table = new_table(vec!["Position", "Écart", "Occurrences"]);
    for gap in &report.top_gaps {
        table.add_row(vec![
            gap.position.to_string(),
            gap.gap.to_string(),
            format!("{}×", gap.count),
        ]);
    }
    println!("{table}");

    println!("\n📈 Tendance récente : {}", report.recent_trend);
    println!("\n🧮 Somme moyenne : {}", report.average_sum);
    println!(
        "   Plage optimale : {} - {}",
        report.optimal_sum_range.0, report.optimal_sum_range.1
    );
}

pub fn display_history(predictions: &[Prediction], history: &[Sequence]) {
    if predictions.is_empty() && history.is_empty() {
        println!("📭 Aucun historique. Ajoutez des données ou générez une prédiction.");
        return;
    }

    if !predictions.is_empty() {
        println!("\n── Prédictions (plus récentes d'abord) ──");
        let mut table = new_table(vec!["Date", "Prédiction", "Confiance", "Résultat"]);
        for prediction in predictions.iter().rev() {
            let numbers = prediction.numbers.numbers();
            let outcome = match &prediction.evaluation {
                Some(eval) => Cell::new(format!(
                    "{} | {} bon(s) : {} ({}%)",
                    format_numbers(eval.actual.numbers()),
                    eval.matches.len(),
                    format_numbers(&eval.matches),
                    eval.accuracy_percent
                ))
                .fg(if eval.matches.is_empty() { Color::Red } else { Color::Green }),
                None => Cell::new("En attente").fg(Color::Yellow),
            };
            table.add_row(vec![
                Cell::new(prediction.created_at.format("%d/%m/%Y %H:%M").to_string()),
                Cell::new(format_numbers(numbers)),
                Cell::new(format!("{}%", prediction.confidence.round())),
                outcome,
            ]);
        }
        println!("{table}");
    }

    if !history.is_empty() {
        println!("\n── Derniers tirages ──");
        let mut table = new_table(vec!["#", "Numéros"]);
        let start = history.len().saturating_sub(3);
        for (i, sequence) in history.iter().enumerate().skip(start).rev() {
            table.add_row(vec![(i + 1).to_string(), format_numbers(sequence.numbers())]);
        }
        println!("{table}");
    }
}
