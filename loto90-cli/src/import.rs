use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;

use loto90_db::models::PICK_COUNT;

#[derive(Debug, Clone, PartialEq)]
pub struct LineError {
    pub line: u64,
    pub message: String,
}

/// Séquences lues (non encore validées par le modèle) et lignes rejetées.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub sequences: Vec<Vec<i64>>,
    pub errors: Vec<LineError>,
}

impl ParsedBatch {
    pub fn total_lines(&self) -> usize {
        self.sequences.len() + self.errors.len()
    }
}

fn parse_token(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .with_context(|| format!("Nombre invalide \"{}\"", token))
}

fn parse_record(record: &csv::StringRecord) -> Result<Vec<i64>> {
    let numbers = record
        .iter()
        .map(parse_token)
        .collect::<Result<Vec<_>>>()?;
    if numbers.len() != PICK_COUNT {
        bail!("{} nombres trouvés, exactement {} attendus", numbers.len(), PICK_COUNT);
    }
    Ok(numbers)
}

/// Une séquence par ligne, nombres séparés par des virgules. Une ligne fautive est
/// rejetée avec son numéro sans interrompre le lot.
pub fn parse_sequences<R: Read>(input: R) -> ParsedBatch {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut batch = ParsedBatch::default();
    let mut record = csv::StringRecord::new();
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(line);
                if record.iter().all(|field| field.is_empty()) {
                    continue;
                }
                match parse_record(&record) {
                    Ok(numbers) => batch.sequences.push(numbers),
                    Err(e) => batch.errors.push(LineError {
                        line,
                        message: format!("{:#}", e),
                    }),
                }
            }
            Err(e) => {
                batch.errors.push(LineError {
                    line,
                    message: e.to_string(),
                });
                if e.is_io_error() {
                    break;
                }
            }
        }
    }
    batch
}

pub fn parse_file(path: &Path) -> Result<ParsedBatch> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    Ok(parse_sequences(file))
}

/// Un résultat saisi à la main : `3, 17, 20, 44, 70` ou `3 17 20 44 70`.
pub fn parse_result(input: &str) -> Result<Vec<i64>> {
    let tokens: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        bail!("Aucun nombre saisi");
    }
    tokens.into_iter().map(parse_token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequences_valid() {
        let batch = parse_sequences("1,2,3,4,5\n10, 20, 30, 40, 50\n".as_bytes());
        assert_eq!(batch.sequences, vec![vec![1, 2, 3, 4, 5], vec![10, 20, 30, 40, 50]]);
        assert!(batch.errors.is_empty());
    }

    #[test]
    fn test_parse_sequences_reports_bad_lines() {
        let text = "1,2,3,4,5\n1,2,x,4,5\n1,2,3\n\n90,80,70,60,50\n";
        let batch = parse_sequences(text.as_bytes());

        assert_eq!(batch.sequences.len(), 2);
        assert_eq!(batch.errors.len(), 2);
        assert_eq!(batch.errors[0].line, 2);
        assert!(batch.errors[0].message.contains("\"x\""));
        assert_eq!(batch.errors[1].line, 3);
        assert!(batch.errors[1].message.contains("3 nombres"));
        assert_eq!(batch.total_lines(), 4);
    }

    #[test]
    fn test_parse_sequences_keeps_out_of_range() {
        // la plage et les doublons sont vérifiés par le modèle, pas ici
        let batch = parse_sequences("1,1,2,3,4\n0,2,3,4,95\n".as_bytes());
        assert_eq!(batch.sequences.len(), 2);
        assert!(batch.errors.is_empty());
    }

    #[test]
    fn test_parse_result() {
        assert_eq!(parse_result("3, 17, 20, 44, 70").unwrap(), vec![3, 17, 20, 44, 70]);
        assert_eq!(parse_result("3 17 20 44 70").unwrap(), vec![3, 17, 20, 44, 70]);
        let err = parse_result("3, 17, abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(parse_result("   ").is_err());
    }
}
