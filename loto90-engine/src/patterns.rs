use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use loto90_db::models::Sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GapKey {
    /// Index de la paire adjacente (0..=3).
    pub position: u8,
    pub gap: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    /// Rang dans la séquence triée (0..=4).
    pub position: u8,
    pub number: u8,
}

pub type Triplet = [Sequence; 3];

pub const SUM_BUCKET_WIDTH: u32 = 25;

/// Statistiques cumulées sur toutes les séquences observées.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternStore {
    #[serde(with = "pairs")]
    pub gaps: BTreeMap<GapKey, u32>,
    #[serde(with = "pairs")]
    pub positions: BTreeMap<PositionKey, u32>,
    /// Clé = borne basse de la tranche de largeur 25.
    #[serde(with = "pairs")]
    pub sums: BTreeMap<u32, u32>,
    /// Clé = nombre de numéros pairs (0..=5).
    #[serde(with = "pairs")]
    pub even_odd: BTreeMap<u8, u32>,
    #[serde(with = "pairs")]
    pub sequences: BTreeMap<Triplet, u32>,
}

impl PatternStore {
    /// `history` doit déjà contenir `sequence` en dernière position.
    pub fn record(&mut self, sequence: &Sequence, history: &[Sequence]) {
        for (position, gap) in sequence.gaps() {
            *self.gaps.entry(GapKey { position, gap }).or_insert(0) += 1;
        }

        for (i, &number) in sequence.numbers().iter().enumerate() {
            let key = PositionKey { position: i as u8, number };
            *self.positions.entry(key).or_insert(0) += 1;
        }

        let bucket = sequence.sum() / SUM_BUCKET_WIDTH * SUM_BUCKET_WIDTH;
        *self.sums.entry(bucket).or_insert(0) += 1;

        *self.even_odd.entry(sequence.even_count()).or_insert(0) += 1;

        if history.len() >= 3 {
            let n = history.len();
            let triplet = [history[n - 3], history[n - 2], history[n - 1]];
            *self.sequences.entry(triplet).or_insert(0) += 1;
        }
    }

    pub fn position_count(&self, position: u8, number: u8) -> u32 {
        self.positions
            .get(&PositionKey { position, number })
            .copied()
            .unwrap_or(0)
    }

    /// Les `count` numéros les plus vus à ce rang ; à égalité, le plus petit numéro d'abord.
    pub fn top_at_position(&self, position: u8, count: usize) -> Vec<u8> {
        let mut entries: Vec<(u8, u32)> = self
            .positions
            .iter()
            .filter(|(key, _)| key.position == position)
            .map(|(key, &c)| (key.number, c))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.into_iter().take(count).map(|(n, _)| n).collect()
    }

    pub fn top_gaps(&self, count: usize) -> Vec<(GapKey, u32)> {
        let mut entries: Vec<(GapKey, u32)> = self.gaps.iter().map(|(&k, &c)| (k, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(count);
        entries
    }

    /// Moyenne / maximum des compteurs d'écarts, 0 si aucun écart enregistré.
    pub fn consistency(&self) -> f64 {
        if self.gaps.is_empty() {
            return 0.0;
        }
        let max = self.gaps.values().copied().max().unwrap_or(0);
        if max == 0 {
            return 0.0;
        }
        let avg = self.gaps.values().map(|&c| c as f64).sum::<f64>() / self.gaps.len() as f64;
        (avg / max as f64).min(1.0)
    }

    pub fn distinct_gap_patterns(&self) -> usize {
        self.gaps.len()
    }
}

/// Sérialise une map à clé composite en liste de paires `[clé, valeur]`.
mod pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
