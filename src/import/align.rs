//! Maps statements of a previous import onto a fresh one, so links to old
//! statement positions keep working after a transcript is corrected.

use crate::configs::ImportConfig;
use crate::import::statement::Statement;
use crate::runtime::logging::QualityLog;
use crate::types::SequenceMapping;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Ratcliff/Obershelp similarity of two sequences: twice the number of
/// elements in matching blocks over the total length. No junk heuristics.
pub fn sequence_ratio<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let mut b_positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, item) in b.iter().enumerate() {
        b_positions.entry(item).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b_positions, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    2.0 * matched as f64 / total as f64
}

/// Longest common run inside `a[alo..ahi]` and `b[blo..bhi]`; earliest in `a`
/// then earliest in `b` on ties.
fn longest_match<T: Eq + Hash>(
    a: &[T],
    b_positions: &HashMap<&T, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // Length of the run ending at a[i - 1], b[j], keyed by j.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();
    for (i, item) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_lengths = HashMap::new();
        if let Some(positions) = b_positions.get(item) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_lengths.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_lengths = next_lengths;
    }
    (best_i, best_j, best_size)
}

fn tokens(text: &str) -> Vec<&str> {
    WHITESPACE_RE.split(text).collect()
}

/// Speaker display name to statement indices, in first-seen order.
fn group_by_speaker(statements: &[Statement]) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (idx, statement) in statements.iter().enumerate() {
        let name = statement.name_info().display_name;
        match positions.get(&name) {
            Some(&pos) => groups[pos].1.push(idx),
            None => {
                positions.insert(name.clone(), groups.len());
                groups.push((name, vec![idx]));
            }
        }
    }
    groups
}

fn score_texts(
    same_time: bool,
    reused: bool,
    old_text: &str,
    new_text: &str,
    config: &ImportConfig,
) -> f64 {
    let mut score = if same_time { config.timing_bonus } else { 0.0 };
    if reused {
        score -= config.reuse_penalty;
    }
    let similarity = if old_text.contains(new_text) {
        1.0
    } else {
        sequence_ratio(&tokens(old_text), &tokens(new_text))
    };
    ((score + similarity) / (1.0 + config.timing_bonus)).clamp(0.0, 1.0)
}

/// Score in [0, 1] for `new` being what `old` became after a reimport.
pub fn match_score(old: &Statement, new: &Statement, config: &ImportConfig) -> f64 {
    score_texts(
        old.time == new.time,
        false,
        &old.text_plain(),
        &new.text_plain(),
        config,
    )
}

struct Scorer<'a> {
    config: &'a ImportConfig,
    new_texts: Vec<String>,
    chosen: HashSet<usize>,
}

impl Scorer<'_> {
    fn score(&self, old: &Statement, old_text: &str, new: &Statement, new_idx: usize) -> f64 {
        score_texts(
            old.time == new.time,
            self.chosen.contains(&new_idx),
            old_text,
            &self.new_texts[new_idx],
            self.config,
        )
    }
}

/// Pairs each old statement with the new statement it most likely became.
pub fn align_sequences(
    new_statements: &[Statement],
    old_statements: &[Statement],
    config: &ImportConfig,
    log: &mut QualityLog,
) -> Vec<SequenceMapping> {
    let new_groups: HashMap<String, Vec<usize>> =
        group_by_speaker(new_statements).into_iter().collect();
    let mut scorer = Scorer {
        config,
        new_texts: new_statements.iter().map(Statement::text_plain).collect(),
        chosen: HashSet::new(),
    };
    let all_new: Vec<usize> = (0..new_statements.len()).collect();
    let mut mappings = Vec::new();

    for (speaker, olds) in group_by_speaker(old_statements) {
        let news = new_groups.get(&speaker).cloned().unwrap_or_default();

        if !speaker.is_empty() && olds.len() == news.len() {
            for (&old_idx, &new_idx) in olds.iter().zip(news.iter()) {
                let old = &old_statements[old_idx];
                let new = &new_statements[new_idx];
                let score = scorer.score(old, &old.text_plain(), new, new_idx);
                if score < config.easy_match_warning {
                    log.warn(&format!(
                        "Low similarity for easy match {score:.3}: old #{} / new {}",
                        old.sequence, new.slug
                    ));
                }
                mappings.push(SequenceMapping {
                    sequence: old.sequence,
                    slug: new.slug.clone(),
                });
            }
            continue;
        }

        let candidates = if news.is_empty() {
            log.warn(&format!("No new statements for {speaker:?}"));
            &all_new
        } else {
            log.info(&format!("Count mismatch for {speaker:?}"));
            &news
        };

        for &old_idx in &olds {
            let old = &old_statements[old_idx];
            let old_text = old.text_plain();
            let mut best: Option<(usize, f64)> = None;
            for &candidate in candidates {
                let score = scorer.score(old, &old_text, &new_statements[candidate], candidate);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((candidate, score));
                }
            }
            let Some((choice, score)) = best else {
                log.warn(&format!(
                    "Nothing to match old statement #{} against",
                    old.sequence
                ));
                continue;
            };
            scorer.chosen.insert(choice);
            if score < config.best_match_warning {
                log.warn(&format!(
                    "Low-score similarity match {score:.3}: old #{} / new {}",
                    old.sequence, new_statements[choice].slug
                ));
            }
            mappings.push(SequenceMapping {
                sequence: old.sequence,
                slug: new_statements[choice].slug.clone(),
            });
        }
    }
    mappings
}
