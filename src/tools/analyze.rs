//! Statistics over collected record snapshots.
//!
//! Three reports: interaction (like-count distribution), content length
//! (title length histogram), and high-frequency keywords (jieba-segmented,
//! stop-word filtered).

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use anyhow::{bail, Result};
use jieba_rs::Jieba;
use serde::Serialize;

fn try_parse_likes(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(stripped) = s.strip_suffix('万') {
        stripped
            .trim()
            .parse::<f64>()
            .ok()
            .map(|n| (n * 10_000.0) as u64)
    } else {
        s.parse::<f64>().ok().map(|n| n as u64)
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionStats {
    pub total_count: usize,
    pub total_likes: u64,
    pub avg_likes: f64,
    pub max_likes: u64,
    pub min_likes: u64,
}

/// Distribution of like counts over the raw platform-format strings.
/// Unparsable values are skipped rather than counted as zero.
pub fn analyze_interaction(likes: &[String]) -> Result<InteractionStats> {
    if likes.is_empty() {
        bail!("no data to analyze");
    }

    // Unlike ranking, analysis skips unparsable values instead of zeroing
    // them, so junk strings do not drag the average down.
    let parsed: Vec<u64> = likes.iter().filter_map(|s| try_parse_likes(s)).collect();
    if parsed.is_empty() {
        bail!("no parsable like counts");
    }

    let total: u64 = parsed.iter().sum();
    Ok(InteractionStats {
        total_count: likes.len(),
        total_likes: total,
        avg_likes: round2(total as f64 / parsed.len() as f64),
        max_likes: *parsed.iter().max().unwrap(),
        min_likes: *parsed.iter().min().unwrap(),
    })
}

#[derive(Debug, Serialize)]
pub struct LengthBucket {
    pub range: &'static str,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct ContentLengthStats {
    pub total_count: usize,
    pub avg_length: f64,
    pub max_length: usize,
    pub min_length: usize,
    pub length_distribution: Vec<LengthBucket>,
}

const LENGTH_RANGES: &[(&str, usize)] = &[
    ("0-10", 10),
    ("11-20", 20),
    ("21-30", 30),
    ("31-50", 50),
    ("51-100", 100),
    ("100+", usize::MAX),
];

/// Title-length histogram over fixed ranges. Lengths are in characters, not
/// bytes — titles are mostly CJK.
pub fn analyze_content_length(titles: &[String]) -> Result<ContentLengthStats> {
    if titles.is_empty() {
        bail!("no data to analyze");
    }

    let lengths: Vec<usize> = titles.iter().map(|t| t.chars().count()).collect();
    let total = lengths.len();

    let mut buckets: Vec<LengthBucket> = LENGTH_RANGES
        .iter()
        .map(|&(range, _)| LengthBucket {
            range,
            count: 0,
            percentage: 0.0,
        })
        .collect();

    for &len in &lengths {
        let idx = LENGTH_RANGES
            .iter()
            .position(|(_, upper)| len <= *upper)
            .unwrap_or(LENGTH_RANGES.len() - 1);
        buckets[idx].count += 1;
    }
    for bucket in &mut buckets {
        bucket.percentage = round2(bucket.count as f64 / total as f64 * 100.0);
    }

    Ok(ContentLengthStats {
        total_count: total,
        avg_length: round2(lengths.iter().sum::<usize>() as f64 / total as f64),
        max_length: *lengths.iter().max().unwrap(),
        min_length: *lengths.iter().min().unwrap(),
        length_distribution: buckets,
    })
}

#[derive(Debug, Serialize)]
pub struct KeywordEntry {
    pub rank: usize,
    pub word: String,
    pub count: usize,
    pub frequency: f64,
}

#[derive(Debug, Serialize)]
pub struct KeywordStats {
    pub total_titles: usize,
    pub total_words: usize,
    pub unique_words: usize,
    pub top_keywords: Vec<KeywordEntry>,
}

const STOP_WORDS: &[&str] = &[
    "的", "了", "是", "在", "我", "有", "和", "就", "都", "而", "及", "与", "着", "或", "等",
    "为", "一个", "没有", "这个", "那个", "但是", "而且", "只是", "不过", "这样", "一样",
    "一直", "一些", "这", "那", "也", "你", "我们", "他们", "它们", "把", "被", "让", "向",
    "往", "但", "去", "又", "能", "好", "给", "到", "看", "想", "要", "会", "多", "这些",
    "那些", "什么", "怎么", "如何", "为什么", "可以", "因为", "所以", "应该", "可能",
];

static SEGMENTER: OnceLock<Jieba> = OnceLock::new();
static STOP_WORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn segmenter() -> &'static Jieba {
    SEGMENTER.get_or_init(Jieba::new)
}

fn stop_words() -> &'static HashSet<&'static str> {
    STOP_WORD_SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Top-`top_n` words across all titles, single characters and stop words
/// excluded. Ties break deterministically on the word itself.
pub fn analyze_keywords(titles: &[String], top_n: usize) -> Result<KeywordStats> {
    if titles.is_empty() {
        bail!("no data to analyze");
    }

    let joined = titles.join(" ");
    let words: Vec<&str> = segmenter()
        .cut(&joined, false)
        .into_iter()
        .filter(|w| w.chars().count() > 1 && !stop_words().contains(w) && !w.trim().is_empty())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &word in &words {
        *counts.entry(word).or_insert(0) += 1;
    }
    let unique_words = counts.len();

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_n);

    let total_words = words.len();
    let top_keywords = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (word, count))| KeywordEntry {
            rank: i + 1,
            word: word.to_string(),
            count,
            frequency: if total_words > 0 {
                round2(count as f64 / total_words as f64 * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    Ok(KeywordStats {
        total_titles: titles.len(),
        total_words,
        unique_words,
        top_keywords,
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn interaction_stats_parse_raw_formats() {
        let stats = analyze_interaction(&strings(&["1.2万", "834", "abc"])).unwrap();
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.total_likes, 12834);
        assert_eq!(stats.max_likes, 12000);
        assert_eq!(stats.min_likes, 834);
        assert_eq!(stats.avg_likes, 6417.0);
    }

    #[test]
    fn interaction_rejects_empty_input() {
        assert!(analyze_interaction(&[]).is_err());
        assert!(analyze_interaction(&strings(&["abc", "xyz"])).is_err());
    }

    #[test]
    fn length_histogram_buckets_edges() {
        let titles = strings(&[
            "短",                                    // 1 -> 0-10
            "一二三四五六七八九十一",                 // 11 -> 11-20
            &"长".repeat(101),                       // 101 -> 100+
        ]);
        let stats = analyze_content_length(&titles).unwrap();
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.length_distribution[0].count, 1);
        assert_eq!(stats.length_distribution[1].count, 1);
        assert_eq!(stats.length_distribution[5].count, 1);
        assert_eq!(stats.max_length, 101);
        assert_eq!(stats.min_length, 1);
        let pct: f64 = stats
            .length_distribution
            .iter()
            .map(|b| b.percentage)
            .sum();
        assert!((pct - 100.0).abs() < 0.2);
    }

    #[test]
    fn keyword_stats_drop_stop_words_and_single_chars() {
        let titles = strings(&["美食教程 的 美食分享", "美食教程 一"]);
        let stats = analyze_keywords(&titles, 10).unwrap();
        assert_eq!(stats.total_titles, 2);
        assert!(stats.top_keywords.iter().all(|k| k.word != "的"));
        assert!(stats
            .top_keywords
            .iter()
            .all(|k| k.word.chars().count() > 1));
        let top = &stats.top_keywords[0];
        assert_eq!(top.rank, 1);
        assert!(top.count >= 2);
    }
}
