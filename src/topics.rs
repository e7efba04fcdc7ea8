//! Hot topics: most frequent title words over the last seven days of corpus.

use std::collections::HashMap;

use chrono::Duration;
use serde::Serialize;

use crate::article::ScoredArticle;

pub const TOPIC_LOOKBACK_DAYS: i64 = 7;
pub const DEFAULT_TOPIC_COUNT: usize = 5;
const MIN_WORD_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this", "but", "they",
    "have", "had", "what", "when", "where", "who", "which", "why", "can", "could", "should",
    "would", "may", "might", "must", "shall", "into", "if", "then", "else", "than", "too", "very",
    "just", "about", "also", "much", "any", "only", "some", "such", "more", "most", "other", "own",
    "same", "few", "both", "those", "after", "before", "above", "below", "up", "down", "out",
    "off", "over", "under", "again", "once", "all", "always", "never", "now", "ever", "while",
    "during", "within", "without", "through", "between", "against", "until", "unless", "along",
    "across", "behind", "beyond", "near", "among", "upon", "since", "despite", "beside",
    "besides", "however", "therefore", "although", "yet", "still", "even", "otherwise", "says",
    "said", "according", "new", "one", "two", "three", "first", "second", "third", "last", "next",
    "best", "worst", "least", "many", "another", "get", "got", "getting", "every", "each",
    "either", "neither", "rather", "quite", "enough", "less", "way", "ways", "far", "further",
    "later", "earlier", "early", "late", "soon", "already", "not", "nor", "like", "hard", "high",
    "low",
];

/// Domain words too common in crypto headlines to be a topic.
const CRYPTO_STOP_WORDS: &[&str] = &[
    "bitcoin", "btc", "crypto", "cryptocurrency", "cryptocurrencies", "blockchain", "token",
    "tokens", "coin", "coins", "digital", "currency", "currencies", "mining", "miner", "miners",
    "wallet", "wallets", "exchange", "exchanges", "trading", "trader", "traders", "market",
    "markets", "price", "prices",
];

fn is_stop_word(w: &str) -> bool {
    STOP_WORDS.contains(&w) || CRYPTO_STOP_WORDS.contains(&w)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub word: String,
    pub count: usize,
}

/// Top `n` title words from rows dated within [`TOPIC_LOOKBACK_DAYS`] of the
/// latest date. Words are lower-cased, whitespace-split, longer than three
/// characters and not stop words. Ties keep first-seen order.
pub fn hot_topics(corpus: &[ScoredArticle], n: usize) -> Vec<TopicCount> {
    let Some(last) = corpus.iter().map(|r| r.date).max() else {
        return Vec::new();
    };
    let since = last - Duration::days(TOPIC_LOOKBACK_DAYS);

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for row in corpus.iter().filter(|r| r.date >= since) {
        for word in row.title.to_lowercase().split_whitespace() {
            if word.chars().count() < MIN_WORD_LEN || is_stop_word(word) {
                continue;
            }
            let e = counts.entry(word.to_string()).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            e.0 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> =
        counts.into_iter().map(|(w, (c, o))| (w, c, o)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(n)
        .map(|(word, count, _)| TopicCount { word, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(month: u32, day: u32, title: &str) -> ScoredArticle {
        ScoredArticle {
            date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
            title: title.into(),
            url: title.into(),
            score: 0.0,
            description: None,
        }
    }

    #[test]
    fn counts_recent_titles_only() {
        let corpus = vec![
            row(10, 1, "Ethereum upgrade delayed again"),
            row(11, 5, "Ethereum upgrade ships"),
            row(11, 7, "Bitcoin ETF inflows beat Ethereum"),
            row(11, 8, "ETF inflows continue"),
        ];
        let topics = hot_topics(&corpus, 3);
        assert_eq!(
            topics,
            vec![
                TopicCount { word: "ethereum".into(), count: 2 },
                TopicCount { word: "inflows".into(), count: 2 },
                TopicCount { word: "upgrade".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn empty_corpus_has_no_topics() {
        assert!(hot_topics(&[], DEFAULT_TOPIC_COUNT).is_empty());
    }
}
