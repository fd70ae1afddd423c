//! Merchant Classifier
//!
//! Assigns a spending category to a merchant name. Lookup order:
//! - Fixed overrides (no external call)
//! - The persisted category cache
//! - One Gemini call, whose answer is cached before the throttle cool-down

use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::CategoryCache;
use crate::gemini::TextGenerator;
use crate::models::{Category, Transaction};
use crate::throttle::Throttle;
use crate::Result;

/// Merchants the model reliably gets wrong.
const MERCHANT_OVERRIDES: &[(&str, Category)] = &[("Sasmit Joshi Stake", Category::Investments)];

pub struct Classifier {
    generator: Arc<dyn TextGenerator>,
    throttle: Throttle,
}

impl Classifier {
    pub fn new(generator: Arc<dyn TextGenerator>, throttle: Throttle) -> Self {
        Self { generator, throttle }
    }

    /// Classify one merchant, consulting and filling `cache`.
    pub async fn classify(&self, cache: &mut CategoryCache, merchant: &str) -> Result<Category> {
        if let Some((_, category)) = MERCHANT_OVERRIDES.iter().find(|(name, _)| *name == merchant) {
            if cache.get(merchant) != Some(*category) {
                cache.insert(merchant, *category)?;
            }
            return Ok(*category);
        }

        if let Some(category) = cache.get(merchant) {
            debug!("Category cache hit: {} -> {}", merchant, category);
            return Ok(category);
        }

        self.throttle.acquire().await;
        let answer = self.generator.generate(&build_prompt(merchant)).await?;
        let category = parse_category(&answer).unwrap_or_else(|| {
            warn!(
                "Unrecognised category '{}' for merchant '{}', using {}",
                answer.trim(),
                merchant,
                Category::Friends
            );
            Category::Friends
        });

        info!("Classified '{}' as {}", merchant, category);
        cache.insert(merchant, category)?;
        self.throttle.cool_down().await;

        Ok(category)
    }

    /// Fill in every missing category, one merchant at a time.
    /// Returns how many transactions were updated.
    pub async fn classify_all(
        &self,
        cache: &mut CategoryCache,
        transactions: &mut [Transaction],
    ) -> Result<usize> {
        let mut filled = 0;
        for transaction in transactions.iter_mut().filter(|t| t.category.is_none()) {
            transaction.category = Some(self.classify(cache, &transaction.merchant_name).await?);
            filled += 1;
        }
        Ok(filled)
    }
}

fn build_prompt(merchant: &str) -> String {
    let tags: Vec<&str> = Category::VOCABULARY.iter().map(|c| c.as_str()).collect();

    format!(
        r#"You categorise Australian bank transactions.

Pick exactly one category for the merchant below from this list:
{}

Rules:
- Reply with the category tag only, nothing else.
- If the merchant is a person's name or a bank transfer description, reply friends.
- If you are not sure, reply friends.

Merchant: {}
Category:"#,
        tags.join(", "),
        merchant
    )
}

/// Extract a vocabulary tag from free model output.
///
/// Tags may come back spaced ("pubs and bars") or wrapped in a sentence; the
/// earliest tag in the reply wins, longest first on a tie.
fn parse_category(answer: &str) -> Option<Category> {
    let cleaned = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c.is_whitespace())
        .to_lowercase();

    if let Ok(category) = cleaned.parse() {
        return Some(category);
    }

    let words: String = cleaned
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    let normalized = words.split_whitespace().collect::<Vec<_>>().join(" ");

    Category::VOCABULARY
        .iter()
        .flat_map(|category| {
            let tag = category.as_str();
            [tag.to_string(), tag.replace('-', " ")]
                .into_iter()
                .filter_map(|form| {
                    find_word(&normalized, &form).map(|pos| (pos, Reverse(form.len()), *category))
                })
                .collect::<Vec<_>>()
        })
        .min()
        .map(|(_, _, category)| category)
}

/// Byte offset of the first occurrence of `needle` that is not part of a
/// longer word.
fn find_word(text: &str, needle: &str) -> Option<usize> {
    let is_word = |c: char| c.is_alphanumeric() || c == '-';
    text.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = text[..pos].chars().next_back();
        let after = text[pos + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::JsonStore;
    use async_trait::async_trait;
    use chrono::DateTime;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    struct FixedGenerator {
        answer: String,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    fn transaction(merchant: &str, category: Option<Category>) -> Transaction {
        Transaction {
            merchant_name: merchant.to_string(),
            category,
            amount: Decimal::new(-1000, 2),
            date: DateTime::parse_from_rfc3339("2025-03-05T10:00:00+11:00").unwrap(),
            transfer_account: None,
        }
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("groceries"), Some(Category::Groceries));
        assert_eq!(parse_category("  \"Takeaway\".\n"), Some(Category::Takeaway));
        assert_eq!(
            parse_category("Category: restaurants-and-cafes"),
            Some(Category::RestaurantsAndCafes)
        );
        assert_eq!(parse_category("no idea"), None);
        assert_eq!(parse_category("adulthood"), None);
        assert_eq!(parse_category("uncategorized"), None);
    }

    #[test]
    fn test_parse_spaced_category_names() {
        assert_eq!(parse_category("Pubs and bars, or maybe adult"), Some(Category::PubsAndBars));
        assert_eq!(parse_category("Holidays and Travel"), Some(Category::HolidaysAndTravel));
        assert_eq!(
            parse_category("I'd say news, magazines and books."),
            Some(Category::NewsMagazinesAndBooks)
        );
        assert_eq!(parse_category("takeaway (or restaurants-and-cafes)"), Some(Category::Takeaway));
    }

    #[test]
    fn test_prompt_lists_vocabulary_and_merchant() {
        let prompt = build_prompt("Guzman y Gomez");
        assert!(prompt.contains("Merchant: Guzman y Gomez"));
        assert!(prompt.contains("home-maintenance-and-improvements"));
        assert!(prompt.contains("friends"));
        assert!(!prompt.contains("uncategorized"));
    }

    #[tokio::test]
    async fn test_cache_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let mut cache = CategoryCache::load(store.clone());
        let generator = FixedGenerator::new("groceries");
        let classifier = Classifier::new(generator.clone(), Throttle::unlimited());

        let first = classifier.classify(&mut cache, "Woolworths").await.unwrap();
        assert_eq!(first, Category::Groceries);
        assert_eq!(generator.calls(), 1);
        assert_eq!(CategoryCache::load(store).get("Woolworths"), Some(Category::Groceries));

        let second = classifier.classify(&mut cache, "Woolworths").await.unwrap();
        assert_eq!(second, Category::Groceries);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unrecognised_answer_falls_back_to_friends() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CategoryCache::load(JsonStore::new(dir.path()));
        let classifier =
            Classifier::new(FixedGenerator::new("I cannot tell"), Throttle::unlimited());

        let category = classifier.classify(&mut cache, "J Smith").await.unwrap();
        assert_eq!(category, Category::Friends);
        assert_eq!(cache.get("J Smith"), Some(Category::Friends));
    }

    #[tokio::test]
    async fn test_override_skips_generator() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CategoryCache::load(JsonStore::new(dir.path()));
        let generator = FixedGenerator::new("friends");
        let classifier = Classifier::new(generator.clone(), Throttle::unlimited());

        let category = classifier.classify(&mut cache, "Sasmit Joshi Stake").await.unwrap();
        assert_eq!(category, Category::Investments);
        assert_eq!(generator.calls(), 0);
        assert_eq!(cache.get("Sasmit Joshi Stake"), Some(Category::Investments));
    }

    #[tokio::test]
    async fn test_classify_all_only_fills_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CategoryCache::load(JsonStore::new(dir.path()));
        let generator = FixedGenerator::new("takeaway");
        let classifier = Classifier::new(generator.clone(), Throttle::unlimited());

        let mut transactions = vec![
            transaction("Coles", Some(Category::Groceries)),
            transaction("Menulog", None),
            transaction("Menulog", None),
        ];

        let filled = classifier.classify_all(&mut cache, &mut transactions).await.unwrap();
        assert_eq!(filled, 2);
        assert_eq!(generator.calls(), 1);
        assert_eq!(transactions[0].category, Some(Category::Groceries));
        assert_eq!(transactions[1].category, Some(Category::Takeaway));
        assert_eq!(transactions[2].category, Some(Category::Takeaway));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cool_down_follows_generator_calls_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CategoryCache::load(JsonStore::new(dir.path()));
        let generator = FixedGenerator::new("groceries");
        let classifier =
            Classifier::new(generator.clone(), Throttle::new(Duration::from_secs(3), 15));

        let start = Instant::now();
        classifier.classify(&mut cache, "Woolworths").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(generator.calls(), 1);

        let start = Instant::now();
        classifier.classify(&mut cache, "Woolworths").await.unwrap();
        classifier.classify(&mut cache, "Sasmit Joshi Stake").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_wait_for_rate_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CategoryCache::load(JsonStore::new(dir.path()));
        let generator = FixedGenerator::new("takeaway");
        let classifier = Classifier::new(generator.clone(), Throttle::new(Duration::ZERO, 1));

        let start = Instant::now();
        classifier.classify(&mut cache, "Menulog").await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));

        classifier.classify(&mut cache, "Uber Eats").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(generator.calls(), 2);
    }
}
