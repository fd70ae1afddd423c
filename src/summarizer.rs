//! Spending Q&A
//!
//! Renders aggregates or raw transactions into a fixed text block, wraps it
//! in a prompt with the user's question and asks the generator. Answers come
//! back as markdown text, untouched.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

use crate::aggregator::{CategoryTotals, PeriodFlow};
use crate::gemini::TextGenerator;
use crate::models::Transaction;
use crate::Result;

/// Data that can be laid out as prompt context.
pub trait PromptContext {
    fn heading(&self) -> &'static str;
    fn render(&self) -> String;
}

impl PromptContext for CategoryTotals {
    fn heading(&self) -> &'static str {
        "SPENDING BY PERIOD AND CATEGORY (negative = money out)"
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for (period, categories) in self {
            let _ = writeln!(text, "{}:", period);
            for (category, total) in categories {
                let _ = writeln!(text, "  {}: {:.2}", category, total);
            }
        }
        text
    }
}

impl PromptContext for BTreeMap<String, PeriodFlow> {
    fn heading(&self) -> &'static str {
        "MONEY IN AND OUT PER MONTH"
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for (period, flow) in self {
            let _ = writeln!(
                text,
                "{}: in {:.2}, out {:.2}",
                period, flow.inflows, flow.outflows
            );
        }
        text
    }
}

impl PromptContext for [Transaction] {
    fn heading(&self) -> &'static str {
        "TRANSACTIONS (date | merchant | category | amount)"
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for transaction in self {
            let category = transaction
                .category
                .map(|c| c.as_str())
                .unwrap_or("uncategorized");
            let _ = writeln!(
                text,
                "{} | {} | {} | {:.2}",
                transaction.date.format("%Y-%m-%d"),
                transaction.merchant_name,
                category,
                transaction.amount
            );
        }
        text
    }
}

/// Answers spending questions using a text generator
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn summarize<D>(&self, data: &D, question: &str) -> Result<String>
    where
        D: PromptContext + ?Sized,
    {
        let prompt = build_prompt(data, question);
        info!("Asking generator about spending ({} prompt chars)", prompt.len());
        let answer = self.generator.generate(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}

fn build_prompt<D: PromptContext + ?Sized>(data: &D, question: &str) -> String {
    format!(
        r#"You are a personal finance assistant looking at one person's Australian bank account.
Amounts are in AUD. Answer the question using only the data below.
Be concise, show the figures you used, and format the answer in markdown.

{}:
---
{}---

QUESTION: {}

ANSWER:"#,
        data.heading(),
        data.render(),
        question
    )
}
