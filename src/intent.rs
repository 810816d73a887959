//! Classifies an inbound text message into a typed [`Intent`].
//!
//! Parsing is pure: it looks only at the text, the configured keywords and the
//! canonical category set. Anything the interpreter needs to continue a
//! multi-step exchange arrives inside the text itself.

use regex::Regex;
use std::sync::LazyLock;

use crate::category::CategorySet;
use crate::config::{Config, KeywordConfig};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Chart,
    Monthly,
    Guide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetBudget {
    /// Keyword with no category
    Malformed,
    /// Keyword and category only; the amount is still to be chosen
    ChooseAmount { category: String },
    Apply { category: String, limit: u64 },
    InvalidAmount { category: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delete {
    Id(String),
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Digits were present but not a usable positive amount
    InvalidAmount,
    Uncategorized { amount: u64, memo: String },
    Categorized {
        category: String,
        amount: u64,
        memo: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Report(ReportKind),
    BudgetMenu,
    SetBudget(SetBudget),
    Delete(Delete),
    Record(Record),
    /// No keyword and no amount: not addressed to the bot
    Unrecognized,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Report(_) => "report",
            Intent::BudgetMenu => "budget_menu",
            Intent::SetBudget(_) => "set_budget",
            Intent::Delete(_) => "delete",
            Intent::Record(_) => "record",
            Intent::Unrecognized => "unrecognized",
        }
    }
}

pub struct IntentParser {
    keywords: KeywordConfig,
    categories: CategorySet,
}

impl IntentParser {
    pub fn new(config: &Config) -> Self {
        Self {
            keywords: config.keywords.clone(),
            categories: CategorySet::new(config.categories.iter().cloned()),
        }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn keywords(&self) -> &KeywordConfig {
        &self.keywords
    }

    /// Classify a message. Earlier rules take priority.
    pub fn parse(&self, text: &str) -> Intent {
        let text = ascii_digits(text);
        let text = text.trim();
        let k = &self.keywords;

        if text == k.chart {
            return Intent::Report(ReportKind::Chart);
        }
        if text == k.monthly {
            return Intent::Report(ReportKind::Monthly);
        }
        if text == k.guide {
            return Intent::Report(ReportKind::Guide);
        }
        if text == k.budget_menu {
            return Intent::BudgetMenu;
        }
        if text.starts_with(k.set.as_str()) {
            return Intent::SetBudget(parse_set_budget(text));
        }
        if text.starts_with(k.delete.as_str()) {
            return Intent::Delete(parse_delete(text));
        }

        match self.parse_record(text) {
            Some(record) => Intent::Record(record),
            None => Intent::Unrecognized,
        }
    }

    fn parse_record(&self, text: &str) -> Option<Record> {
        let m = AMOUNT_RE.find(text)?;

        let amount = match m.as_str().parse::<u64>() {
            Ok(0) | Err(_) => return Some(Record::InvalidAmount),
            Ok(n) => n,
        };

        let remainder = format!("{}{}", &text[..m.start()], &text[m.end()..]);
        let remainder = remainder.trim();

        Some(match self.categories.first_match(remainder) {
            Some(category) => Record::Categorized {
                category: category.to_string(),
                amount,
                memo: remainder.replacen(category, "", 1).trim().to_string(),
            },
            None => Record::Uncategorized {
                amount,
                memo: remainder.to_string(),
            },
        })
    }
}

/// Fold full-width digits (U+FF10..U+FF19) to ASCII.
fn ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            _ => c,
        })
        .collect()
}

fn parse_set_budget(text: &str) -> SetBudget {
    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [_] | [] => SetBudget::Malformed,
        [_, category] => SetBudget::ChooseAmount {
            category: category.to_string(),
        },
        [_, category, amount, ..] => match amount.parse::<u64>() {
            Ok(limit) => SetBudget::Apply {
                category: category.to_string(),
                limit,
            },
            Err(_) => SetBudget::InvalidAmount {
                category: category.to_string(),
            },
        },
    }
}

fn parse_delete(text: &str) -> Delete {
    let parts: Vec<&str> = text.split_whitespace().collect();
    match parts.as_slice() {
        [_, id] => Delete::Id(id.to_string()),
        _ => Delete::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> IntentParser {
        IntentParser::new(&Config::default())
    }

    #[test]
    fn test_report_keywords_exact_match() {
        let p = parser();
        assert_eq!(p.parse("圖表"), Intent::Report(ReportKind::Chart));
        assert_eq!(p.parse(" 本月花費 "), Intent::Report(ReportKind::Monthly));
        assert_eq!(p.parse("使用教學"), Intent::Report(ReportKind::Guide));
        assert_eq!(p.parse("圖表呢"), Intent::Unrecognized);
    }

    #[test]
    fn test_budget_menu_beats_set_prefix() {
        assert_eq!(parser().parse("設定額度"), Intent::BudgetMenu);
    }

    #[test]
    fn test_set_budget_shapes() {
        let p = parser();
        assert_eq!(p.parse("設定"), Intent::SetBudget(SetBudget::Malformed));
        assert_eq!(
            p.parse("設定 飲食"),
            Intent::SetBudget(SetBudget::ChooseAmount {
                category: "飲食".into()
            })
        );
        assert_eq!(
            p.parse("設定 飲食 5000"),
            Intent::SetBudget(SetBudget::Apply {
                category: "飲食".into(),
                limit: 5000
            })
        );
        assert_eq!(
            p.parse("設定 飲食 5000 extra"),
            Intent::SetBudget(SetBudget::Apply {
                category: "飲食".into(),
                limit: 5000
            })
        );
        assert_eq!(
            p.parse("設定 飲食 abc"),
            Intent::SetBudget(SetBudget::InvalidAmount {
                category: "飲食".into()
            })
        );
        assert_eq!(
            p.parse("設定 飲食 -5"),
            Intent::SetBudget(SetBudget::InvalidAmount {
                category: "飲食".into()
            })
        );
    }

    #[test]
    fn test_set_budget_accepts_free_form_category() {
        assert_eq!(
            parser().parse("設定 寵物 2000"),
            Intent::SetBudget(SetBudget::Apply {
                category: "寵物".into(),
                limit: 2000
            })
        );
    }

    #[test]
    fn test_delete_token_count() {
        let p = parser();
        assert_eq!(p.parse("刪除 abc-123"), Intent::Delete(Delete::Id("abc-123".into())));
        assert_eq!(p.parse("刪除"), Intent::Delete(Delete::Malformed));
        assert_eq!(p.parse("刪除 a b"), Intent::Delete(Delete::Malformed));
    }

    #[test]
    fn test_record_without_category() {
        assert_eq!(
            parser().parse("100 宵夜"),
            Intent::Record(Record::Uncategorized {
                amount: 100,
                memo: "宵夜".into()
            })
        );
    }

    #[test]
    fn test_record_with_category() {
        let p = parser();
        assert_eq!(
            p.parse("飲食 100"),
            Intent::Record(Record::Categorized {
                category: "飲食".into(),
                amount: 100,
                memo: String::new()
            })
        );
        assert_eq!(
            p.parse("飲食 100 宵夜"),
            Intent::Record(Record::Categorized {
                category: "飲食".into(),
                amount: 100,
                memo: "宵夜".into()
            })
        );
    }

    #[test]
    fn test_record_first_integer_only() {
        assert_eq!(
            parser().parse("午餐 80 買2份"),
            Intent::Record(Record::Uncategorized {
                amount: 80,
                memo: "午餐  買2份".into()
            })
        );
    }

    #[test]
    fn test_record_invalid_amounts() {
        let p = parser();
        assert_eq!(p.parse("0 宵夜"), Intent::Record(Record::InvalidAmount));
        assert_eq!(
            p.parse("99999999999999999999999 宵夜"),
            Intent::Record(Record::InvalidAmount)
        );
    }

    #[test]
    fn test_full_width_digits() {
        let p = parser();
        assert_eq!(
            p.parse("１００ 宵夜"),
            Intent::Record(Record::Uncategorized {
                amount: 100,
                memo: "宵夜".into()
            })
        );
        assert_eq!(
            p.parse("設定 飲食 ５０００"),
            Intent::SetBudget(SetBudget::Apply {
                category: "飲食".into(),
                limit: 5000
            })
        );
        assert_eq!(p.parse("０"), Intent::Record(Record::InvalidAmount));
    }

    #[test]
    fn test_unrecognized_chatter() {
        let p = parser();
        assert_eq!(p.parse("hello"), Intent::Unrecognized);
        assert_eq!(p.parse(""), Intent::Unrecognized);
        assert_eq!(p.parse("飲食"), Intent::Unrecognized);
    }

    #[test]
    fn test_intent_names() {
        assert_eq!(parser().parse("hello").name(), "unrecognized");
        assert_eq!(parser().parse("設定額度").name(), "budget_menu");
    }
}
