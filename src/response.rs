//! Outbound response descriptors. Rendering them into buttons, cards or
//! images is the presentation layer's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::budget::Tier;
use crate::store::Transaction;

pub const USAGE_GUIDE: &str = "🌟 您好！歡迎使用「記帳助手」🌟\n\n\
🚀 快速上手指南：\n\
1.【直接記帳】：輸入「金額 備註」，例如「100 宵夜」\n\
2.【選擇類別】：輸入金額後點選彈出的按鈕\n\
3.【設定預算】：輸入「設定 類別 金額」，例如「設定 飲食 5000」\n\
4.【查看報告】：點擊下方選單按鈕\n\n\
💡 現在就輸入一個數字試試看吧！";

pub const NO_RECORDS: &str = "查無紀錄，請先開始記帳喔！";
pub const NO_MONTHLY_RECORDS: &str = "本月目前沒有消費紀錄喔！";
pub const DELETE_OK: &str = "✅ 紀錄已成功刪除！";
pub const DELETE_FAILED: &str = "❌ 刪除失敗。";
pub const SET_HINT: &str = "❌ 設定格式：設定 類別 金額\n例如：設定 飲食 5000";
pub const DELETE_HINT: &str = "⚠️ 格式：刪除 [ID]";
pub const RECORD_HINT: &str = "❌ 金額需為正整數，例如「100 宵夜」";
pub const CUSTOM_AMOUNT_LABEL: &str = "自定義";

/// A quick-reply option. Tapping it sends `text` back as a new message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    pub label: String,
    pub text: String,
}

impl ReplyOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Why a budget preset prompt was shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetReason {
    /// The user asked to set this budget
    Requested,
    /// A record was blocked because the budget is unset
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    /// None when unset (absent or zero)
    pub limit: Option<u64>,
    /// Message to send to change this budget
    pub action_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    PlainText {
        text: String,
    },
    CategoryChoicePrompt {
        amount: u64,
        memo: String,
        options: Vec<ReplyOption>,
    },
    BudgetPresetPrompt {
        category: String,
        reason: PresetReason,
        options: Vec<ReplyOption>,
    },
    RecordSuccess {
        id: String,
        category: String,
        amount: u64,
        memo: String,
        tier: Tier,
        percent: u8,
        month_total: u64,
        limit: u64,
    },
    MonthlyReport {
        transactions: Vec<Transaction>,
    },
    PieChartRequest {
        totals: BTreeMap<String, u64>,
    },
    BudgetOverview {
        lines: Vec<BudgetLine>,
    },
    DeleteConfirmPrompt {
        id: String,
        description: String,
    },
    FormatError {
        hint: String,
    },
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn format_error(hint: impl Into<String>) -> Self {
        Self::FormatError { hint: hint.into() }
    }

    /// Short name used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlainText { .. } => "plain_text",
            Self::CategoryChoicePrompt { .. } => "category_choice_prompt",
            Self::BudgetPresetPrompt { .. } => "budget_preset_prompt",
            Self::RecordSuccess { .. } => "record_success",
            Self::MonthlyReport { .. } => "monthly_report",
            Self::PieChartRequest { .. } => "pie_chart_request",
            Self::BudgetOverview { .. } => "budget_overview",
            Self::DeleteConfirmPrompt { .. } => "delete_confirm_prompt",
            Self::FormatError { .. } => "format_error",
        }
    }
}

pub fn budget_set_text(category: &str, limit: u64) -> String {
    format!("✅ 【{}】額度已設為 ${}", category, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_tagged() {
        let json = serde_json::to_value(Response::format_error("bad")).unwrap();
        assert_eq!(json["kind"], "format_error");
        assert_eq!(json["hint"], "bad");
    }

    #[test]
    fn test_preset_prompt_serialization() {
        let resp = Response::BudgetPresetPrompt {
            category: "飲食".into(),
            reason: PresetReason::Required,
            options: vec![ReplyOption::new("3000", "設定 飲食 3000")],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["reason"], "required");
        assert_eq!(json["options"][0]["text"], "設定 飲食 3000");
        assert_eq!(resp.kind(), "budget_preset_prompt");
    }

    #[test]
    fn test_budget_set_text() {
        assert_eq!(budget_set_text("飲食", 5000), "✅ 【飲食】額度已設為 $5000");
    }
}
