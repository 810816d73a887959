//! Turns classified intents into ledger mutations and response descriptors.
//!
//! No conversation state is held between messages. When a reply needs a
//! follow-up (pick a category, pick a budget amount) every option carries the
//! complete text of the next message, so the user's tap replays the full
//! context and the next message is parsed on its own like any other.

use tracing::{debug, info};

use crate::aggregate;
use crate::budget;
use crate::config::Config;
use crate::intent::{Delete, Intent, IntentParser, Record, ReportKind, SetBudget};
use crate::message::{Inbound, PostbackAction};
use crate::response::{
    budget_set_text, BudgetLine, PresetReason, ReplyOption, Response, CUSTOM_AMOUNT_LABEL,
    DELETE_FAILED, DELETE_HINT, DELETE_OK, NO_MONTHLY_RECORDS, NO_RECORDS, RECORD_HINT, SET_HINT, USAGE_GUIDE,
};
use crate::store::{LedgerStore, NewTransaction, StoreError};

/// Result of handling one message. `Ok(None)` means stay silent.
pub type HandleResult = Result<Option<Response>, StoreError>;

pub struct Interpreter<S> {
    config: Config,
    parser: IntentParser,
    store: S,
}

impl<S: LedgerStore> Interpreter<S> {
    pub fn new(config: Config, store: S) -> Self {
        let parser = IntentParser::new(&config);
        Self {
            config,
            parser,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle any inbound message
    pub fn handle(&self, msg: &Inbound) -> HandleResult {
        match msg {
            Inbound::Text { user_id, text } => self.handle_text(user_id, text),
            Inbound::Postback {
                user_id,
                action,
                id,
                desc,
            } => self.handle_postback(user_id, *action, id.as_deref(), desc.as_deref()),
            Inbound::Follow { user_id } => {
                info!(user_id = %user_id, "new follower");
                Ok(Some(Response::text(USAGE_GUIDE)))
            }
        }
    }

    pub fn handle_text(&self, user_id: &str, text: &str) -> HandleResult {
        let intent = self.parser.parse(text);
        debug!(user_id = %user_id, intent = intent.name(), "message classified");

        let response = match intent {
            Intent::Report(kind) => self.report(user_id, kind)?,
            Intent::BudgetMenu => self.budget_overview(user_id)?,
            Intent::SetBudget(cmd) => self.set_budget(user_id, cmd)?,
            Intent::Delete(cmd) => self.delete(user_id, cmd)?,
            Intent::Record(cmd) => self.record(user_id, cmd)?,
            Intent::Unrecognized => return Ok(None),
        };
        Ok(Some(response))
    }

    pub fn handle_postback(
        &self,
        user_id: &str,
        action: PostbackAction,
        id: Option<&str>,
        desc: Option<&str>,
    ) -> HandleResult {
        match action {
            PostbackAction::AskDelete => {
                let Some(id) = id else {
                    return Ok(Some(Response::format_error(DELETE_HINT)));
                };
                let description = match desc {
                    Some(d) => d.to_string(),
                    None => self.describe(user_id, id)?,
                };
                Ok(Some(Response::DeleteConfirmPrompt {
                    id: id.to_string(),
                    description,
                }))
            }
            PostbackAction::ConfirmDelete => match id {
                Some(id) => self.remove(user_id, id).map(Some),
                None => Ok(Some(Response::text(DELETE_FAILED))),
            },
            PostbackAction::Cancel => Ok(None),
        }
    }

    fn report(&self, user_id: &str, kind: ReportKind) -> Result<Response, StoreError> {
        match kind {
            ReportKind::Chart => {
                let totals = aggregate::overall_summary(&self.store.list(user_id)?);
                if totals.is_empty() {
                    return Ok(Response::text(NO_RECORDS));
                }
                Ok(Response::PieChartRequest { totals })
            }
            ReportKind::Monthly => {
                let transactions =
                    aggregate::monthly_expenses(&self.store.list(user_id)?, &self.config.now());
                if transactions.is_empty() {
                    return Ok(Response::text(NO_MONTHLY_RECORDS));
                }
                Ok(Response::MonthlyReport { transactions })
            }
            ReportKind::Guide => Ok(Response::text(USAGE_GUIDE)),
        }
    }

    fn budget_overview(&self, user_id: &str) -> Result<Response, StoreError> {
        let budgets = self.store.budgets(user_id)?;
        let lines = self
            .parser
            .categories()
            .iter()
            .map(|category| BudgetLine {
                category: category.to_string(),
                limit: budgets.get(category).copied().filter(|l| *l > 0),
                action_text: format!("{} {}", self.parser.keywords().set, category),
            })
            .collect();
        Ok(Response::BudgetOverview { lines })
    }

    fn set_budget(&self, user_id: &str, cmd: SetBudget) -> Result<Response, StoreError> {
        match cmd {
            SetBudget::ChooseAmount { category } => {
                Ok(self.preset_prompt(category, PresetReason::Requested))
            }
            SetBudget::Apply { category, limit } => {
                self.store.set_budget(user_id, &category, limit)?;
                info!(user_id = %user_id, category = %category, limit, "budget updated");
                Ok(Response::text(budget_set_text(&category, limit)))
            }
            SetBudget::Malformed | SetBudget::InvalidAmount { .. } => {
                debug!(user_id = %user_id, "malformed set-budget command");
                Ok(Response::format_error(SET_HINT))
            }
        }
    }

    fn delete(&self, user_id: &str, cmd: Delete) -> Result<Response, StoreError> {
        match cmd {
            Delete::Id(id) => self.remove(user_id, &id),
            Delete::Malformed => Ok(Response::format_error(DELETE_HINT)),
        }
    }

    fn remove(&self, user_id: &str, id: &str) -> Result<Response, StoreError> {
        if self.store.remove(user_id, id)? {
            info!(user_id = %user_id, id = %id, "transaction deleted");
            Ok(Response::text(DELETE_OK))
        } else {
            debug!(user_id = %user_id, id = %id, "nothing to delete");
            Ok(Response::text(DELETE_FAILED))
        }
    }

    fn record(&self, user_id: &str, cmd: Record) -> Result<Response, StoreError> {
        let (category, amount, memo) = match cmd {
            Record::InvalidAmount => return Ok(Response::format_error(RECORD_HINT)),
            Record::Uncategorized { amount, memo } => {
                return Ok(self.category_choice(amount, memo));
            }
            Record::Categorized {
                category,
                amount,
                memo,
            } => (category, amount, memo),
        };

        let Some(limit) = self
            .store
            .get_budget(user_id, &category)?
            .filter(|l| *l > 0)
        else {
            debug!(user_id = %user_id, category = %category, "record blocked, budget unset");
            return Ok(self.preset_prompt(category, PresetReason::Required));
        };

        let txn = self
            .store
            .append(user_id, NewTransaction::expense(category.as_str(), amount, memo))?;

        let summary = aggregate::monthly_summary(&self.store.list(user_id)?, &self.config.now());
        let month_total = summary.get(&category).copied().unwrap_or(0);
        let status = budget::classify(month_total, limit);

        info!(
            user_id = %user_id,
            category = %category,
            amount,
            month_total,
            limit,
            tier = %status.tier,
            "expense recorded"
        );

        Ok(Response::RecordSuccess {
            id: txn.id,
            category,
            amount,
            memo: txn.memo,
            tier: status.tier,
            percent: status.percent,
            month_total,
            limit,
        })
    }

    /// Offer every canonical category; each option replays amount and memo.
    fn category_choice(&self, amount: u64, memo: String) -> Response {
        let options = self
            .parser
            .categories()
            .iter()
            .map(|category| {
                let text = format!("{} {} {}", category, amount, memo);
                ReplyOption::new(category, text.trim())
            })
            .collect();
        Response::CategoryChoicePrompt {
            amount,
            memo,
            options,
        }
    }

    /// Preset amounts, plus a custom option when the user asked to set the
    /// budget. The custom option carries no amount.
    fn preset_prompt(&self, category: String, reason: PresetReason) -> Response {
        let set = &self.parser.keywords().set;
        let mut options: Vec<ReplyOption> = self
            .config
            .budget_presets
            .iter()
            .map(|preset| {
                ReplyOption::new(preset.to_string(), format!("{} {} {}", set, category, preset))
            })
            .collect();
        if reason == PresetReason::Requested {
            options.push(ReplyOption::new(
                CUSTOM_AMOUNT_LABEL,
                format!("{} {} ", set, category),
            ));
        }
        Response::BudgetPresetPrompt {
            category,
            reason,
            options,
        }
    }

    fn describe(&self, user_id: &str, id: &str) -> Result<String, StoreError> {
        Ok(self
            .store
            .list(user_id)?
            .into_iter()
            .find(|t| t.id == id)
            .map(|t| format!("{}${}", t.category, t.amount))
            .unwrap_or_else(|| id.to_string()))
    }
}
