//! Pairwise interaction evaluation.
//!
//! Every unordered pair of list positions (i, j), i < j, costs exactly one
//! text-completion call: a list of N medications issues N·(N−1)/2 calls
//! (10 medications → 45 calls). Calls run one at a time in pair order unless
//! `EvaluatorConfig::concurrency` allows a bounded fan-out; outcomes are
//! always collected in pair order.

use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use medcheck_common::{InteractionRecord, MedicationEntry, PatientContext, Verdict};
use medcheck_llm::{CompletionBackend, LlmAuditEntry, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::prompt::build_interaction_prompt;
use crate::verdict::{explain_verdict, DecisionRule};

/// Number of completion calls a list of `n` medications costs.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

fn pair_indices(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum in-flight completion calls. 1 keeps evaluation sequential.
    pub concurrency: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            concurrency: 1,
        }
    }
}

/// What happened to one pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    pub index_a: usize,
    pub index_b: usize,
    pub drug_a: String,
    pub drug_b: String,
    pub verdict: Verdict,
    pub rule: DecisionRule,
    pub raw_text: String,
    /// Set when the completion call failed; the pair is then parsed as "".
    pub error: Option<String>,
    pub audit: LlmAuditEntry,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub outcomes: Vec<PairOutcome>,
    pub records: Vec<InteractionRecord>,
}

impl EvaluationReport {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.iter().filter(|o| o.verdict == verdict).count()
    }

    pub fn failed_calls(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

pub struct PairwiseEvaluator {
    backend: Arc<dyn CompletionBackend>,
    config: EvaluatorConfig,
}

impl PairwiseEvaluator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: EvaluatorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Flag every pair the model classifies as a conflict.
    ///
    /// Issues `pair_count(medications.len())` completion calls. Service errors
    /// and unclassifiable answers are not flagged.
    pub async fn evaluate(
        &self,
        medications: &[MedicationEntry],
        context: &PatientContext,
    ) -> Vec<InteractionRecord> {
        self.evaluate_detailed(medications, context).await.records
    }

    /// Same calls as [`evaluate`](Self::evaluate), keeping every pair's verdict.
    pub async fn evaluate_detailed(
        &self,
        medications: &[MedicationEntry],
        context: &PatientContext,
    ) -> EvaluationReport {
        let n = medications.len();
        info!(
            medications = n,
            calls = pair_count(n),
            concurrency = self.config.concurrency,
            "Starting pairwise interaction check"
        );

        let outcomes: Vec<PairOutcome> = stream::iter(pair_indices(n))
            .map(|(i, j)| self.evaluate_pair(i, j, &medications[i], &medications[j], context))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let records: Vec<InteractionRecord> = outcomes
            .iter()
            .filter(|o| o.verdict.is_conflict())
            .map(|o| InteractionRecord::conflict(o.drug_a.clone(), o.drug_b.clone()))
            .collect();

        let report = EvaluationReport { outcomes, records };
        info!(
            pairs = report.outcomes.len(),
            conflicts = report.count(Verdict::Conflict),
            safe = report.count(Verdict::Safe),
            unknown = report.count(Verdict::Unknown),
            failed_calls = report.failed_calls(),
            "Pairwise interaction check finished"
        );
        report
    }

    async fn evaluate_pair(
        &self,
        index_a: usize,
        index_b: usize,
        a: &MedicationEntry,
        b: &MedicationEntry,
        context: &PatientContext,
    ) -> PairOutcome {
        let prompt = build_interaction_prompt(&a.name, &b.name, context);

        let started = Instant::now();
        let result = self
            .backend
            .complete_text(&prompt, self.config.max_tokens, self.config.temperature)
            .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let (raw_text, error) = match result {
            Ok(text) => (text, None),
            Err(e) => {
                warn!(drug_a = %a.name, drug_b = %b.name, error = %e, "Completion call failed; pair left unflagged");
                (String::new(), Some(e.to_string()))
            }
        };

        let trace = explain_verdict(&raw_text);
        debug!(
            drug_a = %a.name,
            drug_b = %b.name,
            verdict = %trace.verdict,
            rule = ?trace.rule,
            plus_ones = trace.plus_ones,
            minus_ones = trace.minus_ones,
            latency_ms,
            "Pair evaluated"
        );

        let audit = LlmAuditEntry::new(
            self.backend.backend_name(),
            self.backend.model_id(),
            &prompt,
            error.is_none().then_some(raw_text.as_str()),
            latency_ms,
        );

        PairOutcome {
            index_a,
            index_b,
            drug_a: a.name.clone(),
            drug_b: b.name.clone(),
            verdict: trace.verdict,
            rule: trace.rule,
            raw_text,
            error,
            audit,
        }
    }
}
