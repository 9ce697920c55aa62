//! medcheck-interactions — Pairwise drug-interaction inference.
//! Builds one classification prompt per medication pair, parses the free-text
//! answer into a verdict and collects the flagged pairs.

pub mod verdict;
pub mod prompt;
pub mod evaluator;

pub use verdict::{explain_verdict, parse_verdict, DecisionRule, VerdictTrace};
pub use prompt::build_interaction_prompt;
pub use evaluator::{pair_count, EvaluationReport, EvaluatorConfig, PairOutcome, PairwiseEvaluator};
