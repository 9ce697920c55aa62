//! Classification prompt for one medication pair.

use medcheck_common::PatientContext;

/// Build the fixed-template prompt asking the model for "+1" (safe) or "-1" (conflict).
pub fn build_interaction_prompt(drug_a: &str, drug_b: &str, context: &PatientContext) -> String {
    format!(
        r#"You are a medical AI that checks drug interactions.
Please only output either "+1" if the drugs are safe together or "-1" if there is a conflict.
Do not provide any other text.

Patient: {patient}

Drug 1: {drug_a}
Drug 2: {drug_b}

MAKE SURE YOUR OUTPUT CONTAINS A "+1" if there is no conflict OR "-1" if there is a conflict or if one or two of the drugs are unsafe.
"#,
        patient = context.summary_line(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use medcheck_test_utils::sample_patient;

    #[test]
    fn test_prompt_embeds_pair_and_patient_line() {
        let ctx = sample_patient();
        let prompt = build_interaction_prompt("Aspirin", "Warfarin", &ctx);
        assert!(prompt.contains("Drug 1: Aspirin\nDrug 2: Warfarin"));
        assert!(prompt.contains(&format!("Patient: {}", ctx.summary_line())));
        assert!(prompt.contains("Route: Oral"));
        assert!(prompt.contains("\"-1\" if there is a conflict or if one or two of the drugs are unsafe"));
    }

    #[test]
    fn test_prompt_is_stable_for_same_input() {
        let ctx = sample_patient();
        assert_eq!(
            build_interaction_prompt("A", "B", &ctx),
            build_interaction_prompt("A", "B", &ctx)
        );
    }
}
