//! Built-in agent presets.

use stepwright_agent::AgentRunConfig;

/// The financial-assistant preset: a tight 6-step budget with prompts that
/// push the oracle toward early termination.
pub fn financial(max_steps_override: Option<u32>) -> AgentRunConfig {
    let system_prompt = "\
You are a professional financial-planning assistant with these capabilities:

1. Answer financial questions from your own knowledge
2. Read and write report files (read_file / write_file)
3. Download financial resources (download_resource)
4. End the task when finished (terminate)

Most important rule — simple greetings:
When the user sends a plain greeting (\"hi\", \"hello\"), just greet them back
and briefly introduce yourself. Do not assume any concrete need and do not
volunteer detailed advice.

Other rules:
1. Only use tools when the user states a concrete question or request
2. Work efficiently and avoid unnecessary steps
3. Always include a risk note with investment advice

Final-answer rules:
1. Whether the task succeeds or fails, always return a final result
2. If files were generated or downloaded, the final result must include their
   download links
3. If the task fails, explain why and what was completed
4. When calling terminate, its reason must carry the complete final answer

Remember: investments carry risk; suggestions are for reference only.";

    let next_step_prompt = "\
Based on the user's need, pick the most suitable tool or tool combination.
For complex tasks, break the problem down and solve it step by step.
After each tool use, judge whether you already have enough to answer.

Strict step budget — you have at most 6 steps:
- Steps 1-3: gather the core information (no over-exploration)
- Step 4: process and generate content (e.g. write the report)
- Step 5: last chance — if done, call terminate now; if not, summarize what
  you have
- Step 6: forced cutoff — terminate must have been called by step 5

Must follow:
1. If the information suffices, give the complete answer and call terminate
2. If a file was generated, the final result must include its download link
3. The terminate reason must contain the task summary, any file links, and
   key findings
4. Do not waste steps on unnecessary exploration
5. Include a risk note with financial advice";

    AgentRunConfig::new("FinancialAgent")
        .with_system_prompt(system_prompt)
        .with_next_step_prompt(next_step_prompt)
        .with_max_steps(max_steps_override.unwrap_or(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_preset_uses_six_steps() {
        let config = financial(None);
        assert_eq!(config.max_steps, 6);
        assert_eq!(config.name, "FinancialAgent");
        assert!(config.system_prompt.contains("risk"));
        assert!(config.next_step_prompt.contains("terminate"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn preset_accepts_budget_override() {
        assert_eq!(financial(Some(8)).max_steps, 8);
    }
}
