//! System instruction rendering
//!
//! The runner treats instruction rendering as an opaque string producer. The default
//! builder lays out the persona, its instructions, the team it may transfer to, and
//! its tools.

use crate::llm::ToolSchema;

/// Renders the system instructions sent with each completion request
pub trait InstructionBuilder: Send + Sync {
    /// Build the system string
    ///
    /// `team` holds (1-based position, name) pairs of handoff targets.
    fn build(
        &self,
        agent_name: &str,
        instructions: &str,
        team: &[(usize, &str)],
        tools: &[ToolSchema],
    ) -> String;
}

/// Default instruction layout
#[derive(Debug, Clone, Default)]
pub struct DefaultInstructionBuilder;

impl InstructionBuilder for DefaultInstructionBuilder {
    fn build(
        &self,
        agent_name: &str,
        instructions: &str,
        team: &[(usize, &str)],
        tools: &[ToolSchema],
    ) -> String {
        let mut prompt = format!(
            "You are {}. Answer or ask the user directly when no tool is needed.\n\n\
             ## INSTRUCTIONS\n{}\n\n\
             ## NOT ALLOWED\n- Make assumptions\n- Use placeholders\n",
            agent_name, instructions
        );

        if !team.is_empty() {
            prompt.push_str("\n## TEAM AGENTS\nYou are part of a team of agents (agent_id: name):\n");
            for (id, name) in team {
                prompt.push_str(&format!("{}: {}\n", id, name));
            }
        }

        if !tools.is_empty() {
            prompt.push_str("\n## TOOLS\n");
            for tool in tools {
                prompt.push_str(&format!("{}: {}\n", tool.name, tool.description));
            }
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_prompt() {
        let prompt = DefaultInstructionBuilder.build("Agent", "You are a helpful agent.", &[], &[]);
        assert!(prompt.starts_with("You are Agent."));
        assert!(prompt.contains("## INSTRUCTIONS\nYou are a helpful agent."));
        assert!(!prompt.contains("## TEAM AGENTS"));
        assert!(!prompt.contains("## TOOLS"));
    }

    #[test]
    fn test_team_and_tools_sections() {
        let tools = vec![ToolSchema::new("apply_discount", "Apply a discount to the user's cart.")];
        let prompt = DefaultInstructionBuilder.build(
            "Triage Agent",
            "Route the user.",
            &[(1, "Sales Agent"), (2, "Refunds Agent")],
            &tools,
        );
        assert!(prompt.contains("1: Sales Agent\n2: Refunds Agent\n"));
        assert!(prompt.contains("apply_discount: Apply a discount to the user's cart."));
    }
}
