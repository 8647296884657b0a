//! System instructions for step-wise reasoning

use crate::agent::InstructionBuilder;
use crate::llm::ToolSchema;

const STEP_RULES: &str = "\
* USE AS MANY REASONING STEPS AS POSSIBLE. AT LEAST 3.
* BE AWARE OF YOUR LIMITATIONS AS AN AGENT AND WHAT YOU CAN AND CANNOT DO.
* CONSIDER YOU MAY BE WRONG, AND IF YOU ARE WRONG IN YOUR REASONING, WHERE IT WOULD BE.
* WHEN YOU SAY YOU ARE RE-EXAMINING, ACTUALLY RE-EXAMINE, AND USE ANOTHER APPROACH TO DO SO.
* THE CONTENT FIELD HOLDS THOUGHTS AND SELF-REFLECTION, NOT RESPONSES TO THE USER.
* START BY ANALYSING THE USER REQUEST AND YOUR OWN RESPONSIBILITIES.
* WHEN YOU NEED TO ASK THE USER SOMETHING, ASK IT AS THE FINAL STEP.";

const STEP_SCHEMA: &str = r#"{
  "title": "JSON step",
  "type": "object",
  "properties": {
    "title": { "type": "string", "description": "Title of the action" },
    "content": { "type": "string", "description": "Description of the action" },
    "tool_name": { "type": "string", "description": "Name of the tool" },
    "tool_input": { "type": "object", "description": "Input for the tool" },
    "next_action": { "type": "string", "enum": ["continue", "final_step"] }
  },
  "required": ["title", "content", "next_action"]
}"#;

/// Instruction layout asking the model for one JSON step per completion
#[derive(Debug, Clone, Default)]
pub struct StepInstructionBuilder;

impl InstructionBuilder for StepInstructionBuilder {
    fn build(
        &self,
        agent_name: &str,
        instructions: &str,
        team: &[(usize, &str)],
        tools: &[ToolSchema],
    ) -> String {
        let mut prompt = format!(
            "You are {}, an expert in solving problems step by step. For each step, provide a \
             title describing what you are doing and the text content. Decide whether you need \
             another step or are ready to give the final answer. Respond in JSON with 'title', \
             'content' and 'next_action' (either 'continue' or 'final_step') keys.\n",
            agent_name
        );

        if !tools.is_empty() {
            prompt.push_str("\nYou can also use tools by setting 'tool_name' and 'tool_input':\n");
            for tool in tools {
                prompt.push_str(&format!("    {}: {}\n", tool.name, tool.description));
            }
        }

        if !team.is_empty() {
            prompt.push_str("\nTeam agents (agent_id: name), reachable with TransferToAgent:\n");
            for (id, name) in team {
                prompt.push_str(&format!("    {}: {}\n", id, name));
            }
        }

        prompt.push('\n');
        prompt.push_str(STEP_RULES);
        prompt.push_str("\n\nThe JSON schema:\n");
        prompt.push_str(STEP_SCHEMA);
        prompt.push_str(
            "\n\nRespond with the JSON content only, without markdown formatting.\n\n# Instructions\n",
        );
        prompt.push_str(instructions);
        prompt
    }
}
