//! Prompt templates for the MCP server

/// Argument definition for a prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplateArg {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Definition of a prompt template; `{name}` placeholders in `template` are
/// replaced by argument values.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub description: String,
    pub template: String,
    pub arguments: Vec<PromptTemplateArg>,
}

impl PromptTemplate {
    /// Substitutes `{name}` placeholders with the given values.
    pub fn render<'a>(&self, values: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        values
            .into_iter()
            .fold(self.template.clone(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

/// Predefined prompt templates for treatment-plan work
pub fn prompt_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate {
            name: "review_plan".to_string(),
            description: "Review a treatment plan before approving or rejecting it".to_string(),
            template: r#"You are reviewing dental treatment plan {code} before it goes to the patient.

# Step 1: Read the Plan
Use `show_plan` with code "{code}". Note the patient, the responsible doctor, every phase and every item with its price.

# Step 2: Check the Clinical Order
- Each phase should build on the one before it (diagnosis, then treatment, then restoration).
- Items that depend on others (a crown after a root canal, an implant after imaging) must come later in the plan.
- Flag items without a linked catalog service; their prices were entered by hand.

# Step 3: Check the Money
- The total must equal the sum of item prices.
- The discount must not exceed the total.
- Compare hand-entered prices with `list_services`.

# Step 4: Decide
- If everything is in order, call `decide_plan` with decision "approve" and a short note.
- Otherwise call `decide_plan` with decision "reject" and a note that says exactly what must change. Rejections without a note are refused.

Summarize your findings before deciding."#
                .to_string(),
            arguments: vec![PromptTemplateArg {
                name: "code".to_string(),
                description: "Code of the plan pending review, e.g. TP-20260115-0001".to_string(),
                required: true,
            }],
        },
        PromptTemplate {
            name: "progress_report".to_string(),
            description: "Summarize where a patient's treatment stands and what comes next"
                .to_string(),
            template: r#"Prepare a progress report for treatment plan {code}.

1. Use `show_plan` to load the plan with its phases and items.
2. Use `audit_trail` to see what happened and when.
3. Report:
   - Overall status, approval status and the current phase
   - Completed and skipped items, with completion dates
   - Items ready for booking that still need an appointment
   - Items waiting for a prerequisite, and which item unblocks them
   - Current final cost and any price changes recorded in the trail
4. End with the next concrete action for the front desk.

Do not change anything; this is a read-only report."#
                .to_string(),
            arguments: vec![PromptTemplateArg {
                name: "code".to_string(),
                description: "Code of the plan to report on".to_string(),
                required: true,
            }],
        },
        PromptTemplate {
            name: "draft_plan".to_string(),
            description: "Draft a custom treatment plan from clinical findings".to_string(),
            template: r#"Draft a treatment plan for patient {patient_id} from these findings:

{findings}

# Steps
1. Use `list_templates` to see whether a template already covers the case. If one fits, prefer `create_plan_from_template`.
2. Otherwise use `list_services` to find catalog services for each procedure.
3. Call `create_custom_plan` with phases in clinical order. Link every item to a catalog service where one exists; only give a name and price for procedures that are not in the catalog.
4. Use `show_plan` to check the result, then `submit_for_review` when it is complete.

Keep the plan in draft if anything is unclear and list your open questions instead."#
                .to_string(),
            arguments: vec![
                PromptTemplateArg {
                    name: "patient_id".to_string(),
                    description: "ID of the patient the plan is for".to_string(),
                    required: true,
                },
                PromptTemplateArg {
                    name: "findings".to_string(),
                    description: "Clinical findings and requested procedures".to_string(),
                    required: true,
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_are_unique() {
        let templates = prompt_templates();
        let mut names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), templates.len());
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let templates = prompt_templates();
        let draft = templates
            .iter()
            .find(|t| t.name == "draft_plan")
            .unwrap();
        let text = draft.render([("patient_id", "42"), ("findings", "caries on 36")]);
        assert!(text.contains("patient 42"));
        assert!(text.contains("caries on 36"));
        assert!(!text.contains("{patient_id}"));
    }

    #[test]
    fn test_every_placeholder_is_declared() {
        for template in prompt_templates() {
            let values: Vec<(&str, &str)> = template
                .arguments
                .iter()
                .map(|arg| (arg.name.as_str(), "x"))
                .collect();
            let text = template.render(values);
            assert!(!text.contains("{code}"), "{}", template.name);
            assert!(!text.contains("{patient_id}"), "{}", template.name);
        }
    }
}
