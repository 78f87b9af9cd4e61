//! Project brief collected by the contact form
//!
//! When a chat session carries a brief, the assistant answers from this
//! checklist instead of asking the model.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

const NOT_PROVIDED: &str = "Not provided";

/// How many missing-field questions to ask at once
const QUESTIONS_PER_REPLY: usize = 3;

/// Budget range in whole euros
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Everything the contact form may have captured, each field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectBrief {
    pub project_type: Option<String>,
    pub project_goal: Option<String>,
    pub target_audience: Option<String>,
    pub current_situation: Option<String>,
    pub features: Vec<String>,
    pub timeline_weeks: Option<u32>,
    pub budget: Option<BudgetRange>,
    pub urls: Vec<String>,
    pub contact: Option<Contact>,
}

/// A text field counts only if it has something besides whitespace
fn filled(field: Option<&String>) -> Option<&str> {
    field.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ProjectBrief {
    pub fn project_type(&self) -> Option<&str> {
        filled(self.project_type.as_ref())
    }

    pub fn project_goal(&self) -> Option<&str> {
        filled(self.project_goal.as_ref())
    }

    pub fn target_audience(&self) -> Option<&str> {
        filled(self.target_audience.as_ref())
    }

    pub fn current_situation(&self) -> Option<&str> {
        filled(self.current_situation.as_ref())
    }

    pub fn timeline_weeks(&self) -> Option<u32> {
        self.timeline_weeks.filter(|w| *w > 0)
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|c| filled(c.name.as_ref()))
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|c| filled(c.email.as_ref()))
    }
}

/// Questions for every checklist field the brief leaves open, in asking order
pub fn missing_questions(brief: &ProjectBrief) -> Vec<&'static str> {
    let mut questions = Vec::new();

    if brief.project_type().is_none() {
        questions.push("What type of project are you looking for? (website, web app, UI/UX design, AI automation)");
    }
    if brief.project_goal().is_none() {
        questions.push("What is the main goal of your project? (generate leads, sell products, automate processes, improve branding)");
    }
    if brief.target_audience().is_none() {
        questions.push("Who is your target audience and what problem are you solving for them?");
    }
    if brief.current_situation().is_none() {
        questions.push("What is your current situation and biggest challenge right now?");
    }
    if brief.features.is_empty() {
        questions.push("What features or outcomes are most important to you?");
    }
    if brief.timeline_weeks().is_none() {
        questions.push("What timeline do you have in mind for this project?");
    }
    if brief.budget.is_none() {
        questions.push("What is your budget range for this project?");
    }
    if brief.contact_name().is_none() || brief.contact_email().is_none() {
        questions.push("Could you provide your contact information?");
    }

    questions
}

/// Reply for a session that carries a brief
///
/// Asks for the first few missing fields, or summarizes the brief and
/// proposes next steps once the checklist is complete.
pub fn targeted_response(brief: &ProjectBrief) -> String {
    let questions = missing_questions(brief);

    if questions.is_empty() {
        return recommendation(brief);
    }

    let mut reply = String::from("To provide you with the best solution, I need a few more details:\n\n");
    for question in questions.iter().take(QUESTIONS_PER_REPLY) {
        let _ = writeln!(reply, "• {question}");
    }
    if questions.len() > QUESTIONS_PER_REPLY {
        let _ = writeln!(
            reply,
            "\n...and {} more questions to fully understand your needs.",
            questions.len() - QUESTIONS_PER_REPLY
        );
    }
    reply.push_str("\nCould you start by answering these key questions?");
    reply
}

fn recommendation(brief: &ProjectBrief) -> String {
    let project_type = brief.project_type().unwrap_or(NOT_PROVIDED);
    let goal = brief.project_goal().unwrap_or(NOT_PROVIDED);
    let audience = brief.target_audience().unwrap_or(NOT_PROVIDED);

    format!(
        "Perfect! Based on your {project_type} project, here's my recommendation:\n\n\
         • **Project Scope:** {project_type} focused on {goal}\n\
         • **Target Audience:** {audience}\n\
         • **Key Features:** {features}\n\n\
         **Next Steps:**\n\
         1. Schedule a consultation call\n\
         2. Review detailed project proposal\n\
         3. Begin development planning\n\n\
         Would you like to proceed with a detailed project proposal?",
        features = brief.features.join(", "),
    )
}

/// Fact sheet handed to the model when summarizing a brief
pub fn summary_facts(brief: &ProjectBrief) -> String {
    let features = if brief.features.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        brief.features.join(", ")
    };
    let timeline = brief
        .timeline_weeks()
        .map_or_else(|| NOT_PROVIDED.to_string(), |w| format!("{w} weeks"));
    let budget = brief.budget.map_or_else(
        || NOT_PROVIDED.to_string(),
        |b| format!("€{} - €{}", format_euros(b.min), format_euros(b.max)),
    );
    let urls: Vec<&str> = brief
        .urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    let urls = if urls.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        urls.join(", ")
    };
    let contact = match (brief.contact_name(), brief.contact_email()) {
        (Some(name), Some(email)) => format!("{name} ({email})"),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => email.to_string(),
        (None, None) => NOT_PROVIDED.to_string(),
    };

    format!(
        "Project type: {}\n\
         Project goal: {}\n\
         Target audience: {}\n\
         Current situation: {}\n\
         Key features: {features}\n\
         Timeline: {timeline}\n\
         Budget: {budget}\n\
         Links: {urls}\n\
         Contact: {contact}",
        brief.project_type().unwrap_or(NOT_PROVIDED),
        brief.project_goal().unwrap_or(NOT_PROVIDED),
        brief.target_audience().unwrap_or(NOT_PROVIDED),
        brief.current_situation().unwrap_or(NOT_PROVIDED),
    )
}

/// Group thousands with commas: 12500 -> "12,500"
fn format_euros(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
