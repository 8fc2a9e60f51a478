//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use kinfolk_domain::{Person, PersonId, RelationshipEdge, RelationshipTypeDef};
use kinfolk_inference::{ConfirmOutcome, InferenceOutcome, Suggestion};
use std::collections::HashMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Display names keyed by person id, used to label edges.
pub type Names = HashMap<PersonId, String>;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of people.
    pub fn format_persons(&self, persons: &[Person]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = persons.iter().map(person_json).collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(persons.iter().map(|p| p.id.to_string()))),
            OutputFormat::Table => {
                if persons.is_empty() {
                    return Ok(self.colorize("No people found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Gender"]);
                for person in persons {
                    builder.push_record([
                        person.id.to_string(),
                        person.display_name.clone(),
                        person.gender.to_string(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format one person together with their edges.
    pub fn format_person_detail(
        &self,
        person: &Person,
        edges: &[RelationshipEdge],
        names: &Names,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "person": person_json(person),
                    "edges": edges.iter().map(|e| edge_json(e, names)).collect::<Vec<_>>(),
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(person.id.to_string()),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                self.format_persons(std::slice::from_ref(person))?,
                self.format_edges(edges, names)?
            )),
        }
    }

    /// Format edges, labelling endpoints with `names`.
    pub fn format_edges(&self, edges: &[RelationshipEdge], names: &Names) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = edges.iter().map(|e| edge_json(e, names)).collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(edges.iter().map(|e| e.id.to_string()))),
            OutputFormat::Table => {
                if edges.is_empty() {
                    return Ok(self.colorize("No relationships found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Subject", "Relation", "Object", "Status", "Source"]);
                for edge in edges {
                    builder.push_record([
                        edge.id.to_string(),
                        name_of(names, edge.subject),
                        edge.code.to_string(),
                        name_of(names, edge.object),
                        edge.status.as_str().to_string(),
                        source_label(edge).to_string(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format ranked suggestions.
    pub fn format_suggestions(&self, suggestions: &[Suggestion], names: &Names) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = suggestions
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "candidate": s.candidate.to_string(),
                            "name": names.get(&s.candidate),
                            "code": s.suggested_code.as_str(),
                            "confidence": s.confidence,
                            "basis": s.basis.as_str(),
                            "rationale": s.rationale,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(suggestions
                .iter()
                .map(|s| format!("{} {}", s.candidate, s.suggested_code))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if suggestions.is_empty() {
                    return Ok(self.colorize("No suggestions.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Candidate", "Relation", "Confidence", "Basis", "Why"]);
                for s in suggestions {
                    builder.push_record([
                        name_of(names, s.candidate),
                        s.suggested_code.to_string(),
                        format!("{:.2}", s.confidence),
                        s.basis.to_string(),
                        s.rationale.clone(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format catalog definitions.
    pub fn format_codes(&self, defs: &[RelationshipTypeDef]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = defs
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "code": d.code.as_str(),
                            "label": d.code.label(),
                            "generation": d.generation,
                            "category": d.category.as_str(),
                            "required_gender": d.required_gender.as_str(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(defs.iter().map(|d| d.code.to_string()))),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Code", "Label", "Generation", "Category", "Gender"]);
                for def in defs {
                    builder.push_record([
                        def.code.to_string(),
                        def.code.label().to_string(),
                        format!("{:+}", def.generation),
                        def.category.as_str().to_string(),
                        def.required_gender.to_string(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format the result of confirming or accepting a relationship.
    pub fn format_confirm(&self, outcome: &ConfirmOutcome, names: &Names) -> Result<String> {
        let inferred: Vec<RelationshipEdge> = outcome.inference.created().into_iter().cloned().collect();
        match self.format {
            OutputFormat::Json => {
                let error = match &outcome.inference {
                    InferenceOutcome::Failed { error, .. } => Some(error.as_str()),
                    InferenceOutcome::Completed(_) => None,
                };
                let skipped: usize = outcome.inference.reports().iter().map(|r| r.skipped.len()).sum();
                let json = serde_json::json!({
                    "confirmed": outcome.confirmed.iter().map(|e| edge_json(e, names)).collect::<Vec<_>>(),
                    "inferred": inferred.iter().map(|e| edge_json(e, names)).collect::<Vec<_>>(),
                    "skipped": skipped,
                    "inference_error": error,
                });
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => Ok(join_ids(
                outcome.confirmed.iter().chain(inferred.iter()).map(|e| e.id.to_string()),
            )),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&format!(
                    "Confirmed {} edge(s), inferred {}",
                    outcome.confirmed.len(),
                    inferred.len()
                ))];
                let all: Vec<RelationshipEdge> =
                    outcome.confirmed.iter().cloned().chain(inferred).collect();
                lines.push(self.format_edges(&all, names)?);
                if let InferenceOutcome::Failed { error, .. } = &outcome.inference {
                    lines.push(self.warning(&format!("Inference rolled back: {}", error)));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn join_ids(ids: impl Iterator<Item = String>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

/// Display name for an id, or the first block of the id when unknown.
fn name_of(names: &Names, id: PersonId) -> String {
    match names.get(&id) {
        Some(name) => name.clone(),
        None => id.to_string().chars().take(8).collect(),
    }
}

fn source_label(edge: &RelationshipEdge) -> &'static str {
    if edge.created_automatically {
        "inferred"
    } else {
        "user"
    }
}

fn person_json(person: &Person) -> serde_json::Value {
    serde_json::json!({
        "id": person.id.to_string(),
        "name": person.display_name,
        "gender": person.gender.as_str(),
    })
}

fn edge_json(edge: &RelationshipEdge, names: &Names) -> serde_json::Value {
    serde_json::json!({
        "id": edge.id.to_string(),
        "subject": edge.subject.to_string(),
        "subject_name": names.get(&edge.subject),
        "code": edge.code.as_str(),
        "object": edge.object.to_string(),
        "object_name": names.get(&edge.object),
        "status": edge.status.as_str(),
        "inferred": edge.created_automatically,
        "created_at": edge.created_at,
        "accepted_at": edge.accepted_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinfolk_domain::{EdgeId, EdgeStatus, Gender, RelationCode};
    use kinfolk_inference::SuggestionBasis;

    fn edge(subject: &Person, object: &Person, code: RelationCode, inferred: bool) -> RelationshipEdge {
        RelationshipEdge {
            id: EdgeId::new(),
            subject: subject.id,
            object: object.id,
            code,
            status: EdgeStatus::Accepted,
            created_automatically: inferred,
            created_at: 1_700_000_000,
            accepted_at: Some(1_700_000_000),
        }
    }

    fn family() -> (Person, Person, Names) {
        let ana = Person::new("Ana", Gender::Female);
        let rosa = Person::new("Rosa", Gender::Female);
        let names = [(ana.id, "Ana".to_string()), (rosa.id, "Rosa".to_string())]
            .into_iter()
            .collect();
        (ana, rosa, names)
    }

    #[test]
    fn test_edges_table_uses_names() {
        let (ana, rosa, names) = family();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_edges(&[edge(&ana, &rosa, RelationCode::Mother, false)], &names)
            .unwrap();
        assert!(output.contains("Ana"));
        assert!(output.contains("Rosa"));
        assert!(output.contains("mother"));
        assert!(output.contains("user"));
    }

    #[test]
    fn test_edges_json() {
        let (ana, rosa, names) = family();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_edges(&[edge(&rosa, &ana, RelationCode::Daughter, true)], &names)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["code"], "daughter");
        assert_eq!(value[0]["subject_name"], "Rosa");
        assert_eq!(value[0]["inferred"], true);
    }

    #[test]
    fn test_person_detail_json() {
        let (ana, rosa, names) = family();
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_person_detail(&ana, &[edge(&ana, &rosa, RelationCode::Mother, false)], &names)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["person"]["name"], "Ana");
        assert_eq!(value["person"]["gender"], "female");
        assert_eq!(value["edges"][0]["object_name"], "Rosa");
    }

    #[test]
    fn test_quiet_prints_ids_only() {
        let (ana, rosa, _) = family();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_persons(&[ana.clone(), rosa.clone()]).unwrap();
        assert_eq!(output, format!("{}\n{}", ana.id, rosa.id));
    }

    #[test]
    fn test_empty_tables() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.format_persons(&[]).unwrap(), "No people found.");
        assert_eq!(formatter.format_suggestions(&[], &Names::new()).unwrap(), "No suggestions.");
    }

    #[test]
    fn test_unknown_names_fall_back_to_short_id() {
        let id = PersonId::new();
        let label = name_of(&Names::new(), id);
        assert_eq!(label.len(), 8);
        assert!(id.to_string().starts_with(&label));
    }

    #[test]
    fn test_suggestions_table() {
        let (_, rosa, names) = family();
        let formatter = Formatter::new(OutputFormat::Table, false);
        let suggestion = Suggestion {
            candidate: rosa.id,
            suggested_code: RelationCode::Grandmother,
            rationale: "Rosa is your mother's mother".to_string(),
            confidence: 0.9,
            basis: SuggestionBasis::Blood,
        };
        let output = formatter.format_suggestions(&[suggestion], &names).unwrap();
        assert!(output.contains("grandmother"));
        assert!(output.contains("0.90"));
        assert!(output.contains("blood"));
    }

    #[test]
    fn test_confirm_reports_rolled_back_inference() {
        let (ana, rosa, names) = family();
        let outcome = ConfirmOutcome {
            confirmed: vec![edge(&ana, &rosa, RelationCode::Mother, false)],
            inference: InferenceOutcome::Failed {
                completed: Vec::new(),
                error: "database is locked".to_string(),
            },
        };

        let table = Formatter::new(OutputFormat::Table, false)
            .format_confirm(&outcome, &names)
            .unwrap();
        assert!(table.contains("Confirmed 1 edge(s), inferred 0"));
        assert!(table.contains("Inference rolled back: database is locked"));

        let json = Formatter::new(OutputFormat::Json, false)
            .format_confirm(&outcome, &names)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["inference_error"], "database is locked");
        assert_eq!(value["confirmed"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_messages_without_color() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
