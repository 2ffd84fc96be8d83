//! Update expression assembly.
//!
//! Builds `SET`/`REMOVE` update expressions with placeholder names for every
//! attribute, since several attribute names here (`name`, `role`, `status`)
//! are DynamoDB reserved words.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

/// Accumulates attribute assignments and removals, then renders them as one
/// update expression with `#fN`/`:vN` placeholders.
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    sets: Vec<(String, AttributeValue)>,
    removes: Vec<String>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, attr: impl Into<String>, value: AttributeValue) -> &mut Self {
        self.sets.push((attr.into(), value));
        self
    }

    pub fn remove(&mut self, attr: impl Into<String>) -> &mut Self {
        self.removes.push(attr.into());
        self
    }

    /// Renders the expression plus its name and value maps.
    pub fn build(
        self,
    ) -> (
        String,
        HashMap<String, String>,
        HashMap<String, AttributeValue>,
    ) {
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut clauses = Vec::new();

        if !self.sets.is_empty() {
            let assignments: Vec<String> = self
                .sets
                .into_iter()
                .enumerate()
                .map(|(i, (attr, value))| {
                    let name_ph = format!("#f{i}");
                    let value_ph = format!(":v{i}");
                    names.insert(name_ph.clone(), attr);
                    values.insert(value_ph.clone(), value);
                    format!("{name_ph} = {value_ph}")
                })
                .collect();
            clauses.push(format!("SET {}", assignments.join(", ")));
        }

        if !self.removes.is_empty() {
            let removals: Vec<String> = self
                .removes
                .into_iter()
                .enumerate()
                .map(|(i, attr)| {
                    let name_ph = format!("#r{i}");
                    names.insert(name_ph.clone(), attr);
                    name_ph
                })
                .collect();
            clauses.push(format!("REMOVE {}", removals.join(", ")));
        }

        (clauses.join(" "), names, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_only() {
        let mut builder = UpdateBuilder::new();
        builder
            .set("status", AttributeValue::S("done".to_string()))
            .set("title", AttributeValue::S("Recheck".to_string()));

        let (expr, names, values) = builder.build();
        assert_eq!(expr, "SET #f0 = :v0, #f1 = :v1");
        assert_eq!(names["#f0"], "status");
        assert_eq!(names["#f1"], "title");
        assert_eq!(values[":v0"], AttributeValue::S("done".to_string()));
    }

    #[test]
    fn test_set_and_remove() {
        let mut builder = UpdateBuilder::new();
        builder.set("status", AttributeValue::S("done".to_string()));
        builder.remove("details");

        let (expr, names, _) = builder.build();
        assert_eq!(expr, "SET #f0 = :v0 REMOVE #r0");
        assert_eq!(names["#r0"], "details");
    }

    #[test]
    fn test_remove_only() {
        let mut builder = UpdateBuilder::new();
        builder.remove("assigned_doctor");

        let (expr, names, values) = builder.build();
        assert_eq!(expr, "REMOVE #r0");
        assert_eq!(names["#r0"], "assigned_doctor");
        assert!(values.is_empty());
    }
}
