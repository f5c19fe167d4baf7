use graphql_parser::query::{Definition, OperationDefinition, Selection, parse_query};
use serde_json::json;

use crate::GraphQLRequest;

/// The upcoming-launches query document, embedded at build time.
pub const GET_LAUNCHES: &str =
    include_str!(concat!(env!("OUT_QUERIES"), "/get_launches.graphql"));

/// Operation name of the embedded document, taken from the parsed query
/// rather than duplicated by hand.
pub fn operation_name() -> Result<Option<String>, String> {
    let document = parse_query::<String>(GET_LAUNCHES)
        .map_err(|e| format!("Failed to parse launches query: {}", e))?;

    for definition in &document.definitions {
        if let Definition::Operation(OperationDefinition::Query(query)) = definition {
            return Ok(query.name.clone());
        }
    }

    Ok(None)
}

/// Root selection names of the embedded document.
pub fn root_fields() -> Result<Vec<String>, String> {
    let document = parse_query::<String>(GET_LAUNCHES)
        .map_err(|e| format!("Failed to parse launches query: {}", e))?;

    let mut fields = Vec::new();

    for definition in &document.definitions {
        if let Definition::Operation(OperationDefinition::Query(query)) = definition {
            for selection in &query.selection_set.items {
                if let Selection::Field(field) = selection {
                    fields.push(field.name.clone());
                }
            }
        }
    }

    Ok(fields)
}

/// Builds the request envelope sent on every poll tick. The query takes no
/// variables, so the variables object is always empty.
pub fn launches_request() -> Result<GraphQLRequest, String> {
    Ok(GraphQLRequest {
        query: GET_LAUNCHES.to_string(),
        variables: Some(json!({})),
        operation_name: operation_name()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_document_parses() {
        assert!(parse_query::<String>(GET_LAUNCHES).is_ok());
    }

    #[test]
    fn operation_name_comes_from_the_document() {
        // The upstream contract spells the operation "GetMisson".
        assert_eq!(operation_name().unwrap(), Some("GetMisson".to_string()));
    }

    #[test]
    fn query_selects_only_the_upcoming_launches_field() {
        assert_eq!(root_fields().unwrap(), vec!["launchesUpcoming".to_string()]);
    }

    #[test]
    fn request_envelope_carries_query_and_empty_variables() {
        let request = launches_request().unwrap();
        assert_eq!(request.query, GET_LAUNCHES);
        assert_eq!(request.variables, Some(serde_json::json!({})));

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["operationName"], "GetMisson");
    }
}
